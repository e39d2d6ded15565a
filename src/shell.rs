use crate::builtins;
use crate::exec;
use crate::parser;
use crate::vars::VarStore;

pub const RUN_LINE_SUCCESS: i16 = 0;
pub const RUN_LINE_CONTINUE: i16 = 1;
pub const RUN_LINE_BREAK: i16 = 2;

// One interpreter session. Everything a command can mutate (variables,
// working directory, exit code) hangs off this value; no global state.
pub struct Shell {
    vars: VarStore,
}

impl Shell {
    pub fn new() -> Shell {
        Shell {
            vars: VarStore::seeded(),
        }
    }

    pub fn vars(&self) -> &VarStore {
        &self.vars
    }

    pub fn vars_mut(&mut self) -> &mut VarStore {
        &mut self.vars
    }

    pub fn prompt(&self) -> String {
        self.vars.get("PROMPT").unwrap_or("> ").to_string()
    }

    pub fn run_line(&mut self, line: &str) -> i16 {
        let args = parser::tokenize(line);
        if args.is_empty() {
            return RUN_LINE_CONTINUE;
        }
        if self.execute(&args) {
            RUN_LINE_BREAK
        } else {
            RUN_LINE_SUCCESS
        }
    }

    // Routes one token sequence to its execution path. Returns true exactly
    // when the `exit` builtin was invoked, directly or from a sourced file.
    // Check order matters: a pipe anywhere in the line beats a redirect,
    // which beats an assignment or builtin reading of the first token.
    pub fn execute(&mut self, args: &[String]) -> bool {
        if args.is_empty() {
            return false;
        }
        if let Some((left, right)) = parser::split_pipe(args) {
            exec::run_pipeline(self, &left, &right);
            return false;
        }
        if let Some((kind, left, right)) = parser::split_redirect(args) {
            exec::run_redirect(self, kind, &left, &right);
            return false;
        }
        if let Some((name, value)) = parser::parse_assignment(&args[0], &self.vars) {
            self.vars.set(&name, &value);
            return false;
        }
        if let Some(handler) = builtins::lookup(&args[0]) {
            return handler(self, args);
        }
        exec::launch(self, args);
        false
    }
}
