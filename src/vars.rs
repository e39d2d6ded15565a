use std::env;
use std::ffi::CStr;

#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub value: String,
}

// Insertion-ordered name/value table, separate from the process
// environment; spawned programs only see what the launcher hands over.
#[derive(Debug, Default)]
pub struct VarStore {
    entries: Vec<Variable>,
}

impl VarStore {
    pub fn new() -> VarStore {
        VarStore {
            entries: Vec::new(),
        }
    }

    // Seed set for a fresh session.
    pub fn seeded() -> VarStore {
        let mut vars = VarStore::new();
        let shell = env::current_exe()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "eggshell".to_string());
        vars.set("SHELL", &shell);
        vars.set(
            "USER",
            &env::var("USER").unwrap_or_else(|_| whoami::username()),
        );
        vars.set("PROMPT", "> ");
        vars.set("PATH", &env::var("PATH").unwrap_or_default());
        let home = dirs::home_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        vars.set("HOME", &home);
        vars.set("TERMINAL", &tty_name().unwrap_or_default());
        let cwd = env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        vars.set("CWD", &cwd);
        vars
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|var| var.name == name)
            .map(|var| var.value.as_str())
    }

    // Inserts, or overwrites an existing entry without moving it.
    pub fn set(&mut self, name: &str, value: &str) {
        if let Some(var) = self.entries.iter_mut().find(|var| var.name == name) {
            var.value = value.to_string();
            return;
        }
        self.entries.push(Variable {
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.entries.iter()
    }

    /// Replaces the first occurrence of the first stored variable, in store
    /// order, whose `$NAME` form appears in `token`. Single substitution
    /// only: further `$NAME` forms in the same token are left alone, so
    /// callers wanting full expansion must re-invoke until nothing matches.
    pub fn substitute(&self, token: &str) -> String {
        for var in &self.entries {
            let pattern = format!("${}", var.name);
            if let Some(pos) = token.find(&pattern) {
                let mut out = String::with_capacity(token.len() + var.value.len());
                out.push_str(&token[..pos]);
                out.push_str(&var.value);
                out.push_str(&token[pos + pattern.len()..]);
                return out;
            }
        }
        token.to_string()
    }

    // NAME=VALUE rendering for a child environment.
    pub fn env_pair(&self, name: &str) -> Option<String> {
        self.get(name).map(|value| format!("{}={}", name, value))
    }
}

fn tty_name() -> Option<String> {
    let ptr = unsafe { libc::ttyname(libc::STDOUT_FILENO) };
    if ptr.is_null() {
        return None;
    }
    let name = unsafe { CStr::from_ptr(ptr) };
    Some(name.to_string_lossy().into_owned())
}
