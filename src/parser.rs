use crate::vars::VarStore;

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum RedirectKind {
    /// `>` - truncate the target file and write stdout into it.
    OutTruncate,
    /// `>>` - append stdout to the target file.
    OutAppend,
    /// `<` - read stdin from the target file.
    InFile,
    /// `<<<` - read stdin from an inline literal.
    Heredoc,
}

impl RedirectKind {
    // True for the kinds that name a file on the right-hand side.
    pub fn needs_target(self) -> bool {
        self != RedirectKind::Heredoc
    }
}

// Checked in this order; the first operator found wins.
const REDIRECT_OPERATORS: &[(&str, RedirectKind)] = &[
    (">", RedirectKind::OutTruncate),
    (">>", RedirectKind::OutAppend),
    ("<", RedirectKind::InFile),
    ("<<<", RedirectKind::Heredoc),
];

// Splits a raw line on space/tab/CR/LF into non-empty tokens. No quote or
// escape handling here; quote characters stay in the tokens and are only
// given meaning by the `print` builtin.
pub fn tokenize(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

fn split_at_operator(args: &[String], operator: &str) -> Option<(Vec<String>, Vec<String>)> {
    let pos = args.iter().position(|arg| arg == operator)?;
    Some((args[..pos].to_vec(), args[pos + 1..].to_vec()))
}

// Splits at the first `|`, discarding the operator. Only one split; longer
// pipelines fall out of the right side being dispatched recursively.
pub fn split_pipe(args: &[String]) -> Option<(Vec<String>, Vec<String>)> {
    split_at_operator(args, "|")
}

// Splits at the first redirection operator, by operator priority and then
// by position. Callers check for a pipe first.
pub fn split_redirect(args: &[String]) -> Option<(RedirectKind, Vec<String>, Vec<String>)> {
    for (operator, kind) in REDIRECT_OPERATORS {
        if let Some((left, right)) = split_at_operator(args, operator) {
            return Some((*kind, left, right));
        }
    }
    None
}

// Recognizes `NAME=VALUE` in the first token of a line. The whole token is
// variable-substituted before splitting. Exactly two non-empty parts make
// an assignment; anything else (`X=1=2`, `X=`) falls through to normal
// dispatch.
pub fn parse_assignment(token: &str, vars: &VarStore) -> Option<(String, String)> {
    if !token.contains('=') {
        return None;
    }
    let expanded = vars.substitute(token);
    let parts: Vec<&str> = expanded.split('=').filter(|part| !part.is_empty()).collect();
    if parts.len() != 2 {
        return None;
    }
    Some((parts[0].to_string(), parts[1].to_string()))
}
