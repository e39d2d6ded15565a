pub mod all;
pub mod chdir;
pub mod exit;
pub mod print;
pub mod source;

use crate::shell::Shell;

// A handler gets the full token sequence, command name included, and
// returns true only to request session termination.
pub type Builtin = fn(&mut Shell, &[String]) -> bool;

// Fixed dispatch table, set once at compile time.
const BUILTINS: &[(&str, Builtin)] = &[
    ("exit", exit::run),
    ("print", print::run),
    ("chdir", chdir::run),
    ("all", all::run),
    ("source", source::run),
];

pub fn lookup(name: &str) -> Option<Builtin> {
    BUILTINS
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|(_, handler)| *handler)
}
