use crate::shell::Shell;

// Only signals the read loop to terminate.
pub fn run(_shell: &mut Shell, _args: &[String]) -> bool {
    true
}
