use std::env;
use std::path::Path;

use crate::shell::Shell;
use crate::utils;

// Changes the process working directory and keeps the CWD variable in
// step. A failed change leaves CWD untouched.
pub fn run(shell: &mut Shell, args: &[String]) -> bool {
    let target = match args.get(1) {
        Some(target) => target,
        None => {
            utils::shell_error("chdir: missing operand");
            return false;
        }
    };
    match env::set_current_dir(Path::new(target)) {
        Ok(()) => {
            if let Ok(dir) = env::current_dir() {
                let dir = dir.display().to_string();
                shell.vars_mut().set("CWD", &dir);
                println!("directory changed to {}", dir);
            }
        }
        Err(err) => utils::shell_error(format!("chdir: {}: {}", target, err)),
    }
    false
}
