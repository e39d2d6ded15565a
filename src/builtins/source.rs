use std::fs::File;
use std::io::{BufRead, BufReader};

use crate::parser;
use crate::shell::Shell;
use crate::utils;

// Reads a file line by line and dispatches each line exactly as the read
// loop would. An `exit` inside the file terminates the whole session, so
// its request is propagated rather than swallowed.
pub fn run(shell: &mut Shell, args: &[String]) -> bool {
    let path = match args.get(1) {
        Some(path) => path,
        None => {
            utils::shell_error("source: missing file operand");
            return false;
        }
    };
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            utils::shell_error(format!("source: {}: {}", path, err));
            return false;
        }
    };
    for line in BufReader::new(file).lines() {
        match line {
            Ok(line) => {
                let args = parser::tokenize(&line);
                if args.is_empty() {
                    continue;
                }
                if shell.execute(&args) {
                    return true;
                }
            }
            Err(err) => {
                utils::shell_error(format!("source: {}: {}", path, err));
                break;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::run;
    use crate::shell::Shell;
    use std::io::Write;

    macro_rules! string_vec {
        ($($x:expr),*) => (vec![$($x.to_string()),*]);
    }

    fn script(name: &str, body: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("eggshell-test-{}-{}", std::process::id(), name));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn sourced_assignments_land_in_the_store() {
        let path = script("assign", "A=1\nB=$A\n");
        let mut shell = Shell::new();
        let args = string_vec!["source", path.display().to_string()];
        assert!(!run(&mut shell, &args));
        assert_eq!(shell.vars().get("A"), Some("1"));
        assert_eq!(shell.vars().get("B"), Some("1"));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn sourced_exit_propagates() {
        let path = script("exit", "A=1\nexit\nB=2\n");
        let mut shell = Shell::new();
        let args = string_vec!["source", path.display().to_string()];
        assert!(run(&mut shell, &args));
        assert_eq!(shell.vars().get("A"), Some("1"));
        assert_eq!(shell.vars().get("B"), None);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_file_is_reported_not_fatal() {
        let mut shell = Shell::new();
        let args = string_vec!["source", "/definitely/not/here"];
        assert!(!run(&mut shell, &args));
    }
}
