use std::env;
use std::ffi::CString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::os::unix::ffi::OsStringExt;
use std::os::unix::io::{AsRawFd, IntoRawFd};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicUsize, Ordering};

use nix::sys::signal::{self, SigHandler, Signal};
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{close, dup2, execve, fork, pipe, ForkResult, Pid};

use crate::parser::RedirectKind;
use crate::shell::Shell;
use crate::utils;
use crate::vars::VarStore;

// Runs `left | right`. Each side is dispatched recursively in its own
// child, so a side may itself be a builtin, another pipeline or a redirect.
// Both children exist before either is waited on. Statuses of the two
// sides are discarded; a pipeline does not touch EXITCODE.
pub fn run_pipeline(shell: &mut Shell, left: &[String], right: &[String]) {
    let (read_end, write_end) = match pipe() {
        Ok(ends) => ends,
        Err(err) => {
            utils::shell_error(format!("pipe: {}", err));
            return;
        }
    };
    let read_fd = read_end.into_raw_fd();
    let write_fd = write_end.into_raw_fd();

    let first = match spawn(shell, left, || {
        let _ = dup2(write_fd, libc::STDOUT_FILENO);
        let _ = close(read_fd);
        let _ = close(write_fd);
    }) {
        Some(pid) => pid,
        None => {
            let _ = close(read_fd);
            let _ = close(write_fd);
            return;
        }
    };

    let second = spawn(shell, right, || {
        let _ = dup2(read_fd, libc::STDIN_FILENO);
        let _ = close(read_fd);
        let _ = close(write_fd);
    });

    // Both ends must be closed here before waiting, or the reader would
    // never see EOF.
    let _ = close(read_fd);
    let _ = close(write_fd);

    let _ = waitpid(first, None);
    if let Some(pid) = second {
        let _ = waitpid(pid, None);
    }
}

// Runs `left` with one standard stream rebound according to `kind`. The
// target is opened in the child; the parent waits and records EXITCODE.
// A failed open is reported and the child still runs, unredirected.
pub fn run_redirect(shell: &mut Shell, kind: RedirectKind, left: &[String], right: &[String]) {
    if kind.needs_target() && right.is_empty() {
        utils::shell_error("missing redirection target");
        return;
    }

    let child = spawn(shell, left, || match open_target(kind, right) {
        Ok(file) => {
            let stream = match kind {
                RedirectKind::OutTruncate | RedirectKind::OutAppend => libc::STDOUT_FILENO,
                RedirectKind::InFile | RedirectKind::Heredoc => libc::STDIN_FILENO,
            };
            let _ = dup2(file.as_raw_fd(), stream);
            drop(file);
        }
        Err(err) => {
            utils::shell_error(format!("{}: {}", redirect_target_name(kind, right), err));
        }
    });

    if let Some(pid) = child {
        wait_and_record(shell, pid);
    }
}

// Launches an external program and records its termination status.
pub fn launch(shell: &mut Shell, args: &[String]) {
    match unsafe { fork() } {
        Ok(ForkResult::Child) => exec_child(shell.vars(), args),
        Ok(ForkResult::Parent { child }) => wait_and_record(shell, child),
        Err(err) => utils::shell_error(format!("fork: {}", err)),
    }
}

// Forks a child that runs `setup`, recursively dispatches `args` and
// exits. None if the fork failed.
fn spawn<F>(shell: &mut Shell, args: &[String], setup: F) -> Option<Pid>
where
    F: FnOnce(),
{
    match unsafe { fork() } {
        Ok(ForkResult::Child) => {
            setup();
            shell.execute(args);
            process::exit(0);
        }
        Ok(ForkResult::Parent { child }) => Some(child),
        Err(err) => {
            utils::shell_error(format!("fork: {}", err));
            None
        }
    }
}

fn wait_and_record(shell: &mut Shell, child: Pid) {
    match waitpid(child, None) {
        Ok(status) => {
            if let Some(code) = exit_code(status) {
                shell.vars_mut().set("EXITCODE", &code.to_string());
            }
        }
        Err(err) => utils::shell_error(format!("waitpid: {}", err)),
    }
}

fn exit_code(status: WaitStatus) -> Option<i32> {
    match status {
        WaitStatus::Exited(_, code) => Some(code),
        WaitStatus::Signaled(_, sig, _) => Some(128 + sig as i32),
        _ => None,
    }
}

fn open_target(kind: RedirectKind, right: &[String]) -> io::Result<File> {
    match kind {
        RedirectKind::OutTruncate => OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&right[0]),
        RedirectKind::OutAppend => OpenOptions::new().append(true).create(true).open(&right[0]),
        RedirectKind::InFile => File::open(&right[0]),
        RedirectKind::Heredoc => heredoc_file(right),
    }
}

fn redirect_target_name(kind: RedirectKind, right: &[String]) -> String {
    if kind.needs_target() {
        right[0].clone()
    } else {
        "heredoc".to_string()
    }
}

// The `<<<` input: an anonymous temp file holding the right-hand tokens
// joined with single spaces plus one trailing newline, rewound to the
// start. Unlinked right away so only the open handle keeps it alive.
fn heredoc_file(tokens: &[String]) -> io::Result<File> {
    static HEREDOC_SEQ: AtomicUsize = AtomicUsize::new(0);
    let seq = HEREDOC_SEQ.fetch_add(1, Ordering::Relaxed);
    let path = env::temp_dir().join(format!("eggshell-heredoc.{}.{}", process::id(), seq));
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path)?;
    let _ = fs::remove_file(&path);
    writeln!(file, "{}", tokens.join(" "))?;
    file.seek(SeekFrom::Start(0))?;
    Ok(file)
}

// Child-side setup and image replacement: default SIGINT disposition so
// the program stays interruptible, resolution through the shell's own PATH
// variable, then execve with only the TERMINAL and CWD pairs.
fn exec_child(vars: &VarStore, args: &[String]) -> ! {
    unsafe {
        let _ = signal::signal(Signal::SIGINT, SigHandler::SigDfl);
    }

    let program = match resolve_program(vars, &args[0]) {
        Some(path) => path,
        None => {
            utils::shell_error(format!("command not found: {}", args[0]));
            process::exit(127);
        }
    };

    let argv = match to_cstrings(args.iter().map(|arg| arg.as_bytes().to_vec())) {
        Some(argv) => argv,
        None => {
            utils::shell_error(format!("invalid argument to {}", args[0]));
            process::exit(1);
        }
    };
    let envp = child_env(vars);
    let path = match CString::new(program.into_os_string().into_vec()) {
        Ok(path) => path,
        Err(_) => {
            utils::shell_error(format!("invalid program path for {}", args[0]));
            process::exit(1);
        }
    };

    if let Err(err) = execve(&path, &argv, &envp) {
        utils::shell_error(format!("{}: {}", args[0], err));
    }
    process::exit(127);
}

// Names containing a slash are taken as-is.
fn resolve_program(vars: &VarStore, name: &str) -> Option<PathBuf> {
    if name.contains('/') {
        let path = PathBuf::from(name);
        return if path.is_file() { Some(path) } else { None };
    }
    let search_path = vars.get("PATH")?;
    for dir in search_path.split(':').filter(|dir| !dir.is_empty()) {
        let candidate = Path::new(dir).join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

fn child_env(vars: &VarStore) -> Vec<CString> {
    ["TERMINAL", "CWD"]
        .iter()
        .filter_map(|name| vars.env_pair(name))
        .filter_map(|pair| CString::new(pair).ok())
        .collect()
}

fn to_cstrings<I>(items: I) -> Option<Vec<CString>>
where
    I: Iterator<Item = Vec<u8>>,
{
    items.map(|bytes| CString::new(bytes).ok()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn heredoc_file_contents() {
        let tokens = vec!["a".to_string(), "b".to_string()];
        let mut file = heredoc_file(&tokens).unwrap();
        let mut contents = String::new();
        file.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "a b\n");
    }

    #[test]
    fn heredoc_file_empty_tokens() {
        let mut file = heredoc_file(&[]).unwrap();
        let mut contents = String::new();
        file.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "\n");
    }

    #[test]
    fn truncate_and_append_targets() {
        let path = std::env::temp_dir().join(format!("eggshell-test-redir-{}", process::id()));
        let target = vec![path.display().to_string()];
        let _ = fs::remove_file(&path);

        for _ in 0..2 {
            let mut file = open_target(RedirectKind::OutAppend, &target).unwrap();
            file.write_all(b"hi\n").unwrap();
        }
        assert_eq!(fs::metadata(&path).unwrap().len(), 6);

        for _ in 0..2 {
            let mut file = open_target(RedirectKind::OutTruncate, &target).unwrap();
            file.write_all(b"hi\n").unwrap();
        }
        assert_eq!(fs::metadata(&path).unwrap().len(), 3);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn input_target_reads_back() {
        let path = std::env::temp_dir().join(format!("eggshell-test-input-{}", process::id()));
        let target = vec![path.display().to_string()];
        let mut file = open_target(RedirectKind::OutTruncate, &target).unwrap();
        file.write_all(b"data\n").unwrap();
        drop(file);

        let mut contents = String::new();
        open_target(RedirectKind::InFile, &target)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "data\n");

        let _ = fs::remove_file(&path);
    }

    fn open_fds() -> Vec<String> {
        let mut fds: Vec<String> = fs::read_dir("/proc/self/fd")
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        fds.sort();
        fds
    }

    #[test]
    fn pipeline_returns_and_leaks_no_fds() {
        let mut shell = Shell::new();
        let left = vec!["true".to_string()];
        let right = vec!["true".to_string()];

        let before = open_fds();
        run_pipeline(&mut shell, &left, &right);
        let after = open_fds();

        let leaked: Vec<&String> = after.iter().filter(|fd| !before.contains(fd)).collect();
        assert!(leaked.is_empty(), "leaked fds: {:?}", leaked);
        // Both sides are waited on with statuses discarded.
        assert_eq!(shell.vars().get("EXITCODE"), None);
    }

    #[test]
    fn resolve_program_uses_store_path() {
        let mut vars = VarStore::new();
        vars.set("PATH", "/definitely/missing:/bin:/usr/bin");
        let found = resolve_program(&vars, "sh").unwrap();
        assert!(found.ends_with("sh"));
    }

    #[test]
    fn resolve_program_not_found() {
        let mut vars = VarStore::new();
        vars.set("PATH", "/definitely/missing");
        assert_eq!(resolve_program(&vars, "no-such-program-here"), None);
    }

    #[test]
    fn resolve_program_with_slash() {
        let vars = VarStore::new();
        assert_eq!(resolve_program(&vars, "/bin/sh"), Some(PathBuf::from("/bin/sh")));
        assert_eq!(resolve_program(&vars, "/bin/definitely-missing"), None);
    }

    #[test]
    fn child_env_surface() {
        let mut vars = VarStore::new();
        vars.set("TERMINAL", "/dev/pts/0");
        vars.set("CWD", "/tmp");
        vars.set("SECRET", "hidden");
        let env = child_env(&vars);
        let rendered: Vec<&str> = env.iter().filter_map(|e| e.to_str().ok()).collect();
        assert_eq!(rendered, vec!["TERMINAL=/dev/pts/0", "CWD=/tmp"]);
    }
}
