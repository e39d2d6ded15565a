mod builtins;
mod exec;
mod parser;
mod shell;
mod utils;
mod vars;

use std::thread;

use rustyline::error::ReadlineError;
use rustyline::Editor;
use signal_hook::{consts, iterator::Signals};

// A delivered interrupt terminates the interpreter immediately; children
// restore the default disposition before exec so foreground programs stay
// interruptible on their own.
fn install_interrupt_handler() {
    let mut signals = match Signals::new(&[consts::SIGINT]) {
        Ok(signals) => signals,
        Err(err) => {
            utils::shell_error(format!("signal handler: {}", err));
            return;
        }
    };
    thread::spawn(move || {
        if signals.forever().next().is_some() {
            std::process::exit(130);
        }
    });
}

fn main() {
    install_interrupt_handler();

    let mut shell = shell::Shell::new();
    let mut rl = Editor::<()>::new();

    loop {
        let readline = rl.readline(&shell.prompt());
        match readline {
            Ok(line) => match shell.run_line(&line) {
                shell::RUN_LINE_SUCCESS => {}
                shell::RUN_LINE_CONTINUE => continue,
                shell::RUN_LINE_BREAK => break,
                _ => break,
            },
            Err(ReadlineError::Interrupted) => {
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("exit");
                break;
            }
            Err(err) => {
                utils::shell_error(format!("Error: {:?}", err));
                break;
            }
        }
    }
}
