use crate::shell::Shell;

// Every variable as `name=value`, one per line, in store order.
pub fn run(shell: &mut Shell, _args: &[String]) -> bool {
    for var in shell.vars().iter() {
        println!("{}={}", var.name, var.value);
    }
    false
}
