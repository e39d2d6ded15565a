use colored::Colorize;

pub fn shell_error<T: std::string::ToString>(error: T) {
    eprintln!("{}: {}", "eggshell".red(), error.to_string());
}
