use colored::Colorize;
use jiff::Zoned;

/// Environment switch for echoing every external command and its output
pub const VERBOSE_ENV: &str = "LANGUP_VERBOSE";

pub fn is_verbose() -> bool {
    std::env::var_os(VERBOSE_ENV).is_some()
}

fn timestamp() -> String {
    Zoned::now().strftime("%Y-%m-%d %H:%M:%S").to_string()
}

/// Format a stderr log line with the local timestamp prefix
pub fn line(level: &str, message: &str) -> String {
    format!("{} [{level}] {message}", timestamp())
}

/// Log a completed state change (install, switch, uninstall ...)
pub fn event(message: &str) {
    eprintln!("{}", line("INFO", message).green());
}

/// Log the failure that ends a run
pub fn failure(message: &str) {
    eprintln!("{}", line("ERROR", message).red().bold());
}

pub fn verbose(message: &str) {
    if is_verbose() {
        eprintln!("{} {}", "[VERBOSE]".dimmed(), message);
    }
}
