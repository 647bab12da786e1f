mod progress;
mod styling;
mod tables;

pub use progress::PhaseProgress;
use styling::{bright_green, dim, magenta_bold};
pub use tables::{render_credentials, render_states};

/// Prints the githubnotify banner to stderr.
///
/// Displays the tool name, version, and description at the start of execution.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("📣 githubnotify"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("GitHub commit status notifier")
    );
}

/// Prints the outcome of a successful validation command to stdout.
pub fn print_success(message: &str) {
    println!("{} {}", bright_green("✔"), bright_green(message));
}

