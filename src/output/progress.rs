use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{bright, bright_green, bright_red, bright_yellow};

/// Progress tracking for the three notification phases
pub struct PhaseProgress {
    pb: ProgressBar,
}

impl PhaseProgress {
    pub fn start_authentication(api_url: &str) -> Self {
        eprintln!("{}  {}", bright("⚙️"), bright("Phases").underlined());
        let pb = create_spinner(
            bright_yellow(format!("Phase 1/3: Authenticating against {api_url}")).to_string(),
        );
        Self { pb }
    }

    pub fn finish_authentication_start_validation(self, full_name: &str) -> Self {
        self.pb
            .finish_with_message(bright_green("Phase 1/3: Credentials accepted ✓").to_string());
        let pb = create_spinner(
            bright_yellow(format!("Phase 2/3: Validating {full_name}")).to_string(),
        );
        Self { pb }
    }

    pub fn finish_validation_start_dispatch(self, sha: &str) -> Self {
        self.pb
            .finish_with_message(bright_green(format!("Phase 2/3: Found commit {sha} ✓")).to_string());
        let pb = create_spinner(bright_yellow("Phase 3/3: Sending commit status").to_string());
        Self { pb }
    }

    pub fn finish_dispatch(self) {
        self.pb
            .finish_with_message(bright_green("Phase 3/3: Commit status sent ✓").to_string());
        eprintln!();
    }

    /// Marks the running phase as failed.
    pub fn fail(&self, reason: impl std::fmt::Display) {
        self.pb
            .abandon_with_message(bright_red(format!("Failed: {reason} ✗")).to_string());
    }
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {msg} {spinner}")
            .unwrap(),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
