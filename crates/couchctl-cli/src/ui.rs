use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

// ---------------------------------------------------------------------------
// Colored message helpers
// ---------------------------------------------------------------------------

fn prefix() -> String {
    "[couchctl]".bold().cyan().to_string()
}

/// Print an informational message: [couchctl] message
pub fn info(msg: &str) {
    println!("{} {}", prefix(), msg);
}

/// Print a warning message: [couchctl] message (in yellow)
pub fn warn(msg: &str) {
    println!("{} {}", prefix(), msg.yellow());
}

/// Print an error message: [couchctl] message (in red)
pub fn error(msg: &str) {
    eprintln!("{} {}", "[couchctl]".bold().red(), msg.red());
}

// ---------------------------------------------------------------------------
// Interactive prompts
// ---------------------------------------------------------------------------

/// Show an interactive confirmation prompt. Returns true if confirmed.
pub fn confirm(msg: &str) -> bool {
    inquire::Confirm::new(msg)
        .with_default(false)
        .prompt()
        .unwrap_or(false)
}

/// Prompt for a password with hidden input.
pub fn password(msg: &str) -> anyhow::Result<String> {
    inquire::Password::new(msg)
        .without_confirmation()
        .prompt()
        .map_err(Into::into)
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Create and start a spinner with the given message.
/// Call `.finish_and_clear()` when done.
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.cyan} {msg}")
            .expect("invalid spinner template"),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Bar for the conflict scan, ticking once per scanned document.
pub fn scan_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  [{bar:40}] {pos}/{len} docs")
            .expect("invalid bar template")
            .progress_chars("-> "),
    );
    pb
}
