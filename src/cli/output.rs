//! Colored output helpers for the CLI

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::time::Duration;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print the title line
    pub fn banner(&self) {
        let title = "Crypto Teacher Response Generator";
        let version = format!("v{}", env!("CARGO_PKG_VERSION"));
        if self.colored {
            println!("\n  {} {}\n", title.bright_white().bold(), version.dimmed());
        } else {
            println!("\n  {} {}\n", title, version);
        }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print the final answer between rules
    pub fn answer(&self, text: &str) {
        let rule = "─".repeat(60);
        if self.colored {
            println!("\n{}", "Answer".green().bold());
            println!("{}", rule.dimmed());
            println!("{}", text);
            println!("{}", rule.dimmed());
        } else {
            println!("\nAnswer");
            println!("{}", rule);
            println!("{}", text);
            println!("{}", rule);
        }
    }

    /// Spinner shown while the pipeline runs. Hidden without colors so
    /// piped output stays clean.
    pub fn spinner(&self, message: &str) -> ProgressBar {
        if !self.colored {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("  {spinner:.blue} {msg} {elapsed:.dim}")
        {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }
}
