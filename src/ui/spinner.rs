//! Progress spinners.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use super::theme::EspressoTheme;
use super::SpinnerHandle;

/// A spinner for long-running operations such as dependency resolution.
pub struct ProgressSpinner {
    bar: ProgressBar,
    theme: EspressoTheme,
}

impl ProgressSpinner {
    /// Create a new spinner with a message.
    pub fn new(message: &str, theme: EspressoTheme) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(spinner_style("{spinner:.cyan} {msg}"));
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));

        Self { bar, theme }
    }

    /// Create a spinner that doesn't show (for quiet mode).
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            theme: EspressoTheme::plain(),
        }
    }

    fn finish_with(&mut self, line: String) {
        self.bar.set_style(spinner_style("{msg}"));
        self.bar.finish_with_message(line);
    }
}

fn spinner_style(template: &str) -> ProgressStyle {
    ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

impl SpinnerHandle for ProgressSpinner {
    fn set_message(&mut self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }

    fn finish_success(&mut self, msg: &str) {
        let line = self.theme.format_success(msg);
        self.finish_with(line);
    }

    fn finish_error(&mut self, msg: &str) {
        let line = self.theme.format_error(msg);
        self.finish_with(line);
    }

    fn finish_clear(&mut self) {
        self.bar.finish_and_clear();
    }
}
