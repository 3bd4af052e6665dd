//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion.
//!
//! # Example
//!
//! ```
//! use espresso::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.message("Resolving vim");
//! ui.success("Installed vim");
//!
//! assert!(ui.messages().contains(&"Resolving vim".to_string()));
//! assert!(ui.successes().contains(&"Installed vim".to_string()));
//! ```

use super::{OutputMode, SpinnerHandle, UserInterface};

/// Mock UI implementation for testing.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    messages: Vec<String>,
    data: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    progress: Vec<(usize, usize, String)>,
    spinners: Vec<String>,
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new MockUI with a specific output mode.
    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Get all captured messages.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Get all captured data lines.
    pub fn data_lines(&self) -> &[String] {
        &self.data
    }

    /// Get all captured success messages.
    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    /// Get all captured warning messages.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Get all captured error messages.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Get all captured progress lines.
    pub fn progress(&self) -> &[(usize, usize, String)] {
        &self.progress
    }

    /// Get the messages of all started spinners.
    pub fn spinners(&self) -> &[String] {
        &self.spinners
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn data(&mut self, line: &str) {
        self.data.push(line.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        self.spinners.push(message.to_string());
        Box::new(MockSpinner::default())
    }

    fn show_progress(&mut self, current: usize, total: usize, name: &str) {
        self.progress.push((current, total, name.to_string()));
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Spinner that remembers how it finished.
#[derive(Debug, Default)]
pub struct MockSpinner {
    messages: Vec<String>,
    finish: Option<(SpinnerStatus, String)>,
}

/// How a mock spinner finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinnerStatus {
    Success,
    Error,
    Cleared,
}

impl MockSpinner {
    /// Messages set while spinning.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Final status and message, if finished.
    pub fn finish(&self) -> Option<&(SpinnerStatus, String)> {
        self.finish.as_ref()
    }
}

impl SpinnerHandle for MockSpinner {
    fn set_message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn finish_success(&mut self, msg: &str) {
        self.finish = Some((SpinnerStatus::Success, msg.to_string()));
    }

    fn finish_error(&mut self, msg: &str) {
        self.finish = Some((SpinnerStatus::Error, msg.to_string()));
    }

    fn finish_clear(&mut self) {
        self.finish = Some((SpinnerStatus::Cleared, String::new()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_everything() {
        let mut ui = MockUI::new();
        ui.message("m");
        ui.data("d");
        ui.success("s");
        ui.warning("w");
        ui.error("e");
        ui.show_progress(1, 2, "vim");
        ui.start_spinner("resolving");

        assert_eq!(ui.messages(), ["m"]);
        assert_eq!(ui.data_lines(), ["d"]);
        assert_eq!(ui.successes(), ["s"]);
        assert_eq!(ui.warnings(), ["w"]);
        assert_eq!(ui.errors(), ["e"]);
        assert_eq!(ui.progress(), [(1, 2, "vim".to_string())]);
        assert_eq!(ui.spinners(), ["resolving"]);
    }

    #[test]
    fn with_mode_sets_mode() {
        let ui = MockUI::with_mode(OutputMode::Quiet);
        assert_eq!(ui.output_mode(), OutputMode::Quiet);
        assert!(!ui.is_interactive());
    }

    #[test]
    fn mock_spinner_records_finish() {
        let mut spinner = MockSpinner::default();
        spinner.set_message("one");
        spinner.finish_error("boom");

        assert_eq!(spinner.messages(), ["one"]);
        assert_eq!(
            spinner.finish(),
            Some(&(SpinnerStatus::Error, "boom".to_string()))
        );
    }
}
