//! Terminal UI.

use console::Term;
use std::io::Write;

use super::{EspressoTheme, OutputMode, ProgressSpinner, SpinnerHandle, UserInterface};

/// Terminal UI writing status to stdout and errors to stderr.
pub struct TerminalUI {
    out: Term,
    err: Term,
    theme: EspressoTheme,
    mode: OutputMode,
}

impl TerminalUI {
    /// Create a new terminal UI.
    pub fn new(mode: OutputMode, colors: bool) -> Self {
        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            theme: EspressoTheme::for_colors(colors),
            mode,
        }
    }

    /// The theme in use.
    pub fn theme(&self) -> &EspressoTheme {
        &self.theme
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "{}", msg).ok();
        }
    }

    fn data(&mut self, line: &str) {
        writeln!(self.out, "{}", line).ok();
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        writeln!(self.err, "{}", self.theme.format_warning(msg)).ok();
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.err, "{}", self.theme.format_error(msg)).ok();
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_spinners() && self.err.is_term() {
            Box::new(ProgressSpinner::new(message, self.theme.clone()))
        } else {
            Box::new(ProgressSpinner::hidden())
        }
    }

    fn show_progress(&mut self, current: usize, total: usize, name: &str) {
        if self.mode.shows_status() {
            writeln!(
                self.out,
                "{}",
                self.theme.format_progress(current, total, name)
            )
            .ok();
        }
    }

    fn is_interactive(&self) -> bool {
        self.out.is_term()
    }
}
