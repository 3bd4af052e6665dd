//! Visual theme and styling.

use console::Style;

/// Terminal styles used by espresso.
#[derive(Debug, Clone)]
pub struct EspressoTheme {
    /// Style for success messages (green).
    pub success: Style,
    /// Style for warning messages (yellow).
    pub warning: Style,
    /// Style for error messages (red bold).
    pub error: Style,
    /// Style for package names (bold).
    pub package: Style,
    /// Style for dim/secondary text.
    pub dim: Style,
    /// Style for step counters such as `[2/4]` (dim).
    pub counter: Style,
}

impl Default for EspressoTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl EspressoTheme {
    /// Create the colored theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
            package: Style::new().bold(),
            dim: Style::new().dim(),
            counter: Style::new().dim(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            package: Style::new(),
            dim: Style::new(),
            counter: Style::new(),
        }
    }

    /// Pick the colored or plain theme.
    pub fn for_colors(colors: bool) -> Self {
        if colors {
            Self::new()
        } else {
            Self::plain()
        }
    }

    /// Format a success message.
    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    /// Format a warning message.
    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    /// Format an error message.
    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    /// Format a `[current/total] name` line.
    pub fn format_progress(&self, current: usize, total: usize, name: &str) -> String {
        format!(
            "{} {}",
            self.counter.apply_to(format!("[{}/{}]", current, total)),
            self.package.apply_to(name)
        )
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors(no_color_flag: bool) -> bool {
    if no_color_flag {
        return false;
    }

    // https://no-color.org/
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    console::Term::stdout().is_term()
}
