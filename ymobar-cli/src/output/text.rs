//! Text output formatting with progress bars and colors.

use ymobar_core::UsageSnapshot;
use ymobar_store::ViewState;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";

// Progress bar characters
const BAR_FULL: char = '█';
const BAR_EMPTY: char = '░';

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    bar_width: usize,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            bar_width: 20,
        }
    }

    /// Set the progress bar width.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn with_bar_width(mut self, width: usize) -> Self {
        self.bar_width = width;
        self
    }

    /// Formats a usage snapshot.
    ///
    /// ```text
    /// Y!mobile data usage
    /// ██████████░░░░░░░░░░ 2.13 GB left of 4.23 GB
    /// Used 2.10 GB (50%)
    /// ```
    pub fn format_usage(&self, snapshot: &UsageSnapshot) -> String {
        let remaining_pct = snapshot.remaining_ratio() * 100.0;
        let mut lines = vec![self.bold("Y!mobile data usage")];

        lines.push(format!(
            "{} {} left of {}",
            self.progress_bar(remaining_pct),
            self.color_for_percent(remaining_pct, &gb(snapshot.remaining_gb())),
            gb(snapshot.total_gb())
        ));
        lines.push(format!(
            "Used {} ({:.0}%)",
            gb(snapshot.used_gb()),
            snapshot.used_percentage()
        ));
        if snapshot.is_exhausted() {
            lines.push(self.red("Allowance used up"));
        }

        lines.push(String::new());
        lines.push(self.breakdown_line("Carry-over", snapshot.carry_over_gb()));
        lines.push(self.breakdown_line("Base", snapshot.base_allowance_gb()));
        lines.push(self.breakdown_line("Purchased extra", snapshot.purchased_extra_gb()));
        lines.push(self.breakdown_line("Used", snapshot.used_gb()));
        lines.push(String::new());
        lines.push(self.dim(&format!("Updated {}", snapshot.observed_at_display())));

        lines.join("\n")
    }

    /// Formats a controller view state: data if any, then the last error.
    pub fn format_state(&self, state: &ViewState) -> String {
        let mut lines = Vec::new();

        match &state.data {
            Some(snapshot) => lines.push(self.format_usage(snapshot)),
            None if state.is_loading => lines.push(self.dim("Loading...")),
            None => lines.push(self.dim("No data")),
        }

        if let Some(error) = &state.error {
            lines.push(String::new());
            lines.push(self.format_error(error));
        }

        lines.join("\n")
    }

    /// Formats an error message.
    pub fn format_error(&self, error: &str) -> String {
        format!("{} {}", self.red("Error:"), error)
    }

    /// Formats a progress bar.
    pub fn progress_bar(&self, percent_remaining: f64) -> String {
        let ratio = (percent_remaining / 100.0).clamp(0.0, 1.0);
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let filled = (ratio * self.bar_width as f64).round() as usize;
        let empty = self.bar_width.saturating_sub(filled);

        let bar = format!(
            "{}{}",
            BAR_FULL.to_string().repeat(filled),
            BAR_EMPTY.to_string().repeat(empty)
        );

        self.color_for_percent(percent_remaining, &bar)
    }

    fn breakdown_line(&self, label: &str, value: f64) -> String {
        format!("  {:<16} {:>9}", format!("{label}:"), gb(value))
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn color_for_percent(&self, percent: f64, text: &str) -> String {
        if percent < 20.0 {
            self.red(text)
        } else if percent < 50.0 {
            self.yellow(text)
        } else {
            self.green(text)
        }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }
}

fn gb(value: f64) -> String {
    format!("{value:.2} GB")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_for_percent() {
        let formatter = TextFormatter::new(true);
        assert!(formatter.color_for_percent(15.0, "x").contains(RED));
        assert!(formatter.color_for_percent(35.0, "x").contains(YELLOW));
        assert!(formatter.color_for_percent(75.0, "x").contains(GREEN));
    }

    #[test]
    fn test_no_colors_means_plain_text() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.bold("x"), "x");
        assert_eq!(formatter.format_error("boom"), "Error: boom");
    }

    #[test]
    fn test_gb_formatting() {
        assert_eq!(gb(2.126), "2.13 GB");
        assert_eq!(gb(0.0), "0.00 GB");
    }
}
