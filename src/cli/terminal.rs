//! Terminal capability detection and colour helpers

use owo_colors::{colors::css, OwoColorize};

/// Whether colored output should be enabled on stdout
pub fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Terminal width in columns, if stdout is a terminal
pub fn terminal_width() -> Option<u16> {
    terminal_size::terminal_size().map(|(w, _)| w.0)
}

/// Check if terminal is narrow (< 60 columns)
pub fn is_narrow() -> bool {
    terminal_width().is_some_and(|w| w < 60)
}

fn paint(text: &str, styled: impl FnOnce(&str) -> String) -> String {
    if supports_color() {
        styled(text)
    } else {
        text.to_string()
    }
}

/// Extension trait for colorizing report output
pub trait Colorize {
    /// Identical trees (green)
    fn success(&self) -> String;
    /// Differences found (amber)
    fn warning(&self) -> String;
    /// No verdict (red)
    fn failure(&self) -> String;
    /// Secondary detail (dimmed)
    fn dim(&self) -> String;
}

impl Colorize for str {
    fn success(&self) -> String {
        paint(self, |s| s.fg::<css::Green>().to_string())
    }

    fn warning(&self) -> String {
        paint(self, |s| s.fg::<css::Orange>().to_string())
    }

    fn failure(&self) -> String {
        paint(self, |s| s.fg::<css::Red>().bold().to_string())
    }

    fn dim(&self) -> String {
        paint(self, |s| s.dimmed().to_string())
    }
}

impl Colorize for String {
    fn success(&self) -> String {
        self.as_str().success()
    }

    fn warning(&self) -> String {
        self.as_str().warning()
    }

    fn failure(&self) -> String {
        self.as_str().failure()
    }

    fn dim(&self) -> String {
        self.as_str().dim()
    }
}
