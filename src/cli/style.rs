//! Terminal styling for submission output
//!
//! Operation names and counts are cyan, completed calls green, failures red
//! on stderr. Whether color is emitted at all is left to `owo-colors`.

use owo_colors::{OwoColorize, Stream, Style};
use std::fmt::{self, Display};

const ACCENT: Style = Style::new().cyan();
const SUCCESS: Style = Style::new().green();
const ERROR: Style = Style::new().red();
const MUTED: Style = Style::new().dimmed();
const EMPHASIS: Style = Style::new().bold();

/// Value rendered with a style when its target stream supports color
#[derive(Clone, Debug)]
pub struct Styled<T> {
    value: T,
    style: Style,
    stream: Stream,
}

impl<T> Styled<T> {
    const fn on(value: T, style: Style, stream: Stream) -> Self {
        Self {
            value,
            style,
            stream,
        }
    }

    /// Decide color support against stderr, for text printed there
    #[must_use]
    pub const fn for_stderr(mut self) -> Self {
        self.stream = Stream::Stderr;
        self
    }
}

impl<T: Display> Display for Styled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let styled = self
            .value
            .if_supports_color(self.stream, |v| v.style(self.style));
        write!(f, "{styled}")
    }
}

/// Output roles for anything printable
pub trait Stylize: Display {
    /// Operation names, server URLs, call counts
    fn accent(&self) -> Styled<&Self> {
        Styled::on(self, ACCENT, Stream::Stdout)
    }

    /// Finished runs
    fn success(&self) -> Styled<&Self> {
        Styled::on(self, SUCCESS, Stream::Stdout)
    }

    /// Failed calls and aborted runs; checked against stderr
    fn error(&self) -> Styled<&Self> {
        Styled::on(self, ERROR, Stream::Stderr)
    }

    /// Side notes such as fan-out counts
    fn muted(&self) -> Styled<&Self> {
        Styled::on(self, MUTED, Stream::Stdout)
    }

    /// Phase headings
    fn emphasis(&self) -> Styled<&Self> {
        Styled::on(self, EMPHASIS, Stream::Stdout)
    }
}

impl<T: Display + ?Sized> Stylize for T {}

/// Marker for a registry call that went through
pub const fn check() -> Styled<&'static str> {
    Styled::on("✓", SUCCESS, Stream::Stdout)
}

/// Marker for a registry call that gave up
pub const fn cross() -> Styled<&'static str> {
    Styled::on("✗", ERROR, Stream::Stderr)
}

/// Marker for a registry call in flight
pub const fn arrow() -> Styled<&'static str> {
    Styled::on("→", ACCENT, Stream::Stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_styled_text_keeps_value() {
        assert!("submit linux64/de".accent().to_string().contains("submit linux64/de"));
        assert!(42_u32.accent().for_stderr().to_string().contains("42"));
        assert!("failed: boom".error().to_string().contains("failed: boom"));
    }

    #[test]
    fn test_call_markers() {
        assert!(check().to_string().contains('✓'));
        assert!(cross().to_string().contains('✗'));
        assert!(arrow().to_string().contains('→'));
    }
}
