//! Shared CLI presentation utilities.
//!
//! Renderers build `String`s rather than printing so they can be tested and
//! written to a file as well as stdout.
//!
//! # Guidelines
//!
//! - Keep this module format-only: no probing
//! - Every colored span goes through [`Style`] so `--no-color` is honored

pub mod report;

use std::io::{self, IsTerminal};

use clap::ValueEnum;
use serde::Serialize;

use crate::error::CliResult;

pub use report::{
    render_bench, render_checks, render_devices, render_environment, render_full_report,
};

// ANSI color codes
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

const SEPARATOR_WIDTH: usize = 60;

/// How command output is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Optional ANSI coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    color: bool,
}

impl Style {
    pub const fn new(color: bool) -> Self {
        Self { color }
    }

    pub const fn plain() -> Self {
        Self::new(false)
    }

    fn paint(self, code: &str, text: &str) -> String {
        if self.color {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    pub fn good(self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    pub fn bad(self, text: &str) -> String {
        self.paint(RED, text)
    }

    pub fn warn(self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    pub fn bold(self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    /// Bold section title followed by a separator line.
    pub fn section(self, title: &str) -> String {
        format!(
            "\n{}\n{}\n",
            self.paint(&format!("{BOLD}{BLUE}"), title),
            "-".repeat(SEPARATOR_WIDTH)
        )
    }
}

/// Format and style for one command's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub format: OutputFormat,
    pub style: Style,
}

impl RenderOptions {
    /// Colors are used only for text going to a terminal-bound stdout and
    /// never when the output is also written to a file.
    pub fn new(format: OutputFormat, no_color: bool, to_file: bool) -> Self {
        Self::for_stdout(format, no_color, to_file, io::stdout().is_terminal())
    }

    /// Same as [`RenderOptions::new`] with the terminal check supplied.
    pub const fn for_stdout(
        format: OutputFormat,
        no_color: bool,
        to_file: bool,
        stdout_is_terminal: bool,
    ) -> Self {
        let color =
            stdout_is_terminal && !no_color && !to_file && matches!(format, OutputFormat::Text);
        Self {
            format,
            style: Style::new(color),
        }
    }
}

/// Pretty JSON for any serializable view.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> CliResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Human-readable byte count using binary units.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.2} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.50 KiB");
        assert_eq!(format_bytes(8 * 1024 * 1024 * 1024), "8.00 GiB");
    }

    #[test]
    fn test_plain_style_has_no_escape_codes() {
        let style = Style::plain();
        assert_eq!(style.good("ok"), "ok");
        assert!(!style.section("Devices").contains('\x1b'));
    }

    #[test]
    fn test_color_only_for_text_on_a_terminal() {
        let text = OutputFormat::Text;
        assert!(RenderOptions::for_stdout(text, false, false, true).style.color);
        assert!(!RenderOptions::for_stdout(text, true, false, true).style.color);
        assert!(!RenderOptions::for_stdout(text, false, true, true).style.color);
        assert!(!RenderOptions::for_stdout(OutputFormat::Json, false, false, true).style.color);
    }

    #[test]
    fn test_piped_stdout_is_plain() {
        let opts = RenderOptions::for_stdout(OutputFormat::Text, false, false, false);
        assert_eq!(opts.style, Style::plain());
    }

    #[test]
    fn test_colored_style_wraps_text() {
        assert_eq!(Style::new(true).bad("x"), format!("{RED}x{RESET}"));
    }
}
