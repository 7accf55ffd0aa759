//! Simple Output and Reporting
//!
//! This module renders mapped entities and client errors for the terminal.

use crate::cli::OutputFormat;
use crate::entity::Entity;
use crate::error::Error;

/// Output formatter for mapped responses
pub struct Output {
    format: OutputFormat,
    show_colors: bool,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            show_colors: atty::is(atty::Stream::Stdout),
        }
    }

    pub fn plain(format: OutputFormat) -> Self {
        Self {
            format,
            show_colors: false,
        }
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    pub fn format_entity(&self, entity: &Entity) -> String {
        match self.format {
            OutputFormat::Human => {
                let pretty = entity.pretty();
                if self.show_colors {
                    pretty
                        .lines()
                        .map(|line| self.colorize_tag(line))
                        .collect::<Vec<_>>()
                        .join("\n")
                } else {
                    pretty.trim_end().to_string()
                }
            }
            OutputFormat::Json => entity.to_json().to_string(),
        }
    }

    fn colorize_tag(&self, line: &str) -> String {
        let indent = line.len() - line.trim_start().len();
        let rest = &line[indent..];
        match rest.find('>') {
            Some(end) if rest.starts_with('<') => format!(
                "{}{}{}",
                &line[..indent],
                self.colorize(&rest[..=end], "36"),
                &rest[end + 1..]
            ),
            _ => line.to_string(),
        }
    }

    pub fn format_error(&self, error: &Error) -> String {
        match error {
            Error::Protocol { code, message } => format!(
                "{} {} (code {})",
                self.colorize("✗ API ERROR", "31"),
                message,
                code
            ),
            Error::AttributeConflict { .. } => format!(
                "{} {}\n    the response shape is not modelled; extend the multiples table",
                self.colorize("⚠ MAPPING ERROR", "33"),
                error
            ),
            _ => format!("{} {}", self.colorize("✗ ERROR", "31"), error),
        }
    }
}
