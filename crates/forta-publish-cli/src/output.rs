//! Rendering of command results.

use std::fmt::Write as _;

use crate::terminal::ColorPalette;

/// Outcome of a command: a heading followed by aligned `label: value` lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    heading: String,
    skipped: bool,
    fields: Vec<(&'static str, String)>,
}

impl Report {
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            skipped: false,
            fields: Vec::new(),
        }
    }

    /// Mark the report as describing a command that made no change.
    pub fn skipped(mut self) -> Self {
        self.skipped = true;
        self
    }

    pub fn field(mut self, label: &'static str, value: impl ToString) -> Self {
        self.fields.push((label, value.to_string()));
        self
    }

    pub fn render(&self, palette: &ColorPalette) -> String {
        let heading_color = if self.skipped {
            palette.notice
        } else {
            palette.success
        };
        let width = self
            .fields
            .iter()
            .map(|(label, _)| label.len())
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        let _ = writeln!(out, "{heading_color}{}{}", self.heading, palette.reset);
        for (label, value) in &self.fields {
            let _ = writeln!(
                out,
                "  {}{:<width$}{}  {}{}{}",
                palette.label,
                format!("{label}:"),
                palette.reset,
                palette.value,
                value,
                palette.reset,
                width = width + 1,
            );
        }
        out
    }

    /// Print to stdout using the detected palette.
    pub fn print(&self) {
        print!("{}", self.render(&ColorPalette::detect()));
    }
}
