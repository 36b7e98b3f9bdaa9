//! Document assembler.
//!
//! Renders fetched records into [`OutputDocument`]s. Everything here is a
//! pure function of its inputs: no network, no disk, no clock. Field order and
//! omission rules are part of the output contract, so downstream indexes stay
//! stable between runs.
//!
//! [`OutputDocument`]: footprint_shared::OutputDocument

mod github;
mod leetcode;

use std::fmt::Display;

pub use github::{
    PROFILE_COMMIT_LIMIT, language_tally, render_github_documents, render_profile_document,
    render_repository_document,
};
pub use leetcode::render_leetcode_document;

/// Line-oriented text builder shared by the renderers.
#[derive(Debug, Default)]
struct TextBlock {
    lines: Vec<String>,
}

impl TextBlock {
    fn new(title: impl Into<String>) -> Self {
        Self {
            lines: vec![title.into()],
        }
    }

    fn line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }

    /// `  - key: value`
    fn attr(&mut self, key: &str, value: impl Display) {
        self.lines.push(format!("  - {key}: {value}"));
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }
}

/// Non-empty text value, if any.
fn present_text(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Floats keep a fractional part even when integral (`1500.0`, not `1500`).
fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}
