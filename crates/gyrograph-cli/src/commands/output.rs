//! Rendering of computations on stdout.

use gyrograph_core::{Computation, ValidationRecord};
use serde::Serialize;

/// Output format for computed results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Indented JSON (default).
    #[default]
    Json,
    /// Single-line JSON, one document per line.
    Compact,
    /// Human-readable summary.
    Text,
}

/// Render any serializable value as JSON in the requested layout.
///
/// `Text` falls back to indented JSON for values without a text form.
pub fn render_json<T: Serialize>(value: &T, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Compact => serde_json::to_string(value),
        OutputFormat::Json | OutputFormat::Text => serde_json::to_string_pretty(value),
    }
}

pub fn render_computation(
    computation: &Computation,
    format: OutputFormat,
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(text_summary(computation)),
        _ => render_json(computation, format),
    }
}

fn text_summary(computation: &Computation) -> String {
    let mut lines = vec![format!(
        "{}({}) = {}",
        computation.operation, computation.model, computation.result
    )];
    for warning in &computation.warnings {
        lines.push(format!("warning: {warning}"));
    }
    if let Some(record) = &computation.validation {
        lines.push(validation_line(record));
    }
    lines.join("\n")
}

fn validation_line(record: &ValidationRecord) -> String {
    let mut line = format!("validation: {:?}", record.status());
    if let Some(bound) = record.error_bound {
        line.push_str(&format!(" (max difference {bound:e})"));
    }
    if let Some(reason) = &record.reason {
        line.push_str(&format!(" ({reason})"));
    }
    line.push_str(&format!(" after {} attempt(s)", record.attempts));
    line
}
