//! Pretty/text/JSON rendering shared by every `zen` command.
//!
//! Precedence (highest wins):
//! 1. `--format` / `--json`
//! 2. `FORMAT` env var, then `output` in the config file
//! 3. Pretty on a TTY, text when piped

use clap::ValueEnum;
use dailyzen_core::error::ErrorCode;
use serde::Serialize;
use std::io::{self, Write};

pub const PRETTY_RULE_WIDTH: usize = 60;

pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<12} {}", format!("{key}:"), value.as_ref())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Framed output for people.
    Pretty,
    /// Plain tab-separated lines for scripts.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }

    /// Map the mode string resolved from env and config.
    fn from_resolved(raw: &str) -> Self {
        match raw {
            "json" => Self::Json,
            "text" => Self::Text,
            _ => Self::Pretty,
        }
    }
}

/// Flags first, then whatever the config layer resolved.
pub fn resolve_output_mode(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    resolved: &str,
) -> OutputMode {
    if let Some(mode) = format_flag {
        return mode;
    }
    if json_flag {
        return OutputMode::Json;
    }
    OutputMode::from_resolved(resolved)
}

/// Render a serializable value with separate text and pretty renderers.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, &mut out)?,
        OutputMode::Pretty => pretty_fn(value, &mut out)?,
    }
    Ok(())
}

/// Render a serializable value; pretty and text share one renderer.
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => human_fn(value, &mut out)?,
    }
    Ok(())
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Stable `E####` code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Set when running the same command again may succeed.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub retryable: bool,
    #[serde(skip)]
    pub code: Option<ErrorCode>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
            retryable: false,
            code: None,
        }
    }

    /// Message plus the code's stable identifier and hint.
    ///
    /// A leading `E####: ` already present in `message` is dropped; the
    /// code is carried separately.
    pub fn coded(message: impl Into<String>, code: ErrorCode) -> Self {
        let message = message.into();
        let prefix = format!("{}: ", code.code());
        let message = message
            .strip_prefix(&prefix)
            .map_or_else(|| message.clone(), str::to_string);
        Self {
            message,
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
            retryable: code.is_retryable(),
            code: Some(code),
        }
    }
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    write_error(&mut out, mode, error)?;
    Ok(())
}

fn write_error(out: &mut dyn Write, mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({ "error": error });
            serde_json::to_writer_pretty(&mut *out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Pretty => {
            match error.code {
                Some(code) => {
                    writeln!(out, "error[{code}]: {}", code.message())?;
                    writeln!(out, "  {}", error.message)?;
                }
                None => writeln!(out, "error: {}", error.message)?,
            }
            write_error_footer(out, error)?;
        }
        OutputMode::Text => {
            match &error.error_code {
                Some(code) => writeln!(out, "error[{code}]: {}", error.message)?,
                None => writeln!(out, "error: {}", error.message)?,
            }
            write_error_footer(out, error)?;
        }
    }
    Ok(())
}

fn write_error_footer(out: &mut dyn Write, error: &CliError) -> io::Result<()> {
    if let Some(suggestion) = &error.suggestion {
        writeln!(out, "  suggestion: {suggestion}")?;
    }
    if error.retryable {
        writeln!(out, "  retryable: yes")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_flag_wins_over_json_and_resolved() {
        assert_eq!(
            resolve_output_mode(Some(OutputMode::Text), true, "pretty"),
            OutputMode::Text
        );
    }

    #[test]
    fn json_flag_wins_over_resolved() {
        assert_eq!(resolve_output_mode(None, true, "text"), OutputMode::Json);
    }

    #[test]
    fn resolved_string_maps_to_mode() {
        assert_eq!(resolve_output_mode(None, false, "json"), OutputMode::Json);
        assert_eq!(resolve_output_mode(None, false, "text"), OutputMode::Text);
        assert_eq!(resolve_output_mode(None, false, "pretty"), OutputMode::Pretty);
    }

    #[test]
    fn coded_error_carries_hint_and_code() {
        let err = CliError::coded("no quote with ID '99'", ErrorCode::QuoteNotFound);
        assert_eq!(err.error_code.as_deref(), Some("E2001"));
        assert!(err.suggestion.as_deref().unwrap().contains("zen quotes"));
    }

    #[test]
    fn human_error_includes_code_and_suggestion() {
        let mut buf = Vec::new();
        let err = CliError::coded("bad config", ErrorCode::ConfigParseError);
        write_error(&mut buf, OutputMode::Text, &err).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("error[E1001]: bad config"));
        assert!(text.contains("suggestion:"));
    }

    #[test]
    fn coded_error_drops_duplicate_code_prefix() {
        let err = CliError::coded("E2002: invalid quote ID 'abc'", ErrorCode::InvalidQuoteId);
        assert_eq!(err.message, "invalid quote ID 'abc'");
        assert!(!err.retryable);
    }

    #[test]
    fn pretty_error_leads_with_code_summary() {
        let mut buf = Vec::new();
        let err = CliError::coded("card declined", ErrorCode::PurchaseRejected);
        write_error(&mut buf, OutputMode::Pretty, &err).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("error[E5002]: Purchase rejected\n  card declined\n"));
        assert!(text.contains("retryable: yes"));
    }

    #[test]
    fn retryable_flag_only_serialized_when_set() {
        let mut buf = Vec::new();
        let err = CliError::coded("busy", ErrorCode::PurchaseUnavailable);
        write_error(&mut buf, OutputMode::Json, &err).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["error"]["retryable"], true);

        let mut buf = Vec::new();
        let err = CliError::coded("nope", ErrorCode::QuoteNotFound);
        write_error(&mut buf, OutputMode::Json, &err).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert!(value["error"].get("retryable").is_none());
    }

    #[test]
    fn json_error_is_wrapped() {
        let mut buf = Vec::new();
        write_error(&mut buf, OutputMode::Json, &CliError::new("boom")).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["error"]["message"], "boom");
        assert!(value["error"].get("error_code").is_none());
    }
}
