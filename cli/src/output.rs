//! Output formatting for decode and check reports.

use command_args_core::{Attempt, Selection};
use serde::Serialize;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    Text,
}

/// Serializable view of one [`Selection`].
#[derive(Debug, Serialize)]
pub struct DecodeReport<'a> {
    pub command: &'a str,
    pub matched: bool,
    pub overload: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<&'a str>,
    /// Call-site arguments with trailing lists spread.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<serde_json::Value>,
    pub attempts: &'a [Attempt],
}

impl<'a> DecodeReport<'a> {
    pub fn new(selection: &'a Selection) -> Self {
        Self {
            command: &selection.command,
            matched: selection.is_match(),
            overload: selection.overload,
            signature: selection
                .matched_attempt()
                .and_then(|attempt| attempt.signature.as_deref()),
            arguments: selection.flattened(),
            attempts: &selection.attempts,
        }
    }
}

/// Result of decoding one line of an examples file.
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    /// 1-based line number.
    pub line: usize,
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overload: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Formats a decode report in the requested output format.
///
/// The text form prints the flattened arguments on success; every attempt's
/// trail is included on failure, or always when `trace` is set.
pub fn format_decode(
    report: &DecodeReport<'_>,
    format: OutputFormat,
    trace: bool,
) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(report).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Text => Ok(decode_to_text(report, trace)),
    }
}

/// Formats the outcomes of a check run in the requested output format.
pub fn format_check(outcomes: &[CheckOutcome], format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(outcomes)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(outcomes).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Text => Ok(check_to_text(outcomes)),
    }
}

fn decode_to_text(report: &DecodeReport<'_>, trace: bool) -> String {
    let mut out = String::new();

    match (&report.arguments, report.overload) {
        (Some(arguments), Some(index)) => {
            out.push_str(&format!(
                "{}: matched overload {index} {}\n",
                report.command,
                report.signature.unwrap_or("()")
            ));
            out.push_str(&format!("{arguments}\n"));
        }
        _ => out.push_str(&format!("{}: no overload matched\n", report.command)),
    }

    if trace || !report.matched {
        for attempt in report.attempts {
            out.push('\n');
            let mut entries = attempt.trail.entries().iter();
            if let Some(header) = entries.next() {
                out.push_str(header);
                out.push('\n');
            }
            for entry in entries {
                out.push_str("  ");
                out.push_str(entry);
                out.push('\n');
            }
        }
    }

    out
}

fn check_to_text(outcomes: &[CheckOutcome]) -> String {
    let mut out = String::new();

    for outcome in outcomes {
        if outcome.matched {
            out.push_str(&format!("ok    line {}: {}\n", outcome.line, outcome.input));
        } else {
            out.push_str(&format!(
                "FAIL  line {}: {}\n      {}\n",
                outcome.line,
                outcome.input,
                outcome.error.as_deref().unwrap_or("no overload matched")
            ));
        }
    }

    let passed = outcomes.iter().filter(|outcome| outcome.matched).count();
    out.push_str(&format!(
        "\n{passed}/{} line(s) decoded.\n",
        outcomes.len()
    ));

    out
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use command_args_core::{Schema, Slot, select_overload};

    use super::*;

    fn selection(words: &[&str]) -> Selection {
        let mut commands = HashMap::new();
        commands.insert(
            "INCRBY".to_string(),
            vec![
                Slot::required("key", Schema::Text),
                Slot::required("increment", Schema::Integer),
            ],
        );
        let tokens: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        select_overload("INCRBY", &tokens, &commands).unwrap()
    }

    #[test]
    fn test_text_success_omits_trail_unless_traced() {
        let selection = selection(&["counter", "5"]);
        let report = DecodeReport::new(&selection);

        let text = format_decode(&report, OutputFormat::Text, false).unwrap();
        assert_eq!(
            text,
            "INCRBY: matched overload 0 (key: string, increment: integer)\n[\"counter\",5]\n"
        );

        let traced = format_decode(&report, OutputFormat::Text, true).unwrap();
        assert!(traced.contains("overload 0: INCRBY(key: string, increment: integer)"));
        assert!(traced.contains("  matched `key` with \"counter\""));
    }

    #[test]
    fn test_text_failure_lists_trails() {
        let selection = selection(&["counter", "5.5"]);
        let report = DecodeReport::new(&selection);

        let text = format_decode(&report, OutputFormat::Text, false).unwrap();
        assert!(text.starts_with("INCRBY: no overload matched\n"));
        assert!(text.contains("(parsed as 5)"));
    }

    #[test]
    fn test_json_report_shape() {
        let selection = selection(&["counter", "5"]);
        let report = DecodeReport::new(&selection);

        let json = format_decode(&report, OutputFormat::Json, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["matched"], true);
        assert_eq!(value["arguments"], serde_json::json!(["counter", 5]));
        assert_eq!(value["attempts"][0]["error"], serde_json::Value::Null);
    }

    #[test]
    fn test_check_text_summary() {
        let outcomes = vec![
            CheckOutcome {
                line: 1,
                input: "GET k".into(),
                command: Some("GET".into()),
                matched: true,
                overload: Some(0),
                arguments: Some(serde_json::json!(["k"])),
                error: None,
            },
            CheckOutcome {
                line: 3,
                input: "NOPE".into(),
                command: None,
                matched: false,
                overload: None,
                arguments: None,
                error: Some("command \"NOPE\" not found".into()),
            },
        ];

        let text = format_check(&outcomes, OutputFormat::Text).unwrap();
        assert!(text.contains("ok    line 1: GET k\n"));
        assert!(text.contains("FAIL  line 3: NOPE\n      command \"NOPE\" not found\n"));
        assert!(text.ends_with("1/2 line(s) decoded.\n"));
    }
}
