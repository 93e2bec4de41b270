//! Rendering records for the terminal.

use std::fmt::Write as _;

use super::OutputFormat;
use crate::config::Config;
use crate::error::Result;
use crate::record::Record;

/// Widest message excerpt shown in table output.
const TABLE_MESSAGE_WIDTH: usize = 60;

/// Render one record the way `jot add` reports it.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_record(record: &Record, json: bool, config: &Config) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(record)?);
    }
    Ok(plain(record, config))
}

/// Render a list of records in insertion order.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_records(records: &[Record], format: OutputFormat, config: &Config) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        OutputFormat::Plain => Ok(records
            .iter()
            .map(|r| plain(r, config))
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Table => Ok(render_table(records, config)),
    }
}

/// Message followed by an indented timestamp line.
fn plain(record: &Record, config: &Config) -> String {
    format!(
        "{}\n  {}",
        record.message,
        config.format_timestamp(record.created_at)
    )
}

fn render_table(records: &[Record], config: &Config) -> String {
    let stamps: Vec<String> = records
        .iter()
        .map(|r| config.format_timestamp(r.created_at))
        .collect();
    let stamp_width = stamps
        .iter()
        .map(|s| s.chars().count())
        .max()
        .unwrap_or(0)
        .max("CREATED".len());
    let index_width = records.len().to_string().len().max(1);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>index_width$}  {:<stamp_width$}  MESSAGE",
        "#", "CREATED"
    );
    for (i, (record, stamp)) in records.iter().zip(&stamps).enumerate() {
        let _ = writeln!(
            out,
            "{:>index_width$}  {:<stamp_width$}  {}",
            i + 1,
            stamp,
            excerpt(&record.message)
        );
    }
    out.trim_end().to_string()
}

/// First line of `message`, cut to the table width.
fn excerpt(message: &str) -> String {
    let first_line = message.lines().next().unwrap_or("");
    let multiline = message.contains('\n');

    if first_line.chars().count() > TABLE_MESSAGE_WIDTH {
        let cut: String = first_line.chars().take(TABLE_MESSAGE_WIDTH - 3).collect();
        format!("{cut}...")
    } else if multiline {
        format!("{first_line} ...")
    } else {
        first_line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn utc_config() -> Config {
        let mut config = Config::default();
        config.display.local_time = false;
        config
    }

    fn record(message: &str) -> Record {
        Record::with_timestamp(message, Utc.with_ymd_and_hms(2020, 3, 23, 8, 0, 0).unwrap())
    }

    #[test]
    fn test_render_record_plain() {
        let out = render_record(&record("hello"), false, &utc_config()).unwrap();
        assert_eq!(out, "hello\n  2020-03-23 08:00:00");
    }

    #[test]
    fn test_render_record_json() {
        let out = render_record(&record("hello"), true, &utc_config()).unwrap();
        let parsed: Record = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed.message, "hello");
    }

    #[test]
    fn test_render_records_plain_keeps_order() {
        let records = vec![record("first"), record("second")];
        let out = render_records(&records, OutputFormat::Plain, &utc_config()).unwrap();
        let first = out.find("first").unwrap();
        let second = out.find("second").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_render_records_plain_matches_single_record() {
        let config = utc_config();
        let records = vec![record("one"), record("two")];
        let list = render_records(&records, OutputFormat::Plain, &config).unwrap();
        let singles: Vec<String> = records
            .iter()
            .map(|r| render_record(r, false, &config).unwrap())
            .collect();
        assert_eq!(list, singles.join("\n"));
    }

    #[test]
    fn test_render_records_empty() {
        let out = render_records(&[], OutputFormat::Plain, &utc_config()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_render_records_json() {
        let records = vec![record("a"), record("b")];
        let out = render_records(&records, OutputFormat::Json, &utc_config()).unwrap();
        let parsed: Vec<Record> = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, records);
    }

    #[test]
    fn test_render_table() {
        let records = vec![record("alpha"), record("beta")];
        let out = render_records(&records, OutputFormat::Table, &utc_config()).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("CREATED"));
        assert!(lines[1].starts_with('1'));
        assert!(lines[1].ends_with("alpha"));
        assert!(lines[2].ends_with("beta"));
    }

    #[test]
    fn test_excerpt_truncates_long_lines() {
        let long = "x".repeat(100);
        let cut = excerpt(&long);
        assert_eq!(cut.chars().count(), TABLE_MESSAGE_WIDTH);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_excerpt_marks_multiline() {
        assert_eq!(excerpt("line one\nline two"), "line one ...");
        assert_eq!(excerpt("single"), "single");
    }
}
