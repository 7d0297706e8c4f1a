//! CSV output
//!
//! Cells are flattened to plain text: entities decoded, tags stripped and
//! line breaks turned into spaces, so every record stays on one line.

use super::ResultWriter;
use crate::error::Result;
use crate::query::{AggregatedResult, Field, Row};
use scraper::Html;
use serde_json::Value;
use std::io::Write;

/// Writes a header of field display names followed by one record per row
pub struct CsvWriter;

impl ResultWriter for CsvWriter {
    fn format(&self) -> &str {
        "csv"
    }

    fn write(&self, data: &AggregatedResult, out: &mut dyn Write) -> Result<()> {
        let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(out);

        writer.write_record(header(&data.fields))?;
        for row in &data.rows {
            writer.write_record(record(row))?;
        }
        writer.flush()?;

        Ok(())
    }
}

fn header(fields: &[Field]) -> Vec<&str> {
    fields.iter().map(|f| f.display_name.as_str()).collect()
}

fn record(row: &Row) -> Vec<String> {
    row.iter().map(|v| sanitize(&cell_text(v))).collect()
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Plain text of an HTML fragment
fn text_of(fragment: &str) -> String {
    Html::parse_fragment(fragment)
        .root_element()
        .text()
        .collect()
}

/// Decode entities, then strip any markup they revealed, then flatten lines
pub fn sanitize(cell: &str) -> String {
    if !cell.contains(['<', '&']) {
        return cell.replace(['\r', '\n'], " ");
    }

    let decoded = text_of(cell);
    let stripped = if decoded.contains('<') {
        text_of(&decoded)
    } else {
        decoded
    };
    stripped.replace(['\r', '\n'], " ")
}
