//! JSON output

use super::ResultWriter;
use crate::error::Result;
use crate::query::AggregatedResult;
use std::io::Write;

/// Writes the aggregated result as one JSON document
pub struct JsonWriter;

impl ResultWriter for JsonWriter {
    fn format(&self) -> &str {
        "json"
    }

    fn write(&self, data: &AggregatedResult, out: &mut dyn Write) -> Result<()> {
        serde_json::to_writer(&mut *out, data)?;
        Ok(())
    }
}
