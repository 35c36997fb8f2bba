//! JsonFormatter - one JSON object per record

use contracts::{Formatter, LogRecord};

/// Serializes the whole record; never fails outright
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, record: &LogRecord) -> String {
        match serde_json::to_string(record) {
            Ok(json) => json,
            Err(e) => format!("json marshal failed: {e} - {record:?}"),
        }
    }
}
