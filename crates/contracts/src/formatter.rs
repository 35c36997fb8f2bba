use crate::LogRecord;

/// Renders a record into the text handed to a destination.
///
/// Formatting is pure: the same record always renders to the same string,
/// which lets the dispatcher reuse output between entries sharing a
/// formatter. Failures degrade to a diagnostic string instead of panicking.
pub trait Formatter: Send + Sync {
    fn format(&self, record: &LogRecord) -> String;
}

impl<F> Formatter for F
where
    F: Fn(&LogRecord) -> String + Send + Sync,
{
    fn format(&self, record: &LogRecord) -> String {
        self(record)
    }
}
