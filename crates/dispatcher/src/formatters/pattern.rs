//! PatternFormatter - printf-like layout strings
//!
//! | verb | output |
//! |------|--------|
//! | `%T` | time, `15:04:05.000` |
//! | `%t` | time, `15:04:05` |
//! | `%D` | date, `2006-01-02` |
//! | `%d` | date, `2006/01/02` |
//! | `%L` | level code (`INFO`) |
//! | `%S` | `file:line` |
//! | `%s` | `file-name:line` |
//! | `%x` | file name without `.rs` |
//! | `%M` | message |
//! | `%P` | function path |
//! | `%p` | module path |
//! | `%%` | `%` |
//!
//! A width, optionally prefixed with `-` for left alignment, may sit between
//! `%` and the verb (`%-8L`). Times are UTC.

use std::fmt::Write as _;
use std::path::Path;

use contracts::{Formatter, LogRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    TimeMillis,
    Time,
    DateDash,
    DateSlash,
    Level,
    Source,
    ShortSource,
    FileStem,
    Message,
    FuncPath,
    PackagePath,
}

impl Verb {
    fn from_char(c: char) -> Option<Self> {
        let verb = match c {
            'T' => Self::TimeMillis,
            't' => Self::Time,
            'D' => Self::DateDash,
            'd' => Self::DateSlash,
            'L' => Self::Level,
            'S' => Self::Source,
            's' => Self::ShortSource,
            'x' => Self::FileStem,
            'M' => Self::Message,
            'P' => Self::FuncPath,
            'p' => Self::PackagePath,
            _ => return None,
        };
        Some(verb)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field {
        verb: Verb,
        width: usize,
        left: bool,
    },
}

/// Layout-string formatter; the pattern is parsed once up front
#[derive(Debug, Clone)]
pub struct PatternFormatter {
    pattern: String,
    segments: Vec<Segment>,
}

impl PatternFormatter {
    /// Parse `pattern`; an empty pattern renders the bare message
    pub fn new(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let segments = if pattern.is_empty() {
            vec![Segment::Field {
                verb: Verb::Message,
                width: 0,
                left: false,
            }]
        } else {
            parse(&pattern)
        };
        Self { pattern, segments }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl Default for PatternFormatter {
    fn default() -> Self {
        Self::new("[%D %T] [%L] (%S) %M")
    }
}

impl Formatter for PatternFormatter {
    fn format(&self, record: &LogRecord) -> String {
        let mut out = String::with_capacity(self.pattern.len() + record.message.len() + 32);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field { verb, width, left } => {
                    let value = render(*verb, record);
                    // Writing into a String never fails
                    let _ = if *left {
                        write!(out, "{value:<width$}")
                    } else {
                        write!(out, "{value:>width$}")
                    };
                }
            }
        }
        out
    }
}

fn render(verb: Verb, record: &LogRecord) -> String {
    let ts = &record.timestamp;
    match verb {
        Verb::TimeMillis => ts.format("%H:%M:%S%.3f").to_string(),
        Verb::Time => ts.format("%H:%M:%S").to_string(),
        Verb::DateDash => ts.format("%Y-%m-%d").to_string(),
        Verb::DateSlash => ts.format("%Y/%m/%d").to_string(),
        Verb::Level => record.level.code().to_string(),
        Verb::Source => format!("{}:{}", record.source_file, record.source_line),
        Verb::ShortSource => format!("{}:{}", file_name(&record.source_file), record.source_line),
        Verb::FileStem => {
            let name = file_name(&record.source_file);
            name.strip_suffix(".rs").unwrap_or(name).to_string()
        }
        Verb::Message => record.message.clone(),
        Verb::FuncPath => record.func_path.clone(),
        Verb::PackagePath => record.package_path.clone(),
    }
}

fn file_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
}

fn parse(pattern: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            literal.push(c);
            continue;
        }

        // Collect the optional alignment flag and width
        let mut spec = String::from("%");
        let left = chars.next_if_eq(&'-').is_some();
        if left {
            spec.push('-');
        }
        let mut width = 0usize;
        while let Some(digit) = chars.next_if(char::is_ascii_digit) {
            spec.push(digit);
            width = width.saturating_mul(10).saturating_add(digit as usize - '0' as usize);
        }

        match chars.next() {
            Some('%') if spec == "%" => literal.push('%'),
            Some(v) => match Verb::from_char(v) {
                Some(verb) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field { verb, width, left });
                }
                None => {
                    literal.push_str(&spec);
                    literal.push(v);
                }
            },
            None => literal.push_str(&spec),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use contracts::{CallSite, Level};

    fn record() -> LogRecord {
        LogRecord::new(Level::Info, "listening")
            .at(CallSite {
                file: "crates/server/src/listener.rs".into(),
                line: 87,
                func_path: "server::listener::Listener::bind".into(),
                method_path: "server::listener::Listener".into(),
                package_path: "server::listener".into(),
            })
            .with_timestamp(Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 2).unwrap()
                + chrono::Duration::milliseconds(45))
    }

    #[test]
    fn test_every_verb() {
        let f = PatternFormatter::new("%T|%t|%D|%d|%L|%S|%s|%x|%M|%P|%p|%%");
        assert_eq!(
            f.format(&record()),
            "07:05:02.045|07:05:02|2024-03-09|2024/03/09|INFO|crates/server/src/listener.rs:87|\
             listener.rs:87|listener|listening|server::listener::Listener::bind|server::listener|%"
        );
    }

    #[test]
    fn test_width_and_alignment() {
        let f = PatternFormatter::new("[%-6L][%6L][%-10x]");
        assert_eq!(f.format(&record()), "[INFO  ][  INFO][listener  ]");
    }

    #[test]
    fn test_unknown_verbs_are_literal() {
        let f = PatternFormatter::new("%Q %-3Z %M %");
        assert_eq!(f.format(&record()), "%Q %-3Z listening %");
    }

    #[test]
    fn test_empty_pattern_is_message() {
        assert_eq!(PatternFormatter::new("").format(&record()), "listening");
    }

    #[test]
    fn test_legacy_layout() {
        let f = PatternFormatter::new("server [%D %T] [%L] %M");
        assert_eq!(
            f.format(&record()),
            "server [2024-03-09 07:05:02.045] [INFO] listening"
        );
    }
}
