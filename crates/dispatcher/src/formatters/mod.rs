//! Formatter implementations
//!
//! Contains JsonFormatter and PatternFormatter.

mod json;
mod pattern;

pub use self::json::JsonFormatter;
pub use self::pattern::PatternFormatter;
