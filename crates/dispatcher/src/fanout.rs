//! Fan-out resolver - per entry threshold resolution and delivery

use std::sync::Arc;

use contracts::{Formatter, Level, LogRecord};

use crate::entry::RegistryEntry;

/// Threshold that applies to `record` for `entry`.
///
/// Lookup order, first hit wins: function path, method path, module path,
/// then the entry default. Keys match exactly; there is no prefix matching.
pub fn effective_threshold(entry: &RegistryEntry, record: &LogRecord) -> Level {
    let granulars = &entry.granulars;
    if granulars.is_empty() {
        return entry.level;
    }
    granulars
        .get(&record.func_path)
        .or_else(|| granulars.get(&record.method_path))
        .or_else(|| granulars.get(&record.package_path))
        .copied()
        .unwrap_or(entry.level)
}

/// Whether `entry` takes `record`. A `None` threshold accepts everything.
pub fn should_deliver(entry: &RegistryEntry, record: &LogRecord) -> bool {
    record.level.passes(effective_threshold(entry, record))
}

/// Deliver `record` to every qualifying entry, in registry order.
///
/// Each qualifying entry formats with its own formatter. Output is reused
/// only for consecutive qualifying entries sharing the same formatter
/// instance. Returns the number of entries written to.
pub fn fan_out(entries: &mut [RegistryEntry], record: &LogRecord) -> usize {
    let mut rendered: Option<(Arc<dyn Formatter>, String)> = None;
    let mut delivered = 0;

    for entry in entries.iter_mut() {
        if !should_deliver(entry, record) {
            continue;
        }

        let reusable = matches!(
            &rendered,
            Some((formatter, _)) if Arc::ptr_eq(formatter, &entry.formatter)
        );
        if !reusable {
            let text = entry.formatter.format(record);
            rendered = Some((Arc::clone(&entry.formatter), text));
        }

        if let Some((_, text)) = &rendered {
            entry.destination.write(text);
            delivered += 1;
        }
    }

    delivered
}
