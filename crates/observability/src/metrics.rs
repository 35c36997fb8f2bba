//! Dispatch counter export
//!
//! Mirrors [`dispatcher::MetricsSnapshot`] into the `metrics` facade and
//! summarises it for humans.

use dispatcher::MetricsSnapshot;
use metrics::{counter, gauge};

/// Publish a dispatcher snapshot.
///
/// The dispatcher keeps running totals, so counters are set absolutely and it
/// is safe to call this repeatedly with newer snapshots.
pub fn record_dispatch_metrics(snapshot: &MetricsSnapshot) {
    counter!("sawmill_records_submitted_total").absolute(snapshot.submitted);
    counter!("sawmill_records_dropped_total").absolute(snapshot.dropped);
    counter!("sawmill_records_dispatched_total").absolute(snapshot.dispatched);
    counter!("sawmill_destination_writes_total").absolute(snapshot.delivered);
    counter!("sawmill_destination_close_failures_total").absolute(snapshot.close_failures);

    let backlog = snapshot
        .submitted
        .saturating_sub(snapshot.dispatched);
    gauge!("sawmill_queue_backlog").set(backlog as f64);
}

/// Count lines read by the `pipe` command
pub fn record_lines_piped(lines: u64) {
    counter!("sawmill_pipe_lines_total").increment(lines);
}

/// Human-readable view of a snapshot
#[derive(Debug, Clone, Default)]
pub struct DispatchSummary {
    pub submitted: u64,
    pub dropped: u64,
    pub dispatched: u64,
    pub delivered: u64,
    pub close_failures: u64,
    /// Dropped as a share of all submission attempts, in percent
    pub drop_rate: f64,
    /// Average destinations written per dispatched record
    pub fan_out: f64,
}

impl From<&MetricsSnapshot> for DispatchSummary {
    fn from(snapshot: &MetricsSnapshot) -> Self {
        let attempts = snapshot.submitted + snapshot.dropped;
        Self {
            submitted: snapshot.submitted,
            dropped: snapshot.dropped,
            dispatched: snapshot.dispatched,
            delivered: snapshot.delivered,
            close_failures: snapshot.close_failures,
            drop_rate: if attempts > 0 {
                snapshot.dropped as f64 / attempts as f64 * 100.0
            } else {
                0.0
            },
            fan_out: if snapshot.dispatched > 0 {
                snapshot.delivered as f64 / snapshot.dispatched as f64
            } else {
                0.0
            },
        }
    }
}

impl std::fmt::Display for DispatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Dispatch Summary ===")?;
        writeln!(f, "Submitted records: {}", self.submitted)?;
        writeln!(
            f,
            "Dropped records: {} ({:.2}%)",
            self.dropped, self.drop_rate
        )?;
        writeln!(f, "Dispatched records: {}", self.dispatched)?;
        writeln!(
            f,
            "Destination writes: {} ({:.2} per record)",
            self.delivered, self.fan_out
        )?;
        if self.close_failures > 0 {
            writeln!(f, "Destination close failures: {}", self.close_failures)?;
        }
        Ok(())
    }
}
