//! Dispatcher - the sequential actor owning the registry

use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::thread;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use contracts::{
    Destination, DestinationType, FilterConfig, FormatKind, Formatter, Level, LogRecord,
    LoggingBlueprint,
};

use crate::destinations::{ConsoleDestination, FileDestination, SocketDestination};
use crate::entry::RegistryEntry;
use crate::error::DispatchError;
use crate::fanout::fan_out;
use crate::formatters::{JsonFormatter, PatternFormatter};
use crate::handle::DispatchHandle;
use crate::metrics::DispatchMetrics;

/// Record queue capacity when nothing else is configured
pub const DEFAULT_QUEUE_CAPACITY: usize = 300;

/// Name of the OS thread hosting the dispatcher
pub const DEFAULT_THREAD_NAME: &str = "sawmill-dispatch";

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Bounded record queue size; records beyond it are dropped
    pub queue_capacity: usize,
    /// Thread name used by [`Dispatcher::spawn_thread`]
    pub thread_name: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }
}

impl DispatcherConfig {
    /// Builder-style method for the queue capacity (at least 1)
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Builder-style method for the thread name
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }
}

/// A control message stamped with the number of records admitted before it
pub(crate) struct Control {
    pub(crate) after: u64,
    pub(crate) message: ControlMessage,
}

/// Registry mutations, applied in arrival order
pub(crate) enum ControlMessage {
    Add {
        entry: RegistryEntry,
        reply: oneshot::Sender<usize>,
    },
    Replace {
        index: usize,
        entry: RegistryEntry,
        reply: oneshot::Sender<Result<(), DispatchError>>,
    },
    SetLevel {
        index: usize,
        level: Level,
        reply: oneshot::Sender<Result<(), DispatchError>>,
    },
    SetFormatter {
        index: usize,
        formatter: Arc<dyn Formatter>,
        reply: oneshot::Sender<Result<(), DispatchError>>,
    },
    Close {
        reply: oneshot::Sender<()>,
    },
}

/// The dispatch actor.
///
/// Owns the registry. Records and control messages are processed one at a
/// time, so a record's fan-out never overlaps a registry change. A control
/// message is held back until every record admitted before it has been
/// dispatched, and never waits for records admitted after it.
pub struct Dispatcher {
    entries: Vec<RegistryEntry>,
    records: mpsc::Receiver<LogRecord>,
    control: mpsc::UnboundedReceiver<Control>,
    metrics: Arc<DispatchMetrics>,
    /// Records taken off the queue so far
    dispatched: u64,
}

impl Dispatcher {
    /// Create a dispatcher and the handle feeding it. Nothing runs until
    /// [`Dispatcher::run`] is driven.
    pub fn new(config: &DispatcherConfig) -> (Self, DispatchHandle) {
        let (record_tx, records) = mpsc::channel(config.queue_capacity.max(1));
        let (control_tx, control) = mpsc::unbounded_channel();
        let metrics = Arc::new(DispatchMetrics::new());

        let dispatcher = Self {
            entries: Vec::new(),
            records,
            control,
            metrics: Arc::clone(&metrics),
            dispatched: 0,
        };
        (dispatcher, DispatchHandle::new(record_tx, control_tx, metrics))
    }

    /// Run until closed, or until every handle is dropped.
    ///
    /// Either way the queued records are drained and every destination is
    /// closed once before this returns.
    #[instrument(name = "dispatcher_run", skip(self))]
    pub async fn run(mut self) {
        debug!("Dispatcher started");

        let mut pending: Option<Control> = None;
        let close_reply = loop {
            if let Some(control) = pending.take() {
                if self.dispatched < control.after {
                    // Records admitted before the control message go first
                    if let Some(record) = self.records.recv().await {
                        self.dispatch_record(&record);
                        pending = Some(control);
                        continue;
                    }
                }
                if let Some(reply) = self.apply(control.message) {
                    break Some(reply);
                }
                continue;
            }

            tokio::select! {
                biased;

                Some(record) = self.records.recv() => self.dispatch_record(&record),
                Some(control) = self.control.recv() => pending = Some(control),
                else => break None,
            }
        };

        self.drain().await;
        self.close_destinations();

        let snapshot = self.metrics.snapshot();
        info!(
            entries = self.entries.len(),
            dispatched = snapshot.dispatched,
            dropped = snapshot.dropped,
            "Dispatcher shutdown complete"
        );

        // Release the registry before acknowledging
        drop(self);
        if let Some(reply) = close_reply {
            let _ = reply.send(());
        }
    }

    /// Spawn the dispatcher as a task on the current runtime
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    /// Run the dispatcher on a dedicated OS thread with its own
    /// current-thread runtime
    pub fn spawn_thread(self, name: &str) -> io::Result<thread::JoinHandle<()>> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        thread::Builder::new()
            .name(name.to_string())
            .spawn(move || runtime.block_on(self.run()))
    }

    /// Apply one control message. Returns the reply channel on `Close`.
    fn apply(&mut self, message: ControlMessage) -> Option<oneshot::Sender<()>> {
        match message {
            ControlMessage::Add { entry, reply } => {
                let index = self.entries.len();
                debug!(index, destination = %entry.name(), "Registry entry added");
                self.entries.push(entry);
                let _ = reply.send(index);
            }
            ControlMessage::Replace {
                index,
                entry,
                reply,
            } => {
                let _ = reply.send(self.replace(index, entry));
            }
            ControlMessage::SetLevel {
                index,
                level,
                reply,
            } => {
                let result = self.entry_mut(index).map(|entry| entry.level = level);
                let _ = reply.send(result);
            }
            ControlMessage::SetFormatter {
                index,
                formatter,
                reply,
            } => {
                let result = self
                    .entry_mut(index)
                    .map(|entry| entry.formatter = formatter);
                let _ = reply.send(result);
            }
            ControlMessage::Close { reply } => return Some(reply),
        }
        None
    }

    fn entry_mut(&mut self, index: usize) -> Result<&mut RegistryEntry, DispatchError> {
        let len = self.entries.len();
        self.entries
            .get_mut(index)
            .ok_or(DispatchError::UnknownEntry { index, len })
    }

    fn replace(&mut self, index: usize, entry: RegistryEntry) -> Result<(), DispatchError> {
        let slot = self.entry_mut(index)?;
        if let Err(e) = slot.destination.close() {
            warn!(
                index,
                destination = %slot.name(),
                error = %e,
                "Failed to close replaced destination"
            );
        }
        debug!(index, destination = %entry.name(), "Registry entry replaced");
        *slot = entry;
        Ok(())
    }

    fn dispatch_record(&mut self, record: &LogRecord) {
        self.dispatched += 1;
        let delivered = fan_out(&mut self.entries, record);
        self.metrics.inc_dispatched();
        self.metrics.add_delivered(delivered as u64);
    }

    /// Shut the rejection gate, then deliver whatever is still queued
    async fn drain(&mut self) {
        self.records.close();

        // After close(), recv() yields the buffered records and then None
        // without waiting for new ones
        let mut drained = 0u64;
        while let Some(record) = self.records.recv().await {
            self.dispatch_record(&record);
            drained += 1;
        }
        debug!(drained, "Record queue drained");
    }

    fn close_destinations(&mut self) {
        for (index, entry) in self.entries.iter_mut().enumerate() {
            if let Err(e) = entry.destination.close() {
                self.metrics.inc_close_failures();
                error!(
                    index,
                    destination = %entry.name(),
                    error = %e,
                    "Failed to close destination"
                );
            }
        }
    }
}

/// Start a dispatcher on its own thread and return its handle.
///
/// If the thread cannot be started the failure is logged and the returned
/// handle is already closed: records are dropped and control operations
/// report [`DispatchError::Closed`].
#[instrument(
    name = "dispatcher_create",
    skip(config),
    fields(queue_capacity = config.queue_capacity)
)]
pub fn create_dispatcher(config: &DispatcherConfig) -> DispatchHandle {
    let (dispatcher, handle) = Dispatcher::new(config);
    if let Err(e) = dispatcher.spawn_thread(&config.thread_name) {
        error!(error = %e, "Failed to start dispatch thread");
    }
    handle
}

/// Build a registry entry from a configuration filter
#[instrument(
    name = "dispatcher_create_entry",
    skip(filter),
    fields(filter = %filter.label(), destination_type = ?filter.destination_type)
)]
pub fn create_entry(filter: &FilterConfig) -> Result<RegistryEntry, DispatchError> {
    let name = filter.label();
    let destination: Box<dyn Destination> = match filter.destination_type {
        DestinationType::Console => {
            Box::new(ConsoleDestination::from_params(name, &filter.properties))
        }
        DestinationType::File => Box::new(
            FileDestination::from_params(name, &filter.properties)
                .map_err(|e| DispatchError::destination_creation(name, e.to_string()))?,
        ),
        DestinationType::Socket => Box::new(
            SocketDestination::from_params(name, &filter.properties)
                .map_err(|e| DispatchError::destination_creation(name, e.to_string()))?,
        ),
    };

    let formatter: Arc<dyn Formatter> = match filter.format_kind() {
        FormatKind::Json => Arc::new(JsonFormatter),
        FormatKind::Pattern => Arc::new(PatternFormatter::new(filter.pattern())),
    };

    let granulars: HashMap<String, Level> = filter
        .granulars
        .iter()
        .map(|granular| (granular.path.clone(), Level::from_name(&granular.level)))
        .collect();

    Ok(
        RegistryEntry::from_parts(destination, Level::from_name(&filter.level), formatter)
            .with_granulars(granulars),
    )
}

/// Build entries for every enabled filter, in file order
pub fn create_entries(blueprint: &LoggingBlueprint) -> Result<Vec<RegistryEntry>, DispatchError> {
    blueprint.enabled_filters().map(create_entry).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ContractError, GranularConfig};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Journal {
        lines: Vec<String>,
        closes: usize,
    }

    /// Destination recording everything into a shared journal
    #[derive(Clone, Default)]
    struct Recorder {
        journal: Arc<Mutex<Journal>>,
        fail_close: bool,
    }

    impl Recorder {
        fn failing() -> Self {
            Self {
                fail_close: true,
                ..Self::default()
            }
        }

        fn lines(&self) -> Vec<String> {
            self.journal.lock().unwrap().lines.clone()
        }

        fn closes(&self) -> usize {
            self.journal.lock().unwrap().closes
        }
    }

    impl Destination for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn write(&mut self, message: &str) {
            self.journal.lock().unwrap().lines.push(message.to_string());
        }

        fn close(&mut self) -> Result<(), ContractError> {
            self.journal.lock().unwrap().closes += 1;
            if self.fail_close {
                return Err(ContractError::destination_close("recorder", "mock failure"));
            }
            Ok(())
        }
    }

    fn message(record: &LogRecord) -> String {
        record.message.clone()
    }

    fn entry(recorder: &Recorder, level: Level) -> RegistryEntry {
        RegistryEntry::new(recorder.clone(), level, message)
    }

    #[tokio::test]
    async fn test_add_returns_sequential_indices() {
        let (dispatcher, handle) = Dispatcher::new(&DispatcherConfig::default());
        let task = dispatcher.spawn();

        for expected in 0..4 {
            let index = handle
                .add_entry(entry(&Recorder::default(), Level::None))
                .await
                .unwrap();
            assert_eq!(index, expected);
        }

        handle.close().await;
        task.await.unwrap();
    }

    #[test]
    fn test_add_returns_sequential_indices_under_record_traffic() {
        let config = DispatcherConfig::default().with_queue_capacity(8192);
        let handle = create_dispatcher(&config);
        let all = Recorder::default();
        assert_eq!(handle.add_entry_blocking(entry(&all, Level::None)).unwrap(), 0);

        std::thread::scope(|scope| {
            for worker in 0..4 {
                let handle = handle.clone();
                scope.spawn(move || {
                    for i in 0..500 {
                        handle.submit(LogRecord::new(Level::Info, format!("{worker} {i}")));
                    }
                });
            }

            for expected in 1..=8 {
                let index = handle
                    .add_entry_blocking(entry(&Recorder::default(), Level::None))
                    .unwrap();
                assert_eq!(index, expected);
            }
        });
        handle.close_blocking();

        // Each producer's records arrive in submission order
        let mut last: HashMap<u32, u32> = HashMap::new();
        for line in all.lines() {
            let (worker, i) = line.split_once(' ').unwrap();
            let (worker, i): (u32, u32) = (worker.parse().unwrap(), i.parse().unwrap());
            if let Some(previous) = last.insert(worker, i) {
                assert!(i > previous, "worker {worker}: {i} after {previous}");
            }
        }
        assert_eq!(all.lines().len() as u64, handle.metrics().submitted);
    }

    #[tokio::test]
    async fn test_control_waits_for_records_admitted_before_it() {
        let (dispatcher, handle) = Dispatcher::new(&DispatcherConfig::default());
        let task = dispatcher.spawn();
        let out = Recorder::default();
        handle.add_entry(entry(&out, Level::None)).await.unwrap();

        for i in 0..300 {
            assert!(handle.submit(LogRecord::new(Level::Info, format!("m{i}"))));
        }
        handle.set_level(0, Level::Critical).await.unwrap();
        handle.submit(LogRecord::new(Level::Info, "filtered"));
        handle.close().await;

        assert_eq!(out.lines().len(), 300);
        assert_eq!(out.lines().last().map(String::as_str), Some("m299"));
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_replace_after_long_burst_keeps_burst_on_old_destination() {
        let config = DispatcherConfig::default().with_queue_capacity(1000);
        let (dispatcher, handle) = Dispatcher::new(&config);
        let task = dispatcher.spawn();
        let old = Recorder::default();
        let new = Recorder::default();
        handle.add_entry(entry(&old, Level::None)).await.unwrap();

        for i in 0..1000 {
            handle.submit(LogRecord::new(Level::Info, format!("m{i}")));
        }
        handle.replace_entry(0, entry(&new, Level::None)).await.unwrap();
        handle.submit(LogRecord::new(Level::Info, "after"));
        handle.close().await;

        assert_eq!(old.lines().len(), 1000);
        assert_eq!(new.lines(), vec!["after"]);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_threshold_scenario() {
        let (dispatcher, handle) = Dispatcher::new(&DispatcherConfig::default());
        let task = dispatcher.spawn();
        let out = Recorder::default();
        handle.add_entry(entry(&out, Level::Warning)).await.unwrap();

        for level in [Level::Info, Level::Warning, Level::Error] {
            assert!(handle.submit(LogRecord::new(level, level.name())));
        }
        handle.close().await;

        assert_eq!(out.lines(), vec!["WARNING", "ERROR"]);
        assert_eq!(out.closes(), 1);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_drain_delivers_everything_in_order() {
        let (dispatcher, handle) = Dispatcher::new(&DispatcherConfig::default());
        let task = dispatcher.spawn();
        let a = Recorder::default();
        let b = Recorder::default();
        handle.add_entry(entry(&a, Level::None)).await.unwrap();
        handle.add_entry(entry(&b, Level::Error)).await.unwrap();

        // The actor cannot run between these submits and the close request
        for i in 0..200 {
            assert!(handle.submit(LogRecord::new(Level::Info, format!("m{i}"))));
        }
        handle.close().await;

        let expected: Vec<String> = (0..200).map(|i| format!("m{i}")).collect();
        assert_eq!(a.lines(), expected);
        assert!(b.lines().is_empty());
        assert_eq!(a.closes(), 1);
        assert_eq!(b.closes(), 1);
        assert_eq!(handle.metrics().dispatched, 200);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_post_close_rejection_and_idempotent_close() {
        let (dispatcher, handle) = Dispatcher::new(&DispatcherConfig::default());
        let task = dispatcher.spawn();
        let out = Recorder::default();
        handle.add_entry(entry(&out, Level::None)).await.unwrap();

        handle.submit(LogRecord::new(Level::Info, "before"));
        handle.close().await;

        assert!(handle.is_closed());
        assert!(!handle.submit(LogRecord::new(Level::Info, "after")));
        handle.close().await;
        handle.close_blocking();

        assert_eq!(out.lines(), vec!["before"]);
        assert_eq!(out.closes(), 1);
        assert!(matches!(
            handle.add_entry(entry(&out, Level::None)).await,
            Err(DispatchError::Closed)
        ));
        assert_eq!(handle.metrics().dropped, 1);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_close_failure_does_not_stop_other_closes() {
        let (dispatcher, handle) = Dispatcher::new(&DispatcherConfig::default());
        let task = dispatcher.spawn();
        let broken = Recorder::failing();
        let healthy = Recorder::default();
        handle.add_entry(entry(&broken, Level::None)).await.unwrap();
        handle.add_entry(entry(&healthy, Level::None)).await.unwrap();

        handle.close().await;
        assert_eq!(broken.closes(), 1);
        assert_eq!(healthy.closes(), 1);
        assert_eq!(handle.metrics().close_failures, 1);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_replace_closes_previous_destination() {
        let (dispatcher, handle) = Dispatcher::new(&DispatcherConfig::default());
        let task = dispatcher.spawn();
        let old = Recorder::failing();
        let new = Recorder::default();

        let index = handle.add_entry(entry(&old, Level::None)).await.unwrap();
        handle.submit(LogRecord::new(Level::Info, "to old"));
        handle.replace_entry(index, entry(&new, Level::None)).await.unwrap();
        handle.submit(LogRecord::new(Level::Info, "to new"));

        let err = handle
            .replace_entry(5, entry(&Recorder::default(), Level::None))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::UnknownEntry { index: 5, len: 1 }));

        handle.close().await;
        assert_eq!(old.lines(), vec!["to old"]);
        assert_eq!(old.closes(), 1);
        assert_eq!(new.lines(), vec!["to new"]);
        assert_eq!(new.closes(), 1);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_set_level_and_formatter() {
        let (dispatcher, handle) = Dispatcher::new(&DispatcherConfig::default());
        let task = dispatcher.spawn();
        let out = Recorder::default();
        let index = handle.add_entry(entry(&out, Level::Error)).await.unwrap();

        handle.submit(LogRecord::new(Level::Info, "hidden"));
        handle.set_level(index, Level::Info).await.unwrap();
        handle.submit(LogRecord::new(Level::Info, "shown"));
        handle
            .set_formatter(index, Arc::new(|r: &LogRecord| format!("<{}>", r.message)))
            .await
            .unwrap();
        handle.submit(LogRecord::new(Level::Info, "wrapped"));

        assert!(matches!(
            handle.set_level(3, Level::Info).await,
            Err(DispatchError::UnknownEntry { index: 3, len: 1 })
        ));

        handle.close().await;
        assert_eq!(out.lines(), vec!["shown", "<wrapped>"]);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_queue_full_drops() {
        let config = DispatcherConfig::default().with_queue_capacity(2);
        let (dispatcher, handle) = Dispatcher::new(&config);

        let accepted = (0..5)
            .filter(|i| handle.submit(LogRecord::new(Level::Info, format!("{i}"))))
            .count();
        assert_eq!(accepted, 2);
        assert_eq!(handle.metrics().dropped, 3);

        let task = dispatcher.spawn();
        handle.close().await;
        assert_eq!(handle.metrics().dispatched, 2);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_dropping_handles_shuts_down() {
        let (dispatcher, handle) = Dispatcher::new(&DispatcherConfig::default());
        let task = dispatcher.spawn();
        let out = Recorder::default();
        handle.add_entry(entry(&out, Level::None)).await.unwrap();
        handle.submit(LogRecord::new(Level::Info, "last words"));

        drop(handle);
        task.await.unwrap();
        assert_eq!(out.lines(), vec!["last words"]);
        assert_eq!(out.closes(), 1);
    }

    #[test]
    fn test_thread_dispatcher_blocking_api() {
        let handle = create_dispatcher(&DispatcherConfig::default());
        let out = Recorder::default();
        assert_eq!(handle.add_entry_blocking(entry(&out, Level::None)).unwrap(), 0);
        handle.submit(LogRecord::new(Level::Info, "threaded"));
        handle.set_level_blocking(0, Level::Critical).unwrap();
        handle.submit(LogRecord::new(Level::Error, "filtered"));
        handle.close_blocking();
        handle.close_blocking();

        assert_eq!(out.lines(), vec!["threaded"]);
        assert_eq!(out.closes(), 1);
    }

    #[test]
    fn test_create_entry_from_filter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let filter = FilterConfig {
            tag: "file".to_string(),
            enabled: true,
            destination_type: DestinationType::File,
            level: "WARNING".to_string(),
            format: None,
            granulars: vec![GranularConfig {
                level: "DEBUG".to_string(),
                path: "app::db".to_string(),
            }],
            properties: HashMap::from([
                ("filename".to_string(), path.display().to_string()),
                ("format".to_string(), "[%L] %M".to_string()),
            ]),
        };

        let mut entry = create_entry(&filter).unwrap();
        assert_eq!(entry.name(), "file");
        assert_eq!(entry.level, Level::Warning);
        assert_eq!(entry.granulars.get("app::db"), Some(&Level::Debug));

        let record = LogRecord::new(Level::Error, "boom");
        let text = entry.formatter.format(&record);
        entry.destination.write(&text);
        entry.destination.close().unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "[EROR] boom\n");
    }

    #[test]
    fn test_create_entry_reports_missing_properties() {
        let filter = FilterConfig {
            tag: String::new(),
            enabled: true,
            destination_type: DestinationType::Socket,
            level: "INFO".to_string(),
            format: None,
            granulars: Vec::new(),
            properties: HashMap::new(),
        };
        assert!(matches!(
            create_entry(&filter),
            Err(DispatchError::DestinationCreation { .. })
        ));
    }
}
