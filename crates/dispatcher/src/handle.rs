//! DispatchHandle - the caller side of a running dispatcher

use std::sync::{Arc, Mutex, PoisonError};

use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument, trace};

use contracts::{Formatter, Level, LogRecord};

use crate::dispatcher::{Control, ControlMessage};
use crate::entry::RegistryEntry;
use crate::error::DispatchError;
use crate::metrics::{DispatchMetrics, MetricsSnapshot};

/// Cloneable handle to a running dispatcher.
///
/// Record submission never blocks. Control operations wait for the
/// dispatcher's acknowledgement and come in two flavours: `async` methods and
/// `_blocking` methods usable from plain threads or from inside a runtime.
///
/// The `_blocking` methods must not be used on the same current-thread
/// runtime that drives a task spawned with [`crate::Dispatcher::spawn`]; use
/// the async variants there, or run the dispatcher on its own thread.
///
/// Each control message carries the number of records admitted before it,
/// and the dispatcher applies it only after delivering that many records.
#[derive(Clone)]
pub struct DispatchHandle {
    records: mpsc::Sender<LogRecord>,
    control: mpsc::UnboundedSender<Control>,
    metrics: Arc<DispatchMetrics>,
    /// Records admitted so far; held across `try_send` so the count matches
    /// queue order
    admitted: Arc<Mutex<u64>>,
}

impl DispatchHandle {
    pub(crate) fn new(
        records: mpsc::Sender<LogRecord>,
        control: mpsc::UnboundedSender<Control>,
        metrics: Arc<DispatchMetrics>,
    ) -> Self {
        Self {
            records,
            control,
            metrics,
            admitted: Arc::new(Mutex::new(0)),
        }
    }

    /// Whether the rejection gate is shut (close started, or the dispatcher is gone)
    pub fn is_closed(&self) -> bool {
        self.records.is_closed()
    }

    /// Enqueue a record without waiting.
    ///
    /// Returns false if the record was dropped because the queue is full or
    /// the dispatcher is closing.
    pub fn submit(&self, record: LogRecord) -> bool {
        let mut admitted = self.admitted.lock().unwrap_or_else(PoisonError::into_inner);
        match self.records.try_send(record) {
            Ok(()) => {
                *admitted += 1;
                self.metrics.inc_submitted();
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.metrics.inc_dropped();
                trace!("Record queue full, record dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.metrics.inc_dropped();
                false
            }
        }
    }

    /// Get current metrics
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Append an entry; resolves to its index
    pub async fn add_entry(&self, entry: RegistryEntry) -> Result<usize, DispatchError> {
        let rx = self.request(|reply| ControlMessage::Add { entry, reply })?;
        rx.await.map_err(|_| DispatchError::Closed)
    }

    /// Overwrite the entry at `index`, closing the destination it held
    pub async fn replace_entry(
        &self,
        index: usize,
        entry: RegistryEntry,
    ) -> Result<(), DispatchError> {
        let rx = self.request(|reply| ControlMessage::Replace {
            index,
            entry,
            reply,
        })?;
        rx.await.map_err(|_| DispatchError::Closed)?
    }

    /// Change the default threshold of the entry at `index`
    pub async fn set_level(&self, index: usize, level: Level) -> Result<(), DispatchError> {
        let rx = self.request(|reply| ControlMessage::SetLevel {
            index,
            level,
            reply,
        })?;
        rx.await.map_err(|_| DispatchError::Closed)?
    }

    /// Swap the formatter of the entry at `index`
    pub async fn set_formatter(
        &self,
        index: usize,
        formatter: Arc<dyn Formatter>,
    ) -> Result<(), DispatchError> {
        let rx = self.request(|reply| ControlMessage::SetFormatter {
            index,
            formatter,
            reply,
        })?;
        rx.await.map_err(|_| DispatchError::Closed)?
    }

    /// Drain queued records, close every destination, then return.
    ///
    /// Idempotent: once the dispatcher has shut down this returns at once.
    #[instrument(name = "dispatch_handle_close", skip(self))]
    pub async fn close(&self) {
        let Ok(rx) = self.request(|reply| ControlMessage::Close { reply }) else {
            return;
        };
        // A dropped reply means another close finished the job
        let _ = rx.await;
        debug!("Dispatcher closed");
    }

    /// Blocking form of [`DispatchHandle::add_entry`]
    pub fn add_entry_blocking(&self, entry: RegistryEntry) -> Result<usize, DispatchError> {
        let rx = self.request(|reply| ControlMessage::Add { entry, reply })?;
        wait_blocking(rx).ok_or(DispatchError::Closed)
    }

    /// Blocking form of [`DispatchHandle::replace_entry`]
    pub fn replace_entry_blocking(
        &self,
        index: usize,
        entry: RegistryEntry,
    ) -> Result<(), DispatchError> {
        let rx = self.request(|reply| ControlMessage::Replace {
            index,
            entry,
            reply,
        })?;
        wait_blocking(rx).ok_or(DispatchError::Closed)?
    }

    /// Blocking form of [`DispatchHandle::set_level`]
    pub fn set_level_blocking(&self, index: usize, level: Level) -> Result<(), DispatchError> {
        let rx = self.request(|reply| ControlMessage::SetLevel {
            index,
            level,
            reply,
        })?;
        wait_blocking(rx).ok_or(DispatchError::Closed)?
    }

    /// Blocking form of [`DispatchHandle::set_formatter`]
    pub fn set_formatter_blocking(
        &self,
        index: usize,
        formatter: Arc<dyn Formatter>,
    ) -> Result<(), DispatchError> {
        let rx = self.request(|reply| ControlMessage::SetFormatter {
            index,
            formatter,
            reply,
        })?;
        wait_blocking(rx).ok_or(DispatchError::Closed)?
    }

    /// Blocking form of [`DispatchHandle::close`]
    pub fn close_blocking(&self) {
        let Ok(rx) = self.request(|reply| ControlMessage::Close { reply }) else {
            return;
        };
        let _ = wait_blocking(rx);
        debug!("Dispatcher closed");
    }

    fn request<T>(
        &self,
        message: impl FnOnce(oneshot::Sender<T>) -> ControlMessage,
    ) -> Result<oneshot::Receiver<T>, DispatchError> {
        let (reply, rx) = oneshot::channel();
        let after = *self.admitted.lock().unwrap_or_else(PoisonError::into_inner);
        self.control
            .send(Control {
                after,
                message: message(reply),
            })
            .map_err(|_| DispatchError::Closed)?;
        Ok(rx)
    }
}

/// Wait for an acknowledgement from synchronous code.
///
/// `blocking_recv` panics on a runtime thread, so inside a multi-thread
/// runtime the wait goes through `block_in_place`, and inside a
/// current-thread runtime it moves to a scoped helper thread.
fn wait_blocking<T: Send>(rx: oneshot::Receiver<T>) -> Option<T> {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(|| rx.blocking_recv().ok())
        }
        Ok(_) => std::thread::scope(|scope| {
            scope
                .spawn(|| rx.blocking_recv().ok())
                .join()
                .ok()
                .flatten()
        }),
        Err(_) => rx.blocking_recv().ok(),
    }
}
