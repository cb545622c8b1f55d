//! Event subscriptions and the periodic drain loop.
//!
//! The server queues element events per subscription. A drain cycle sends
//! one event-emit command through the pipeline and dispatches every
//! returned record to the callback registered for its subscription id.
//! Records for unknown subscriptions are dropped silently.

use std::collections::HashMap;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use scwire_frame::{ElementAddress, FrameError, ResultFrame};
use tracing::{debug, info, trace, warn};

use crate::commands;
use crate::error::{ClientError, Result};
use crate::handle::ResultHandle;
use crate::pipeline::Submitter;

/// Size of one record in a drain result, after the leading count.
pub const EVENT_RECORD_SIZE: usize = 16;

/// Subscription callback: `(element address, argument)`.
pub type EventCallback = Arc<dyn Fn(ElementAddress, u32) + Send + Sync>;

/// One queued event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventRecord {
    pub subscription_id: u32,
    pub address: ElementAddress,
    pub argument: u32,
}

/// Decode a drain result: `u32 count`, then `count` records of
/// `{subscription id, address, argument, reserved}`.
pub fn parse_event_batch(frame: &ResultFrame) -> Result<Vec<EventRecord>> {
    let count = frame.payload_u32(0)? as usize;
    let needed = count
        .checked_mul(EVENT_RECORD_SIZE)
        .and_then(|n| n.checked_add(4));
    let available = frame.payload().len();
    if needed.is_none_or(|needed| needed > available) {
        return Err(FrameError::PayloadOutOfBounds {
            offset: 4,
            width: count.saturating_mul(EVENT_RECORD_SIZE),
            len: available,
        }
        .into());
    }

    (0..count)
        .map(|i| {
            let base = 4 + i * EVENT_RECORD_SIZE;
            Ok(EventRecord {
                subscription_id: frame.payload_u32(base)?,
                address: frame.payload_addr(base + 4)?,
                argument: frame.payload_u32(base + 8)?,
            })
        })
        .collect()
}

/// Subscription id → callback map, shared between the client and the drain loop.
#[derive(Clone, Default)]
pub struct EventRegistry {
    inner: Arc<Mutex<HashMap<u32, EventCallback>>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `callback` for `id`, replacing any previous one.
    pub fn register<F>(&self, id: u32, callback: F)
    where
        F: Fn(ElementAddress, u32) + Send + Sync + 'static,
    {
        self.lock().insert(id, Arc::new(callback));
    }

    /// Remove the callback for `id`. Returns whether one was registered.
    pub fn unregister(&self, id: u32) -> bool {
        self.lock().remove(&id).is_some()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.lock().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Invoke callbacks for `records` in order. Returns how many fired.
    ///
    /// The registry lock is not held while a callback runs, so callbacks may
    /// register or unregister subscriptions.
    pub fn dispatch(&self, records: &[EventRecord]) -> usize {
        let mut fired = 0;
        for record in records {
            let callback = self.lock().get(&record.subscription_id).cloned();
            match callback {
                Some(callback) => {
                    callback(record.address, record.argument);
                    fired += 1;
                }
                None => trace!(id = record.subscription_id, "no subscriber for event"),
            }
        }
        fired
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<u32, EventCallback>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRegistry")
            .field("subscriptions", &self.len())
            .finish()
    }
}

/// Run one drain cycle. The handle yields the number of callbacks invoked.
pub fn drain_events(submitter: &Submitter, registry: &EventRegistry) -> ResultHandle<usize> {
    let registry = registry.clone();
    submitter.submit(commands::event_emit(), move |result| {
        let records = parse_event_batch(result)?;
        Ok(registry.dispatch(&records))
    })
}

/// Background thread draining events on a fixed period.
///
/// Each cycle waits for the previous drain to settle before sleeping, so at
/// most one drain is ever queued. Failed drains are logged and retried on
/// the next tick.
pub struct EventPump {
    stop: Option<mpsc::Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl EventPump {
    pub fn start(submitter: Submitter, registry: EventRegistry, period: Duration) -> Result<Self> {
        let (stop, stop_rx) = mpsc::channel::<()>();
        let worker = thread::Builder::new()
            .name("scwire-events".into())
            .spawn(move || pump(submitter, registry, period, stop_rx))
            .map_err(scwire_transport::TransportError::Io)?;
        debug!(?period, "event pump started");

        Ok(Self {
            stop: Some(stop),
            worker: Some(worker),
        })
    }

    /// Ask the loop to exit after the current cycle without waiting for it.
    pub fn signal_stop(&mut self) {
        self.stop.take();
    }

    /// Ask the loop to exit and let the thread finish on its own.
    pub fn detach(mut self) {
        self.stop.take();
        self.worker.take();
    }

    /// Stop the loop and wait for the thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.signal_stop();
        if let Some(worker) = self.worker.take() {
            if worker.thread().id() == thread::current().id() {
                return;
            }
            if worker.join().is_err() {
                warn!("event pump panicked");
            }
        }
    }
}

impl Drop for EventPump {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn pump(
    submitter: Submitter,
    registry: EventRegistry,
    period: Duration,
    stop: mpsc::Receiver<()>,
) {
    loop {
        match drain_events(&submitter, &registry).wait() {
            Ok(fired) => trace!(fired, "event drain complete"),
            Err(ClientError::Disconnected(reason)) if submitter.is_closed() => {
                info!(%reason, "event pump stopping");
                return;
            }
            Err(err) => warn!(%err, "event drain failed"),
        }

        match stop.recv_timeout(period) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    debug!("event pump stopped");
}
