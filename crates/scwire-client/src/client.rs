use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use scwire_frame::{CommandFrame, ElementAddress, ResultFrame};
use scwire_transport::ScStream;
use tracing::{debug, info};

use crate::commands::{self, FindResult};
use crate::config::ClientConfig;
use crate::connection::Connection;
use crate::error::Result;
use crate::events::{self, EventPump, EventRegistry};
use crate::handle::ResultHandle;
use crate::pipeline::Pipeline;
use crate::store::GraphStore;

/// One client, one connection.
///
/// Owns the command pipeline, the subscription registry and the event drain
/// loop. Independent clients share nothing and can run side by side.
pub struct ScClient {
    pipeline: Pipeline,
    events: EventRegistry,
    pump: Mutex<Option<EventPump>>,
    closer: Option<ScStream>,
}

impl ScClient {
    /// Connect to `endpoint`. See [`crate::connect_with_config`].
    pub fn connect(endpoint: &str, config: &ClientConfig) -> Result<Self> {
        crate::connector::connect_with_config(endpoint, config)
    }

    /// Build a client over an established connection and start the drain
    /// loop if `config.event_period` is set.
    pub fn from_connection<C>(conn: C, config: &ClientConfig) -> Result<Self>
    where
        C: Connection + 'static,
    {
        // A dropped link tears the subscriptions down with the queue.
        let events = EventRegistry::new();
        let registry = events.clone();
        let pipeline =
            Pipeline::spawn_with_teardown(conn, config.pipeline.clone(), move || registry.clear())?;
        let client = Self {
            pipeline,
            events,
            pump: Mutex::new(None),
            closer: None,
        };
        if let Some(period) = config.event_period {
            client.start_event_pump(period)?;
        }
        Ok(client)
    }

    /// Stream handle shut down on teardown to unblock an in-flight read.
    pub(crate) fn with_closer(mut self, stream: ScStream) -> Self {
        self.closer = Some(stream);
        self
    }

    /// Queue an arbitrary command. `parser` runs on the pipeline thread
    /// against an OK result.
    pub fn submit<T, F>(&self, frame: CommandFrame, parser: F) -> ResultHandle<T>
    where
        T: Send + 'static,
        F: FnOnce(&ResultFrame) -> Result<T> + Send + 'static,
    {
        self.pipeline.submit(frame, parser)
    }

    pub fn submit_raw(&self, frame: CommandFrame) -> ResultHandle<ResultFrame> {
        self.pipeline.submit_raw(frame)
    }

    /// Resolve a system identifier to an element address.
    ///
    /// A missing element settles as a protocol failure with
    /// `ResultCode::NoElement`.
    pub fn find_element_by_system_identifier(&self, idtf: &str) -> Result<ResultHandle<FindResult>> {
        let frame = commands::find_element_by_system_identifier(idtf)?;
        Ok(self.submit(frame, commands::parse_find_result))
    }

    /// Run one drain cycle now, independent of the background loop.
    pub fn drain_events(&self) -> ResultHandle<usize> {
        events::drain_events(&self.pipeline.submitter(), &self.events)
    }

    pub fn register_event<F>(&self, id: u32, callback: F)
    where
        F: Fn(ElementAddress, u32) + Send + Sync + 'static,
    {
        self.events.register(id, callback);
    }

    pub fn unregister_event(&self, id: u32) -> bool {
        self.events.unregister(id)
    }

    pub fn events(&self) -> &EventRegistry {
        &self.events
    }

    /// (Re)start the background drain loop with `period`.
    pub fn start_event_pump(&self, period: Duration) -> Result<()> {
        let pump = EventPump::start(self.pipeline.submitter(), self.events.clone(), period)?;
        let previous = self.lock_pump().replace(pump);
        if let Some(previous) = previous {
            self.retire_pump(previous);
        }
        Ok(())
    }

    pub fn stop_event_pump(&self) {
        let pump = self.lock_pump().take();
        if let Some(pump) = pump {
            self.retire_pump(pump);
        }
    }

    // From inside a callback the drain loop is waiting on this very thread,
    // so it is left to exit by itself.
    fn retire_pump(&self, pump: EventPump) {
        if self.pipeline.on_worker_thread() {
            pump.detach();
        } else {
            pump.stop();
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pipeline.is_busy()
    }

    pub fn pending_requests(&self) -> usize {
        self.pipeline.pending()
    }

    pub fn is_closed(&self) -> bool {
        self.pipeline.is_closed()
    }

    /// Tear the client down: stop the drain loop, fail queued requests with
    /// `Disconnected`, close the connection and clear all subscriptions.
    /// Idempotent.
    pub fn shutdown(&self) {
        let mut pump = self.lock_pump().take();
        if let Some(pump) = pump.as_mut() {
            pump.signal_stop();
        }

        let was_open = !self.pipeline.is_closed();
        self.pipeline.close();
        if let Some(stream) = &self.closer {
            if let Err(err) = stream.shutdown() {
                debug!(%err, "stream shutdown failed");
            }
        }
        self.pipeline.join();
        if let Some(pump) = pump {
            self.retire_pump(pump);
        }
        self.events.clear();

        if was_open {
            info!("client shut down");
        }
    }

    fn lock_pump(&self) -> std::sync::MutexGuard<'_, Option<EventPump>> {
        self.pump.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ScClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl GraphStore for ScClient {
    fn find_element_by_system_identifier(&self, idtf: &str) -> Result<ResultHandle<FindResult>> {
        ScClient::find_element_by_system_identifier(self, idtf)
    }

    fn event_emit(&self) -> Result<ResultHandle<usize>> {
        Ok(self.drain_events())
    }
}
