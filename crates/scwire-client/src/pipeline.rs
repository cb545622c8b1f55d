//! Strict one-in-flight command pipeline.
//!
//! A single worker thread owns the connection. Requests are queued FIFO on
//! a channel; the worker transmits the head, blocks for exactly one result
//! frame, settles the request's handle and only then moves to the next.
//!
//! Results are correlated to requests purely by arrival order. The header's
//! request id is always sent as 0 and ignored on receipt, which is correct
//! only while the worker keeps a single request in flight.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use scwire_frame::{CommandFrame, FrameError, ResultCode, ResultFrame};
use tracing::{debug, trace, warn};

use crate::config::{PipelineConfig, TimeoutPolicy};
use crate::connection::Connection;
use crate::error::{ClientError, Result};
use crate::handle::ResultHandle;

type Settle = Box<dyn FnOnce(Result<ResultFrame>) + Send>;
type Teardown = Box<dyn FnOnce() + Send>;

struct PendingRequest {
    frame: CommandFrame,
    settle: Settle,
}

enum Job {
    Request(PendingRequest),
    Shutdown,
}

#[derive(Default)]
struct PipelineState {
    busy: AtomicBool,
    queued: AtomicUsize,
    closing: AtomicBool,
}

/// Cloneable entry point for queueing requests onto a [`Pipeline`].
#[derive(Clone)]
pub struct Submitter {
    tx: mpsc::Sender<Job>,
    state: Arc<PipelineState>,
}

impl Submitter {
    /// Queue a frame; `parser` turns a successful result into the handle's value.
    ///
    /// The parser runs on the pipeline thread before the next request is sent.
    pub fn submit<T, F>(&self, frame: CommandFrame, parser: F) -> ResultHandle<T>
    where
        T: Send + 'static,
        F: FnOnce(&ResultFrame) -> Result<T> + Send + 'static,
    {
        let (tx, handle) = ResultHandle::channel();
        let settle: Settle = Box::new(move |outcome| {
            let _ = tx.send(outcome.and_then(|result| parser(&result)));
        });
        self.enqueue(PendingRequest { frame, settle });
        handle
    }

    /// Queue a frame; the handle yields the raw result frame.
    pub fn submit_raw(&self, frame: CommandFrame) -> ResultHandle<ResultFrame> {
        self.submit(frame, |result| Ok(result.clone()))
    }

    /// True once the pipeline refuses new work.
    pub fn is_closed(&self) -> bool {
        self.state.closing.load(Ordering::SeqCst)
    }

    fn enqueue(&self, request: PendingRequest) {
        if self.is_closed() {
            (request.settle)(Err(shut_down()));
            return;
        }

        self.state.queued.fetch_add(1, Ordering::SeqCst);
        if let Err(mpsc::SendError(Job::Request(request))) = self.tx.send(Job::Request(request)) {
            self.state.queued.fetch_sub(1, Ordering::SeqCst);
            (request.settle)(Err(shut_down()));
        }
    }
}

/// Owner of the pipeline worker thread.
pub struct Pipeline {
    submitter: Submitter,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Pipeline {
    /// Start the worker thread over `conn`.
    pub fn spawn<C>(conn: C, config: PipelineConfig) -> Result<Self>
    where
        C: Connection + 'static,
    {
        Self::spawn_inner(conn, config, None)
    }

    /// Like [`Pipeline::spawn`], running `teardown` on the worker once the
    /// pipeline stops, whether closed locally or aborted by a link failure.
    /// The queue has been failed by the time it runs.
    pub fn spawn_with_teardown<C, F>(conn: C, config: PipelineConfig, teardown: F) -> Result<Self>
    where
        C: Connection + 'static,
        F: FnOnce() + Send + 'static,
    {
        Self::spawn_inner(conn, config, Some(Box::new(teardown)))
    }

    fn spawn_inner<C>(mut conn: C, config: PipelineConfig, teardown: Option<Teardown>) -> Result<Self>
    where
        C: Connection + 'static,
    {
        conn.set_recv_timeout(config.request_timeout)?;

        let (tx, rx) = mpsc::channel();
        let state = Arc::new(PipelineState::default());
        let worker_state = Arc::clone(&state);
        let worker = thread::Builder::new()
            .name("scwire-pipeline".into())
            .spawn(move || {
                run(conn, rx, worker_state, config);
                if let Some(teardown) = teardown {
                    teardown();
                }
            })
            .map_err(scwire_transport::TransportError::Io)?;

        Ok(Self {
            submitter: Submitter { tx, state },
            worker: Mutex::new(Some(worker)),
        })
    }

    pub fn submitter(&self) -> Submitter {
        self.submitter.clone()
    }

    pub fn submit<T, F>(&self, frame: CommandFrame, parser: F) -> ResultHandle<T>
    where
        T: Send + 'static,
        F: FnOnce(&ResultFrame) -> Result<T> + Send + 'static,
    {
        self.submitter.submit(frame, parser)
    }

    pub fn submit_raw(&self, frame: CommandFrame) -> ResultHandle<ResultFrame> {
        self.submitter.submit_raw(frame)
    }

    /// True while a request is on the wire awaiting its result.
    pub fn is_busy(&self) -> bool {
        self.submitter.state.busy.load(Ordering::SeqCst)
    }

    /// Requests queued behind the in-flight one.
    pub fn pending(&self) -> usize {
        self.submitter.state.queued.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.submitter.is_closed()
    }

    /// Stop accepting work. Queued requests fail with `Disconnected`; the
    /// in-flight request, if any, still completes.
    pub fn close(&self) {
        if !self.submitter.state.closing.swap(true, Ordering::SeqCst) {
            let _ = self.submitter.tx.send(Job::Shutdown);
        }
    }

    /// Wait for the worker thread to exit. No-op when called from the
    /// worker itself (e.g. from an event callback).
    pub fn join(&self) {
        if self.on_worker_thread() {
            return;
        }
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = worker {
            if handle.join().is_err() {
                warn!("pipeline worker panicked");
            }
        }
    }

    /// True when called from the worker, i.e. from a result parser or an
    /// event callback.
    pub fn on_worker_thread(&self) -> bool {
        self.worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| handle.thread().id() == thread::current().id())
    }

    /// [`Pipeline::close`] then [`Pipeline::join`].
    pub fn shutdown(&self) {
        self.close();
        self.join();
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.close();
    }
}

fn run<C: Connection>(
    mut conn: C,
    rx: mpsc::Receiver<Job>,
    state: Arc<PipelineState>,
    config: PipelineConfig,
) {
    let mut last_cycle: Option<Instant> = None;

    while let Ok(job) = rx.recv() {
        let request = match job {
            Job::Request(request) => request,
            Job::Shutdown => break,
        };
        state.queued.fetch_sub(1, Ordering::SeqCst);

        if state.closing.load(Ordering::SeqCst) {
            (request.settle)(Err(shut_down()));
            continue;
        }

        if let Some(last) = last_cycle {
            let since = last.elapsed();
            if since < config.task_delay {
                thread::sleep(config.task_delay - since);
            }
        }

        state.busy.store(true, Ordering::SeqCst);
        let outcome = execute(&mut conn, &request.frame, &config, &state);

        let abort_reason = match &outcome {
            Err(err) if is_fatal(err, config.timeout_policy) => Some(err.to_string()),
            _ => None,
        };
        if abort_reason.is_some() {
            state.closing.store(true, Ordering::SeqCst);
        }
        (request.settle)(outcome);
        state.busy.store(false, Ordering::SeqCst);
        last_cycle = Some(Instant::now());

        if let Some(reason) = abort_reason {
            warn!(%reason, "command pipeline aborted");
            fail_remaining(&rx, &state, &format!("pipeline aborted: {reason}"));
            conn.close();
            return;
        }
    }

    fail_remaining(&rx, &state, "client shut down");
    conn.close();
    debug!("command pipeline stopped");
}

fn execute<C: Connection>(
    conn: &mut C,
    frame: &CommandFrame,
    config: &PipelineConfig,
    state: &PipelineState,
) -> Result<ResultFrame> {
    let command = frame.code();
    trace!(%command, len = frame.wire_size(), "sending command");
    // An oversized command is refused before any byte is written, so the
    // link stays usable and only this request fails.
    conn.send(frame.as_bytes()).map_err(|err| match err {
        FrameError::PayloadTooLarge { .. } => ClientError::Frame(err),
        err => link_failure(err, config, state),
    })?;

    let received = conn
        .recv()
        .map_err(|err| link_failure(err, config, state))?;
    let result = ResultFrame::new(received).map_err(ClientError::Framing)?;
    result.validate().map_err(ClientError::Framing)?;

    if result.command_code() != command {
        debug!(
            sent = %command,
            received = %result.command_code(),
            "result command code differs from request"
        );
    }

    match result.result_code() {
        ResultCode::Ok => {
            trace!(%command, len = result.result_length(), "command succeeded");
            Ok(result)
        }
        code => Err(ClientError::Protocol { command, code }),
    }
}

fn link_failure(err: FrameError, config: &PipelineConfig, state: &PipelineState) -> ClientError {
    if err.is_timeout() {
        let after = config.request_timeout.unwrap_or(Duration::ZERO);
        warn!(?after, "request timed out");
        return ClientError::Timeout(after);
    }
    if state.closing.load(Ordering::SeqCst) {
        return shut_down();
    }
    match err {
        FrameError::ConnectionClosed => {
            ClientError::Disconnected("connection closed by server".to_string())
        }
        FrameError::Io(io) => ClientError::Transport(io.into()),
        other => ClientError::Framing(other),
    }
}

fn is_fatal(err: &ClientError, policy: TimeoutPolicy) -> bool {
    match err {
        ClientError::Protocol { .. } | ClientError::Frame(_) | ClientError::Unsupported(_) => false,
        ClientError::Timeout(_) => policy == TimeoutPolicy::Abort,
        ClientError::Transport(_) | ClientError::Framing(_) | ClientError::Disconnected(_) => true,
    }
}

fn fail_remaining(rx: &mpsc::Receiver<Job>, state: &PipelineState, reason: &str) {
    for job in rx.try_iter() {
        if let Job::Request(request) = job {
            state.queued.fetch_sub(1, Ordering::SeqCst);
            (request.settle)(Err(ClientError::Disconnected(reason.to_string())));
        }
    }
}

fn shut_down() -> ClientError {
    ClientError::Disconnected("client shut down".to_string())
}
