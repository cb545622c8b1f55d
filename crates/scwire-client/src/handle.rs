use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::sync::oneshot;

use crate::error::{ClientError, Result};

/// Eventual outcome of one submitted request.
///
/// Wait on it from a plain thread with [`ResultHandle::wait`], or `.await`
/// it from async code. Dropping the handle does not cancel the request.
#[derive(Debug)]
pub struct ResultHandle<T> {
    rx: oneshot::Receiver<Result<T>>,
}

/// Producer side of a [`ResultHandle`].
pub(crate) type Settler<T> = oneshot::Sender<Result<T>>;

impl<T> ResultHandle<T> {
    pub(crate) fn channel() -> (Settler<T>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }

    /// A handle that is already settled.
    pub fn ready(outcome: Result<T>) -> Self {
        let (tx, handle) = Self::channel();
        let _ = tx.send(outcome);
        handle
    }

    /// Block the current thread until the request settles.
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context; use
    /// `.await` there instead.
    pub fn wait(self) -> Result<T> {
        self.rx.blocking_recv().unwrap_or_else(|_| Err(abandoned()))
    }

    /// Block for at most `timeout`. On expiry the request stays queued but
    /// its outcome is discarded.
    ///
    /// # Panics
    ///
    /// Same restriction as [`ResultHandle::wait`].
    pub fn wait_timeout(self, timeout: Duration) -> Result<T> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(scwire_transport::TransportError::Io)?;
        runtime.block_on(async {
            match tokio::time::timeout(timeout, self).await {
                Ok(outcome) => outcome,
                Err(_) => Err(ClientError::Timeout(timeout)),
            }
        })
    }

    /// Take the outcome if the request has already settled.
    pub fn try_take(&mut self) -> Option<Result<T>> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(abandoned())),
        }
    }
}

impl<T> Future for ResultHandle<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|outcome| outcome.unwrap_or_else(|_| Err(abandoned())))
    }
}

fn abandoned() -> ClientError {
    ClientError::Disconnected("request dropped before it was settled".to_string())
}
