use std::time::Duration;

use scwire_frame::FrameConfig;

/// Default pause between consecutive transmissions.
pub const DEFAULT_TASK_DELAY: Duration = Duration::from_millis(10);
/// Default bound on waiting for a single result.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Default period of the event drain loop.
pub const DEFAULT_EVENT_PERIOD: Duration = Duration::from_secs(5);

/// What the pipeline does after a request times out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeoutPolicy {
    /// Fail every queued request and stop the pipeline.
    #[default]
    Abort,
    /// Move on to the next queued request. A late result for the timed-out
    /// request would be attributed to its successor, so use only against
    /// servers known to drop unanswerable commands.
    Continue,
}

/// Command pipeline behavior.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Minimum gap between the end of one cycle and the next transmission.
    pub task_delay: Duration,
    /// Bound on waiting for a result. `None` waits forever.
    pub request_timeout: Option<Duration>,
    pub timeout_policy: TimeoutPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            task_delay: DEFAULT_TASK_DELAY,
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
            timeout_policy: TimeoutPolicy::default(),
        }
    }
}

/// Everything needed to bring up an [`crate::ScClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Payload limits and write timeout. The read timeout is taken from
    /// `pipeline.request_timeout`.
    pub frame: FrameConfig,
    pub pipeline: PipelineConfig,
    /// Event drain period. `None` disables the background drain loop.
    pub event_period: Option<Duration>,
    pub connect_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            frame: FrameConfig::default(),
            pipeline: PipelineConfig::default(),
            event_period: Some(DEFAULT_EVENT_PERIOD),
            connect_timeout: Some(Duration::from_secs(5)),
        }
    }
}
