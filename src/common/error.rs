//! Common error types for the subscriber client

/// Result type alias for subscriber operations
pub type SubscriberResult<T> = std::result::Result<T, SubscriberError>;

/// Error taxonomy for the subscriber client
///
/// Only `InvalidConfig` (and the `AlreadyRunning` misuse guard) ever
/// surfaces from the run loop; everything else is retried or isolated
/// internally and flows to the configured [`FailureReporter`](crate::report::FailureReporter).
#[derive(Debug, thiserror::Error)]
pub enum SubscriberError {
    /// Invalid configuration (fatal, prevents the loop from starting)
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The run loop is already active on this client
    #[error("client is already running")]
    AlreadyRunning,

    /// Transport operation attempted without an open connection
    #[error("transport is not connected")]
    NotConnected,

    /// Failed to connect to an endpoint (recoverable, triggers backoff)
    #[error("connect failed: {0}")]
    ConnectFailed(String),

    /// Failed to register a topic filter (recoverable, triggers backoff)
    #[error("subscribe failed: {0}")]
    SubscribeFailed(String),

    /// Failed to receive a message (recoverable, triggers reconnect)
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// A timed receive expired with no message (not a failure)
    #[error("operation timed out")]
    Timeout,

    /// A handler rejected a message (recoverable, isolated per message)
    #[error("handler failed: {0}")]
    Handler(String),

    /// ZMQ error
    #[error("ZMQ error: {0}")]
    Zmq(#[source] zmq::Error),
}

impl From<zmq::Error> for SubscriberError {
    fn from(err: zmq::Error) -> Self {
        match err {
            zmq::Error::EAGAIN => Self::Timeout,
            _ => Self::Zmq(err),
        }
    }
}

impl SubscriberError {
    /// Check if the error is retryable (for reconnection logic)
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectFailed(_)
                | Self::SubscribeFailed(_)
                | Self::ReceiveFailed(_)
                | Self::Timeout
                | Self::NotConnected
                | Self::Zmq(_)
        )
    }
}
