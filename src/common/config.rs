//! Subscriber configuration

use crate::common::{SubscriberError, SubscriberResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a [`SubscriberClient`](crate::client::SubscriberClient)
///
/// Built with `with_*` methods and checked by [`validate`](Self::validate).
/// The defaults mirror a plain subscribe-all client: one empty topic
/// filter, blocking receives, reconnect backoff from 100 ms up to 30 s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriberConfig {
    /// Endpoints to connect to, in order (at least one required)
    pub endpoints: Vec<String>,

    /// Topic filters to register; an empty filter matches every message,
    /// an empty *list* receives nothing
    pub filters: Vec<Vec<u8>>,

    /// Initial reconnect backoff delay
    pub reconnect_initial: Duration,

    /// Maximum reconnect backoff delay
    pub reconnect_max: Duration,

    /// Receive timeout (None = block until a message arrives); when set,
    /// an expired receive is a liveness check, not a failure
    pub recv_timeout: Option<Duration>,

    /// High water mark for the receive buffer (0 = unlimited)
    pub recv_hwm: usize,

    /// Linger time on close (None = immediate)
    pub linger: Option<Duration>,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            filters: vec![Vec::new()],
            reconnect_initial: Duration::from_millis(100),
            reconnect_max: Duration::from_secs(30),
            recv_timeout: None,
            recv_hwm: 1000,
            linger: None,
        }
    }
}

impl SubscriberConfig {
    /// Create a new config with a single endpoint
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoints: vec![endpoint.into()],
            ..Default::default()
        }
    }

    /// Add another endpoint (the one SUB connection fans in from all of them)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoints.push(endpoint.into());
        self
    }

    /// Add a topic filter
    ///
    /// The first explicit filter replaces the default subscribe-all
    /// (empty) filter; further calls add filters alongside it.
    pub fn with_filter(mut self, filter: impl Into<Vec<u8>>) -> Self {
        if self.filters.len() == 1 && self.filters[0].is_empty() {
            self.filters.clear();
        }
        self.filters.push(filter.into());
        self
    }

    /// Set the reconnect backoff delay range
    pub fn with_reconnect_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.reconnect_initial = initial;
        self.reconnect_max = max;
        self
    }

    /// Set the receive timeout
    pub fn with_recv_timeout(mut self, timeout: Duration) -> Self {
        self.recv_timeout = Some(timeout);
        self
    }

    /// Set receive high water mark
    pub fn with_recv_hwm(mut self, hwm: usize) -> Self {
        self.recv_hwm = hwm;
        self
    }

    /// Set linger time on close
    pub fn with_linger(mut self, linger: Duration) -> Self {
        self.linger = Some(linger);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> SubscriberResult<()> {
        if self.endpoints.is_empty() {
            return Err(SubscriberError::InvalidConfig(
                "at least one endpoint is required".to_string(),
            ));
        }

        for endpoint in &self.endpoints {
            if endpoint.is_empty() {
                return Err(SubscriberError::InvalidConfig(
                    "endpoint cannot be empty".to_string(),
                ));
            }
            if !endpoint.contains("://") {
                return Err(SubscriberError::InvalidConfig(format!(
                    "endpoint '{}' is missing a transport scheme",
                    endpoint
                )));
            }
        }

        for (i, filter) in self.filters.iter().enumerate() {
            if self.filters[..i].contains(filter) {
                return Err(SubscriberError::InvalidConfig(format!(
                    "duplicate topic filter '{}'",
                    String::from_utf8_lossy(filter)
                )));
            }
        }

        if self.reconnect_initial.is_zero() {
            return Err(SubscriberError::InvalidConfig(
                "reconnect backoff initial delay must be greater than zero".to_string(),
            ));
        }
        if self.reconnect_max < self.reconnect_initial {
            return Err(SubscriberError::InvalidConfig(
                "reconnect backoff max must not be below the initial delay".to_string(),
            ));
        }

        Ok(())
    }
}
