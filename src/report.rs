// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Failure reporting
//!
//! The run loop never terminates on recoverable failures; instead each one
//! is handed to a [`FailureReporter`] with its endpoint/filter/topic
//! context. The default reporter logs through `tracing`; callers that need
//! metrics or alerting implement the trait themselves.

use tracing::warn;

/// A structured failure event from the run loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureEvent {
    /// Connecting to an endpoint failed
    ConnectFailed { endpoint: String, error: String },

    /// Registering a topic filter failed
    SubscribeFailed { filter: Vec<u8>, error: String },

    /// Receiving from an established connection failed
    ReceiveFailed { error: String },

    /// A handler rejected (or panicked on) a message
    HandlerFailed { topic: Vec<u8>, error: String },
}

impl FailureEvent {
    /// Short event name, for sinks that key on it
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConnectFailed { .. } => "connect_failed",
            Self::SubscribeFailed { .. } => "subscribe_failed",
            Self::ReceiveFailed { .. } => "receive_failed",
            Self::HandlerFailed { .. } => "handler_failed",
        }
    }
}

/// Sink for failure events
pub trait FailureReporter: Send + Sync {
    /// Report a failure event
    fn report(&self, event: FailureEvent);
}

/// Default reporter: structured warnings via `tracing`
pub struct TracingReporter;

impl FailureReporter for TracingReporter {
    fn report(&self, event: FailureEvent) {
        match &event {
            FailureEvent::ConnectFailed { endpoint, error } => {
                warn!(%endpoint, %error, "[SUB] ⚠ connect failed");
            }
            FailureEvent::SubscribeFailed { filter, error } => {
                let filter = String::from_utf8_lossy(filter);
                warn!(%filter, %error, "[SUB] ⚠ subscribe failed");
            }
            FailureEvent::ReceiveFailed { error } => {
                warn!(%error, "[SUB] ⚠ receive failed");
            }
            FailureEvent::HandlerFailed { topic, error } => {
                let topic = String::from_utf8_lossy(topic);
                warn!(%topic, %error, "[SUB] ⚠ handler failed");
            }
        }
    }
}
