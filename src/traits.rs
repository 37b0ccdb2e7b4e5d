// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Transport trait definitions
//!
//! The run loop only ever talks to the transport through this seam, so
//! implementations can be swapped (or scripted, in tests) without touching
//! the client logic.

use crate::common::{Message, SubscriberResult};
use std::time::Duration;

/// A subscribing connection to a pub/sub upstream
///
/// The wire protocol (framing, topic-filter matching) is owned entirely by
/// the implementation. Subscriptions are not assumed to survive a
/// `close()`; after reconnecting, every filter is registered again.
pub trait SubscriberTransport: Send {
    /// Connect to an endpoint, creating the underlying resource on first use
    ///
    /// Called once per configured endpoint; all endpoints share one
    /// subscribing connection.
    fn connect(&mut self, endpoint: &str) -> SubscriberResult<()>;

    /// Register a topic filter on the open connection
    fn subscribe(&mut self, filter: &[u8]) -> SubscriberResult<()>;

    /// Receive the next message
    ///
    /// Blocks until a message arrives, or until `timeout` expires with
    /// `Err(Timeout)` when one is given.
    fn receive(&mut self, timeout: Option<Duration>) -> SubscriberResult<Message>;

    /// Release the underlying resource; safe to call when already closed
    fn close(&mut self);
}
