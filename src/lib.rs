//! # metasub
//!
//! Resilient ZMQ subscriber client for metadata stream ingestion.
//!
//! A [`SubscriberClient`] owns one subscribing connection to one or more
//! upstream endpoints, keeps a set of topic-filter subscriptions
//! registered, and delivers every received message to a caller-supplied
//! handler. The connection survives transport failures: the client
//! reconnects with bounded exponential backoff and re-registers all
//! filters, and a handler that rejects (or panics on) one message never
//! takes the loop down.
//!
//! ## Example
//!
//! ```no_run
//! use metasub::{SubscriberClient, SubscriberConfig};
//!
//! let config = SubscriberConfig::new("tcp://localhost:5556")
//!     .with_filter(&b"MONROE"[..]);
//!
//! let client = SubscriberClient::new(config)?;
//!
//! client.run(|msg| {
//!     println!("{}", String::from_utf8_lossy(&msg.payload));
//!     Ok(())
//! })?;
//! # Ok::<(), metasub::SubscriberError>(())
//! ```
//!
//! ## Stopping from another thread
//!
//! [`run`](SubscriberClient::run) blocks its thread;
//! [`stop`](SubscriberClient::stop) only flips a cancellation flag, so
//! share the client behind an `Arc` and stop it from anywhere:
//!
//! ```no_run
//! use metasub::{SubscriberClient, SubscriberConfig};
//! use std::sync::Arc;
//!
//! let client = Arc::new(SubscriberClient::new(
//!     SubscriberConfig::new("tcp://localhost:5556"),
//! )?);
//!
//! let handle = {
//!     let client = Arc::clone(&client);
//!     std::thread::spawn(move || client.run(|_msg| Ok(())))
//! };
//!
//! client.stop();
//! handle.join().unwrap()?;
//! # Ok::<(), metasub::SubscriberError>(())
//! ```
//!
//! ## Architecture
//!
//! 1. **Common**: shared types (errors, config, messages)
//! 2. **Traits**: the transport seam the run loop talks through
//! 3. **Implementations**: the ZMQ SUB transport
//!
//! The run loop is the only entity that touches the transport, so there
//! is no locking around socket state; back-pressure falls out of the loop
//! handling one message completely before requesting the next.

pub mod client;
pub mod common;
pub mod reconnect;
pub mod report;
pub mod traits;
pub mod zmq;

// Re-export commonly used types
pub use client::{ClientStats, ConnectionState, HandlerResult, SubscriberClient};
pub use common::{Message, SubscriberConfig, SubscriberError, SubscriberResult};
pub use reconnect::ReconnectPolicy;
pub use report::{FailureEvent, FailureReporter, TracingReporter};
pub use traits::SubscriberTransport;

pub use crate::zmq::ZmqSub;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::client::*;
    pub use crate::common::*;
    pub use crate::report::*;
    pub use crate::traits::*;
    pub use crate::zmq::ZmqSub;
}
