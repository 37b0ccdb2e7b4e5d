//! Common types for the subscriber client

pub mod config;
pub mod error;
pub mod message;

pub use config::SubscriberConfig;
pub use error::{SubscriberError, SubscriberResult};
pub use message::Message;
