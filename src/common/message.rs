//! Message type delivered to handlers

use serde::{Deserialize, Serialize};

/// A received pub/sub message
///
/// Both fields are opaque byte sequences; no structure is assumed. For
/// multipart streams the frames arrive as `[topic, payload]`. Streams
/// that publish a single topic-prefixed frame are delivered with an
/// empty `topic` and the whole frame as `payload` (prefix matching is
/// the transport's job either way).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Topic frame (empty for single-frame streams)
    pub topic: Vec<u8>,

    /// Message payload
    pub payload: Vec<u8>,
}

impl Message {
    /// Create a message from separate topic and payload frames
    pub fn new(topic: Vec<u8>, payload: Vec<u8>) -> Self {
        Self { topic, payload }
    }

    /// Create a message from a single topic-prefixed frame
    pub fn from_frame(frame: Vec<u8>) -> Self {
        Self {
            topic: Vec::new(),
            payload: frame,
        }
    }

    /// Total size in bytes
    pub fn size(&self) -> usize {
        self.topic.len() + self.payload.len()
    }
}

impl From<Vec<u8>> for Message {
    fn from(frame: Vec<u8>) -> Self {
        Self::from_frame(frame)
    }
}

impl From<&[u8]> for Message {
    fn from(frame: &[u8]) -> Self {
        Self::from_frame(frame.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_frame_keeps_payload_opaque() {
        let msg = Message::from_frame(b"MONROE.META.NODE {\"seq\": 1}".to_vec());
        assert!(msg.topic.is_empty());
        assert_eq!(msg.payload, b"MONROE.META.NODE {\"seq\": 1}".to_vec());
        assert_eq!(msg.size(), msg.payload.len());
    }
}
