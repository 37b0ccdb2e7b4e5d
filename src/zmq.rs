//! ZMQ SUB transport (client-side publish-subscribe)
//!
//! SUB sockets receive broadcast messages from PUB peers and filter them
//! by topic prefix on the receiving side.

use crate::common::{Message, SubscriberConfig, SubscriberError, SubscriberResult};
use crate::traits::SubscriberTransport;
use std::time::Duration;
use tracing::debug;

/// ZMQ SUB socket implementation of [`SubscriberTransport`]
pub struct ZmqSub {
    context: zmq::Context,
    socket: Option<zmq::Socket>,
    recv_hwm: usize,
    linger: Option<Duration>,
}

impl ZmqSub {
    /// Create a SUB transport with socket options taken from the config
    pub fn new(config: &SubscriberConfig) -> Self {
        Self {
            context: zmq::Context::new(),
            socket: None,
            recv_hwm: config.recv_hwm,
            linger: config.linger,
        }
    }

    fn ensure_socket(&mut self) -> SubscriberResult<&zmq::Socket> {
        if self.socket.is_none() {
            let socket = self.context.socket(zmq::SUB)?;

            let linger_ms = self.linger.map(|d| d.as_millis() as i32).unwrap_or(0);
            socket.set_linger(linger_ms)?;
            socket.set_rcvhwm(self.recv_hwm as i32)?;
            socket.set_conflate(false)?; // Keep all messages

            self.socket = Some(socket);
        }

        self.socket.as_ref().ok_or(SubscriberError::NotConnected)
    }
}

impl SubscriberTransport for ZmqSub {
    fn connect(&mut self, endpoint: &str) -> SubscriberResult<()> {
        let socket = self.ensure_socket()?;

        socket
            .connect(endpoint)
            .map_err(|e| SubscriberError::ConnectFailed(format!("{}: {}", endpoint, e)))?;

        debug!("[ZMQ-SUB] Connected to {}", endpoint);
        Ok(())
    }

    fn subscribe(&mut self, filter: &[u8]) -> SubscriberResult<()> {
        let socket = self.socket.as_ref().ok_or(SubscriberError::NotConnected)?;

        socket.set_subscribe(filter).map_err(|e| {
            SubscriberError::SubscribeFailed(format!(
                "'{}': {}",
                String::from_utf8_lossy(filter),
                e
            ))
        })?;

        Ok(())
    }

    fn receive(&mut self, timeout: Option<Duration>) -> SubscriberResult<Message> {
        let socket = self.socket.as_ref().ok_or(SubscriberError::NotConnected)?;

        // Poll first when a timeout is set
        if let Some(timeout) = timeout {
            let mut poll_items = [socket.as_poll_item(zmq::POLLIN)];
            zmq::poll(&mut poll_items, timeout.as_millis() as i64)?;

            if !poll_items[0].is_readable() {
                return Err(SubscriberError::Timeout);
            }
        }

        // Receive multipart message: [topic, payload]
        let first = socket
            .recv_bytes(0)
            .map_err(|e| SubscriberError::ReceiveFailed(e.to_string()))?;

        if !socket.get_rcvmore()? {
            // Single-part message (no topic frame)
            return Ok(Message::from_frame(first));
        }

        let payload = socket
            .recv_bytes(0)
            .map_err(|e| SubscriberError::ReceiveFailed(e.to_string()))?;

        // Streams are [topic, payload]; drop any trailing frames so the
        // next receive starts on a message boundary
        while socket.get_rcvmore()? {
            let _ = socket
                .recv_bytes(0)
                .map_err(|e| SubscriberError::ReceiveFailed(e.to_string()))?;
        }

        Ok(Message::new(first, payload))
    }

    fn close(&mut self) {
        self.socket = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_creates_socket() {
        let config = SubscriberConfig::new("tcp://127.0.0.1:31505");
        let mut sub = ZmqSub::new(&config);

        sub.connect("tcp://127.0.0.1:31505").unwrap();
        sub.subscribe(b"topic").unwrap();

        sub.close();
    }

    #[test]
    fn test_receive_before_connect_fails() {
        let config = SubscriberConfig::new("tcp://127.0.0.1:31506");
        let mut sub = ZmqSub::new(&config);

        let result = sub.receive(Some(Duration::from_millis(10)));
        assert!(matches!(result, Err(SubscriberError::NotConnected)));
    }

    #[test]
    fn test_receive_timeout_on_silent_endpoint() {
        let config = SubscriberConfig::new("tcp://127.0.0.1:31507");
        let mut sub = ZmqSub::new(&config);

        sub.connect("tcp://127.0.0.1:31507").unwrap();
        sub.subscribe(b"").unwrap();

        let result = sub.receive(Some(Duration::from_millis(50)));
        assert!(matches!(result, Err(SubscriberError::Timeout)));
    }

    #[test]
    fn test_close_is_idempotent() {
        let config = SubscriberConfig::new("tcp://127.0.0.1:31508");
        let mut sub = ZmqSub::new(&config);

        sub.connect("tcp://127.0.0.1:31508").unwrap();
        sub.close();
        sub.close();

        let result = sub.receive(Some(Duration::from_millis(10)));
        assert!(matches!(result, Err(SubscriberError::NotConnected)));
    }
}
