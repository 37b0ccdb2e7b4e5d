// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Subscriber client
//!
//! [`SubscriberClient`] owns one subscribing connection, keeps it alive
//! across transport failures with bounded exponential backoff, and hands
//! every received message to a caller-supplied handler. One message is
//! fully handled before the next is requested, so a slow handler
//! back-pressures the connection instead of piling up messages.

use crate::common::{Message, SubscriberConfig, SubscriberError, SubscriberResult};
use crate::reconnect::ReconnectPolicy;
use crate::report::{FailureEvent, FailureReporter, TracingReporter};
use crate::traits::SubscriberTransport;
use crate::zmq::ZmqSub;
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Outcome of a handler invocation
pub type HandlerResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

/// Snapshot of the client's monotonic counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientStats {
    /// Messages handed to the handler
    pub messages_received: u64,

    /// Established connections lost to a transport failure
    pub reconnects: u64,

    /// Handler invocations that returned an error or panicked
    pub handler_failures: u64,
}

/// Longest uninterrupted sleep during a backoff wait; bounds how late a
/// concurrent `stop()` is observed while waiting to reconnect
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Resilient pub/sub subscriber client
///
/// Created from a validated [`SubscriberConfig`]; [`run`](Self::run)
/// blocks the calling thread until [`stop`](Self::stop) is observed.
/// `stop` only flips a flag, so it is safe from any thread; wrap the
/// client in an [`Arc`](std::sync::Arc) to share it with the stopping
/// thread.
///
/// # Example
/// ```no_run
/// use metasub::{SubscriberClient, SubscriberConfig};
///
/// let config = SubscriberConfig::new("tcp://localhost:5556").with_filter(&b"MONROE"[..]);
/// let client = SubscriberClient::new(config)?;
///
/// client.run(|msg| {
///     println!("{}", String::from_utf8_lossy(&msg.payload));
///     Ok(())
/// })?;
/// # Ok::<(), metasub::SubscriberError>(())
/// ```
pub struct SubscriberClient<T: SubscriberTransport = ZmqSub> {
    config: SubscriberConfig,
    transport: Mutex<T>,
    reporter: Box<dyn FailureReporter>,
    state: Mutex<ConnectionState>,
    stop: AtomicBool,
    running: AtomicBool,
    messages_received: AtomicU64,
    reconnects: AtomicU64,
    handler_failures: AtomicU64,
}

impl SubscriberClient<ZmqSub> {
    /// Create a client over ZMQ with the default `tracing` reporter
    pub fn new(config: SubscriberConfig) -> SubscriberResult<Self> {
        config.validate()?;
        let transport = ZmqSub::new(&config);
        Ok(Self::assemble(config, transport, Box::new(TracingReporter)))
    }
}

impl<T: SubscriberTransport> SubscriberClient<T> {
    /// Create a client over a custom transport
    pub fn with_transport(config: SubscriberConfig, transport: T) -> SubscriberResult<Self> {
        config.validate()?;
        Ok(Self::assemble(config, transport, Box::new(TracingReporter)))
    }

    /// Create a client over a custom transport and failure reporter
    pub fn with_reporter(
        config: SubscriberConfig,
        transport: T,
        reporter: Box<dyn FailureReporter>,
    ) -> SubscriberResult<Self> {
        config.validate()?;
        Ok(Self::assemble(config, transport, reporter))
    }

    fn assemble(config: SubscriberConfig, transport: T, reporter: Box<dyn FailureReporter>) -> Self {
        Self {
            config,
            transport: Mutex::new(transport),
            reporter,
            state: Mutex::new(ConnectionState::Disconnected),
            stop: AtomicBool::new(false),
            running: AtomicBool::new(false),
            messages_received: AtomicU64::new(0),
            reconnects: AtomicU64::new(0),
            handler_failures: AtomicU64::new(0),
        }
    }

    /// Run the receive loop, invoking `handler` once per message in the
    /// order received
    ///
    /// Returns only when [`stop`](Self::stop) is observed (`Ok`) or the
    /// configuration is unusable (`Err`); a client that was already
    /// stopped returns `Ok` without connecting. Transport failures are
    /// reported and retried internally; handler failures are reported and
    /// isolated to their message.
    pub fn run<F>(&self, mut handler: F) -> SubscriberResult<()>
    where
        F: FnMut(Message) -> HandlerResult,
    {
        self.config.validate()?;

        if self.running.swap(true, Ordering::SeqCst) {
            return Err(SubscriberError::AlreadyRunning);
        }

        {
            let mut transport = self.transport.lock();
            self.run_loop(&mut *transport, &mut handler);
            transport.close();
        }

        self.set_state(ConnectionState::Disconnected);
        self.running.store(false, Ordering::SeqCst);
        info!("[SUB] Stopped");
        Ok(())
    }

    /// Signal the run loop to exit at its next observation point
    ///
    /// Idempotent and safe from any thread. The loop releases the
    /// transport itself; `stop` never touches it.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    /// Check if the run loop is active
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Snapshot of the client's counters
    pub fn stats(&self) -> ClientStats {
        ClientStats {
            messages_received: self.messages_received.load(Ordering::Relaxed),
            reconnects: self.reconnects.load(Ordering::Relaxed),
            handler_failures: self.handler_failures.load(Ordering::Relaxed),
        }
    }

    fn run_loop<F>(&self, transport: &mut T, handler: &mut F)
    where
        F: FnMut(Message) -> HandlerResult,
    {
        let mut policy =
            ReconnectPolicy::new(self.config.reconnect_initial, self.config.reconnect_max);

        'connect: while !self.stopped() {
            self.set_state(ConnectionState::Connecting);

            if self.establish(transport).is_err() {
                self.set_state(ConnectionState::Failed);
                transport.close();
                self.set_state(ConnectionState::Disconnected);

                if !self.backoff_wait(policy.next_backoff()) {
                    break;
                }
                continue;
            }

            self.set_state(ConnectionState::Connected);
            policy.reset();
            info!(
                "[SUB] ✓ Connected ({} endpoint(s), {} filter(s))",
                self.config.endpoints.len(),
                self.config.filters.len()
            );

            loop {
                if self.stopped() {
                    break 'connect;
                }

                match transport.receive(self.config.recv_timeout) {
                    Ok(msg) => {
                        if self.stopped() {
                            break 'connect;
                        }
                        self.messages_received.fetch_add(1, Ordering::Relaxed);
                        self.dispatch(handler, msg);
                    }
                    // Liveness check: the loop re-checks the stop flag
                    // and receives again
                    Err(SubscriberError::Timeout) => continue,
                    Err(e) => {
                        self.reporter.report(FailureEvent::ReceiveFailed {
                            error: e.to_string(),
                        });
                        self.set_state(ConnectionState::Failed);
                        transport.close();
                        self.set_state(ConnectionState::Disconnected);
                        self.reconnects.fetch_add(1, Ordering::Relaxed);

                        if !self.backoff_wait(policy.next_backoff()) {
                            break 'connect;
                        }
                        continue 'connect;
                    }
                }
            }
        }
    }

    /// Connect every endpoint and register every filter; subscriptions do
    /// not survive a reconnect, so this runs in full on each attempt
    fn establish(&self, transport: &mut T) -> SubscriberResult<()> {
        for endpoint in &self.config.endpoints {
            if let Err(e) = transport.connect(endpoint) {
                self.reporter.report(FailureEvent::ConnectFailed {
                    endpoint: endpoint.clone(),
                    error: e.to_string(),
                });
                return Err(e);
            }
        }

        for filter in &self.config.filters {
            if let Err(e) = transport.subscribe(filter) {
                self.reporter.report(FailureEvent::SubscribeFailed {
                    filter: filter.clone(),
                    error: e.to_string(),
                });
                return Err(e);
            }
        }

        Ok(())
    }

    fn dispatch<F>(&self, handler: &mut F, msg: Message)
    where
        F: FnMut(Message) -> HandlerResult,
    {
        let topic = msg.topic.clone();
        debug!(size = msg.size(), "[SUB] Delivering message");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler(msg)));

        let error = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(e)) => e.to_string(),
            Err(payload) => panic_message(payload),
        };

        self.handler_failures.fetch_add(1, Ordering::Relaxed);
        self.reporter
            .report(FailureEvent::HandlerFailed { topic, error });
    }

    /// Sleep for `delay` in slices, watching the stop flag; returns false
    /// when stopped
    fn backoff_wait(&self, delay: Duration) -> bool {
        debug!(?delay, "[SUB] Backing off before reconnect");
        let deadline = Instant::now() + delay;

        loop {
            if self.stopped() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep((deadline - now).min(STOP_POLL_INTERVAL));
        }
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    fn set_state(&self, state: ConnectionState) {
        *self.state.lock() = state;
    }
}

impl<T: SubscriberTransport> Drop for SubscriberClient<T> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}
