// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the subscriber client against a real ZMQ publisher

use crossbeam::channel;
use metasub::{ConnectionState, Message, SubscriberClient, SubscriberConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

/// Publish `[topic, payload]` pairs in a loop until told to stop; PUB-SUB
/// joins are asynchronous, so single-shot publishes can be lost
fn spawn_publisher(
    address: &'static str,
    frames: Vec<(&'static [u8], &'static [u8])>,
    ready: Arc<Barrier>,
    done: Arc<AtomicBool>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let context = zmq::Context::new();
        let socket = context.socket(zmq::PUB).unwrap();
        socket.bind(address).unwrap();

        ready.wait();

        while !done.load(Ordering::SeqCst) {
            for (topic, payload) in &frames {
                socket.send(*topic, zmq::SNDMORE).unwrap();
                socket.send(*payload, 0).unwrap();
            }
            thread::sleep(Duration::from_millis(10));
        }
    })
}

/// Filter isolation: a subscribed topic is delivered, an unsubscribed one
/// never is
#[test]
fn test_filter_isolation() {
    let barrier = Arc::new(Barrier::new(2));
    let done = Arc::new(AtomicBool::new(false));

    let publisher = spawn_publisher(
        "tcp://127.0.0.1:31510",
        vec![(b"MONROE", b"hello"), (b"OTHER", b"nope")],
        Arc::clone(&barrier),
        Arc::clone(&done),
    );

    let config = SubscriberConfig::new("tcp://127.0.0.1:31510")
        .with_filter(&b"MONROE"[..])
        .with_recv_timeout(Duration::from_millis(100));
    let client = Arc::new(SubscriberClient::new(config).unwrap());

    let (tx, rx) = channel::unbounded::<Message>();
    let subscriber = {
        let client = Arc::clone(&client);
        thread::spawn(move || {
            client.run(move |msg| {
                tx.send(msg).unwrap();
                Ok(())
            })
        })
    };

    barrier.wait();

    // Collect for a while, then shut everything down
    let mut received = Vec::new();
    let deadline = Instant::now() + Duration::from_secs(5);
    while received.len() < 5 && Instant::now() < deadline {
        if let Ok(msg) = rx.recv_timeout(Duration::from_millis(200)) {
            received.push(msg);
        }
    }

    done.store(true, Ordering::SeqCst);
    client.stop();
    subscriber.join().unwrap().unwrap();
    publisher.join().unwrap();

    assert!(!received.is_empty(), "no messages delivered");
    for msg in &received {
        assert_eq!(msg.topic, b"MONROE".to_vec());
        assert_eq!(msg.payload, b"hello".to_vec());
    }
}

/// Ordering: payloads published in sequence arrive in sequence
#[test]
fn test_ordered_delivery() {
    let barrier = Arc::new(Barrier::new(2));
    let done = Arc::new(AtomicBool::new(false));

    let publisher = {
        let (barrier, done) = (Arc::clone(&barrier), Arc::clone(&done));
        thread::spawn(move || {
            let context = zmq::Context::new();
            let socket = context.socket(zmq::PUB).unwrap();
            socket.bind("tcp://127.0.0.1:31511").unwrap();

            barrier.wait();

            let mut seq: u64 = 0;
            while !done.load(Ordering::SeqCst) {
                socket.send(&b"MONROE"[..], zmq::SNDMORE).unwrap();
                socket.send(seq.to_string().as_bytes(), 0).unwrap();
                seq += 1;
                thread::sleep(Duration::from_millis(5));
            }
        })
    };

    let config = SubscriberConfig::new("tcp://127.0.0.1:31511")
        .with_filter(&b"MONROE"[..])
        .with_recv_timeout(Duration::from_millis(100));
    let client = Arc::new(SubscriberClient::new(config).unwrap());

    let (tx, rx) = channel::unbounded::<u64>();
    let subscriber = {
        let client = Arc::clone(&client);
        thread::spawn(move || {
            client.run(move |msg| {
                let seq: u64 = String::from_utf8_lossy(&msg.payload).parse()?;
                tx.send(seq).unwrap();
                Ok(())
            })
        })
    };

    barrier.wait();

    let mut sequence = Vec::new();
    let deadline = Instant::now() + Duration::from_secs(5);
    while sequence.len() < 5 && Instant::now() < deadline {
        if let Ok(seq) = rx.recv_timeout(Duration::from_millis(200)) {
            sequence.push(seq);
        }
    }

    done.store(true, Ordering::SeqCst);
    client.stop();
    subscriber.join().unwrap().unwrap();
    publisher.join().unwrap();

    // A slow join may drop the head of the stream, but whatever arrives
    // must be in publish order
    assert!(sequence.len() >= 5, "too few messages delivered");
    assert!(
        sequence.windows(2).all(|w| w[1] == w[0] + 1),
        "sequence reordered: {:?}",
        sequence
    );
}

/// Stop from another thread while the upstream is silent; shutdown latency
/// is bounded by the receive timeout
#[test]
fn test_stop_from_other_thread() {
    let config = SubscriberConfig::new("tcp://127.0.0.1:31512")
        .with_recv_timeout(Duration::from_millis(100));
    let client = Arc::new(SubscriberClient::new(config).unwrap());

    let subscriber = {
        let client = Arc::clone(&client);
        thread::spawn(move || client.run(|_msg| Ok(())))
    };

    // Give the loop time to connect and block in receive
    thread::sleep(Duration::from_millis(300));
    assert!(client.is_running());
    assert_eq!(client.state(), ConnectionState::Connected);

    let stop_started = Instant::now();
    client.stop();
    client.stop();
    subscriber.join().unwrap().unwrap();

    assert!(stop_started.elapsed() < Duration::from_secs(2));
    assert!(!client.is_running());
    assert_eq!(client.state(), ConnectionState::Disconnected);
    assert_eq!(client.stats().messages_received, 0);
}
