//! Demo: metadata stream subscriber
//!
//! Connects to a metadata publisher and prints every message for a topic,
//! reconnecting automatically if the publisher goes away.
//!
//! ```
//! cargo run --example subscriber -- tcp://localhost:5556 MONROE
//! ```

use metasub::{SubscriberClient, SubscriberConfig};
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let endpoint = args.get(1).map(|s| s.as_str()).unwrap_or("tcp://localhost:5556");
    let topic = args.get(2).map(|s| s.as_str()).unwrap_or("MONROE");

    println!("Connecting to publisher at {}", endpoint);
    println!("Subscribing to topic: '{}'", topic);

    let config = SubscriberConfig::new(endpoint).with_filter(topic.as_bytes());
    let client = SubscriberClient::new(config)?;

    // Runs until the process is interrupted
    client.run(|msg| {
        let topic = String::from_utf8_lossy(&msg.topic);

        // Metadata payloads are usually JSON; fall back to raw bytes
        match serde_json::from_slice::<serde_json::Value>(&msg.payload) {
            Ok(value) => println!("[{}] {}", topic, value),
            Err(_) => println!("[{}] {}", topic, String::from_utf8_lossy(&msg.payload)),
        }
        Ok(())
    })?;

    Ok(())
}
