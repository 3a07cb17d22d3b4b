//! Notification broker for live item updates.
//!
//! The broker fans every published snapshot out to all registered
//! subscribers:
//! - Each subscriber owns a small bounded queue
//! - Publishing never blocks; a subscriber whose queue is full is evicted
//! - No replay: a new subscriber only sees events published after it joined
//!
//! # Example
//!
//! ```ignore
//! let broker = Broker::new(BrokerConfig::default());
//! let handle = broker.subscribe();
//!
//! broker.publish_items(&items)?;
//!
//! match handle.recv() {
//!     Ok(payload) => println!("data: {payload}"),
//!     Err(_) => println!("evicted"),
//! }
//! ```

mod manager;
mod types;

pub use manager::Broker;
pub use types::{BrokerConfig, Payload, SubscriptionHandle, SubscriptionId};
