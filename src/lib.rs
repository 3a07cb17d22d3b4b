//! # Claimboard
//!
//! A shared gather-and-claim tracker. Users record progress toward named
//! item targets and reserve ("claim") slices of the remaining work; every
//! connected viewer is kept in sync by full-state broadcasts.
//!
//! ## Core Concepts
//!
//! - **Items**: a target quantity, the amount gathered, and claims on the rest
//! - **Store**: the whole collection, read-modify-written under one lock
//! - **Reconciler**: pure rules that clamp and apply gather/claim requests
//! - **Broker**: non-blocking fan-out that evicts subscribers who fall behind
//! - **Snapshots**: periodic timestamped archives with a retention cap
//!
//! ## Example
//!
//! ```ignore
//! use claimboard::{ClaimUpdate, Tracker, TrackerConfig};
//!
//! let tracker = Tracker::open(TrackerConfig::with_data_dir("./board"))?;
//! let _snapshots = tracker.start_scheduler()?;
//!
//! tracker.auth().authorize(&cookie)?;
//! tracker.claim(&ClaimUpdate {
//!     name: "Iron Ore".into(),
//!     claimed: 50,
//!     claimer: "Bob".into(),
//! })?;
//!
//! // On a connection thread:
//! let (_gone, disconnect) = claimboard::stream::disconnect_signal();
//! tracker.open_stream().run(socket, &disconnect);
//! ```

pub mod auth;
pub mod broker;
pub mod config;
pub mod error;
pub mod import;
pub mod persist;
pub mod reconciler;
pub mod scheduler;
pub mod store;
pub mod stream;
pub mod tracker;
pub mod types;

// Re-exports
pub use auth::{AuthGate, SecretConfig, AUTH_COOKIE, AUTH_COOKIE_MAX_AGE};
pub use broker::{Broker, BrokerConfig, Payload, SubscriptionHandle, SubscriptionId};
pub use config::TrackerConfig;
pub use error::{ErrorKind, Result, TrackerError};
pub use reconciler::{apply_claim, apply_gather, find_item};
pub use scheduler::{SchedulerHandle, SnapshotConfig, SnapshotScheduler};
pub use store::{ItemStore, StoreTxn};
pub use stream::{EventStream, Frame, StreamEnd};
pub use tracker::Tracker;
pub use types::*;
