//! Broker types.

use crate::config::DEFAULT_SUBSCRIBER_BUFFER;
use std::fmt;
use std::sync::Arc;

/// One serialized event, shared by every subscriber it is sent to.
pub type Payload = Arc<str>;

/// Configuration for a broker.
#[derive(Clone, Debug)]
pub struct BrokerConfig {
    /// Max queued payloads per subscriber before it is evicted.
    /// Default: 4
    pub buffer_size: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_SUBSCRIBER_BUFFER,
        }
    }
}

/// Unique identifier for a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Receiving end of a subscription.
///
/// Once the broker evicts or unsubscribes this subscription, the receiver
/// drains whatever is still queued and then reports disconnection.
pub struct SubscriptionHandle {
    pub id: SubscriptionId,
    /// Channel to receive payloads.
    pub receiver: crossbeam_channel::Receiver<Payload>,
}

impl SubscriptionHandle {
    /// Receive the next payload (blocking).
    pub fn recv(&self) -> Result<Payload, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a payload (non-blocking).
    pub fn try_recv(&self) -> Result<Payload, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<Payload, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}
