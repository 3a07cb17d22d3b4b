//! Per-subscriber event stream delivery.
//!
//! Each live connection runs [`EventStream::run`] on its own thread. The
//! loop waits on whichever comes first: the next queued payload, the
//! keep-alive tick, or the client disconnecting. Every frame is written
//! and flushed whole, so data and keep-alive never interleave mid-frame.

use crate::broker::{Broker, Payload, SubscriptionHandle, SubscriptionId};
use crossbeam_channel::{select, tick, Receiver, Sender};
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

/// One self-delimited unit on the event stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    /// Sent once on open so the client sees the stream established.
    Connected,
    Data(Payload),
    KeepAlive,
}

impl Frame {
    /// Wire encoding of this frame.
    pub fn encode(&self) -> String {
        match self {
            Frame::Connected => ": connected\n\n".to_string(),
            Frame::Data(payload) => format!("data: {}\n\n", payload),
            Frame::KeepAlive => ": keep-alive\n\n".to_string(),
        }
    }

    fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(self.encode().as_bytes())?;
        out.flush()
    }
}

/// Why a delivery loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamEnd {
    /// The client went away.
    Disconnected,
    /// The broker dropped this subscriber and its backlog is drained.
    Evicted,
    /// Writing to the client failed.
    WriteFailed,
}

/// Create a disconnect signal. Sending on, or dropping, the sender ends
/// the stream that holds the receiver.
pub fn disconnect_signal() -> (Sender<()>, Receiver<()>) {
    crossbeam_channel::bounded(1)
}

/// A live subscription bound to one outbound connection.
///
/// Dropping the stream deregisters it from the broker.
pub struct EventStream {
    broker: Arc<Broker>,
    handle: SubscriptionHandle,
    keep_alive: Duration,
}

impl EventStream {
    /// Subscribe to `broker`.
    pub fn open(broker: Arc<Broker>, keep_alive: Duration) -> Self {
        let handle = broker.subscribe();
        Self {
            broker,
            handle,
            keep_alive,
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.handle.id
    }

    /// Deliver frames to `out` until the client disconnects, the broker
    /// evicts this subscriber, or a write fails.
    pub fn run<W: Write>(self, mut out: W, disconnect: &Receiver<()>) -> StreamEnd {
        let end = self.deliver(&mut out, disconnect);
        tracing::debug!(subscription = %self.id(), reason = ?end, "event stream closed");
        end
    }

    fn deliver<W: Write>(&self, out: &mut W, disconnect: &Receiver<()>) -> StreamEnd {
        if Frame::Connected.write_to(out).is_err() {
            return StreamEnd::WriteFailed;
        }

        let ticker = tick(self.keep_alive);
        loop {
            let frame = select! {
                recv(self.handle.receiver) -> msg => match msg {
                    Ok(payload) => Frame::Data(payload),
                    Err(_) => return StreamEnd::Evicted,
                },
                recv(ticker) -> _ => Frame::KeepAlive,
                recv(disconnect) -> _ => return StreamEnd::Disconnected,
            };

            if frame.write_to(out).is_err() {
                return StreamEnd::WriteFailed;
            }
        }
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.broker.unsubscribe(self.handle.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::BrokerConfig;
    use parking_lot::Mutex;
    use std::thread;

    /// Writer that appends into a shared buffer.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().clone()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn wait_for(cond: impl Fn() -> bool) {
        for _ in 0..200 {
            if cond() {
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("condition not reached");
    }

    #[test]
    fn test_frame_encoding() {
        assert_eq!(Frame::Connected.encode(), ": connected\n\n");
        assert_eq!(Frame::KeepAlive.encode(), ": keep-alive\n\n");
        assert_eq!(
            Frame::Data(r#"{"type":"update","items":[]}"#.into()).encode(),
            "data: {\"type\":\"update\",\"items\":[]}\n\n"
        );
    }

    #[test]
    fn test_delivers_then_unsubscribes_on_disconnect() {
        let broker = Arc::new(Broker::default());
        let stream = EventStream::open(Arc::clone(&broker), Duration::from_secs(30));
        let (stop, disconnect) = disconnect_signal();
        let buf = SharedBuf::default();

        let out = buf.clone();
        let worker = thread::spawn(move || stream.run(out, &disconnect));

        broker.publish("{\"n\":1}".into());
        wait_for(|| buf.text().contains("data: {\"n\":1}\n\n"));

        drop(stop);
        assert_eq!(worker.join().unwrap(), StreamEnd::Disconnected);
        assert_eq!(broker.subscription_count(), 0);
        assert!(buf.text().starts_with(": connected\n\n"));
    }

    #[test]
    fn test_keep_alive_on_idle_stream() {
        let broker = Arc::new(Broker::default());
        let stream = EventStream::open(Arc::clone(&broker), Duration::from_millis(10));
        let (stop, disconnect) = disconnect_signal();
        let buf = SharedBuf::default();

        let out = buf.clone();
        let worker = thread::spawn(move || stream.run(out, &disconnect));

        wait_for(|| buf.text().contains(": keep-alive\n\n"));
        stop.send(()).unwrap();
        assert_eq!(worker.join().unwrap(), StreamEnd::Disconnected);
    }

    #[test]
    fn test_write_failure_ends_stream() {
        let broker = Arc::new(Broker::default());
        let stream = EventStream::open(Arc::clone(&broker), Duration::from_secs(30));
        let (_stop, disconnect) = disconnect_signal();

        assert_eq!(stream.run(BrokenPipe, &disconnect), StreamEnd::WriteFailed);
        assert_eq!(broker.subscription_count(), 0);
    }

    #[test]
    fn test_evicted_stream_ends() {
        let broker = Arc::new(Broker::new(BrokerConfig { buffer_size: 1 }));
        let stream = EventStream::open(Arc::clone(&broker), Duration::from_secs(30));
        let (_stop, disconnect) = disconnect_signal();

        // Overflow before the loop starts draining.
        broker.publish("a".into());
        broker.publish("b".into());
        assert_eq!(broker.subscription_count(), 0);

        let buf = SharedBuf::default();
        assert_eq!(stream.run(buf.clone(), &disconnect), StreamEnd::Evicted);
        assert!(buf.text().contains("data: a\n\n"));
        assert!(!buf.text().contains("data: b"));
    }
}
