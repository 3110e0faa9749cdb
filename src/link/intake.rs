//! Frame intake: the handoff between transport and control loop.
//!
//! The transport layer delivers raw buffers from a receive callback that
//! runs outside the control loop. This bounded single-producer channel is
//! the only path between the two, so the loop always observes complete
//! frames and the callback never blocks: when the queue is full the frame
//! is dropped, exactly as the radio would drop it.

use tokio::sync::mpsc;
use tracing::trace;

/// Default intake queue depth; a few control-loop periods of headroom.
pub const DEFAULT_INTAKE_DEPTH: usize = 32;

/// Producer half, owned by the transport receive callback.
pub struct FrameSender {
    tx: mpsc::Sender<Vec<u8>>,
    dropped: u64,
}

impl FrameSender {
    /// Offer a received buffer to the control loop without blocking.
    ///
    /// Returns `false` when the frame was dropped (queue full or the
    /// consumer is gone).
    pub fn offer(&mut self, frame: Vec<u8>) -> bool {
        match self.tx.try_send(frame) {
            Ok(()) => true,
            Err(_) => {
                self.dropped += 1;
                trace!(dropped = self.dropped, "intake queue full, frame dropped");
                false
            }
        }
    }

    /// Frames dropped at the intake so far.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

/// Consumer half, owned by the control loop.
pub struct FrameReceiver {
    rx: mpsc::Receiver<Vec<u8>>,
}

impl FrameReceiver {
    /// Take one pending frame, if any, without blocking.
    pub fn try_next(&mut self) -> Option<Vec<u8>> {
        self.rx.try_recv().ok()
    }

    /// Drain up to `max` pending frames for one loop iteration.
    pub fn drain(&mut self, max: usize) -> Vec<Vec<u8>> {
        let mut frames = Vec::new();
        while frames.len() < max {
            match self.try_next() {
                Some(frame) => frames.push(frame),
                None => break,
            }
        }
        frames
    }
}

/// Create a bounded intake channel of the given depth.
pub fn intake_channel(depth: usize) -> (FrameSender, FrameReceiver) {
    let (tx, rx) = mpsc::channel(depth);
    (FrameSender { tx, dropped: 0 }, FrameReceiver { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offer_and_drain() {
        let (mut tx, mut rx) = intake_channel(8);
        assert!(tx.offer(vec![1, 2, 3]));
        assert!(tx.offer(vec![4, 5]));

        let frames = rx.drain(16);
        assert_eq!(frames, vec![vec![1, 2, 3], vec![4, 5]]);
        assert!(rx.try_next().is_none());
    }

    #[test]
    fn test_full_queue_drops_frame() {
        let (mut tx, mut rx) = intake_channel(2);
        assert!(tx.offer(vec![1]));
        assert!(tx.offer(vec![2]));
        assert!(!tx.offer(vec![3]));
        assert_eq!(tx.dropped(), 1);

        // The consumer sees only the admitted frames, in order.
        assert_eq!(rx.drain(16), vec![vec![1], vec![2]]);
    }

    #[test]
    fn test_drain_respects_budget() {
        let (mut tx, mut rx) = intake_channel(8);
        for i in 0..5u8 {
            tx.offer(vec![i]);
        }
        assert_eq!(rx.drain(3).len(), 3);
        assert_eq!(rx.drain(3).len(), 2);
    }

    #[test]
    fn test_closed_consumer_reports_drop() {
        let (mut tx, rx) = intake_channel(2);
        drop(rx);
        assert!(!tx.offer(vec![1]));
        assert_eq!(tx.dropped(), 1);
    }
}
