//! Tenant-tagged coactivation buffer: `query` pushes pairs of co-returned
//! memory ids here, and the waypoint-maintenance background task drains
//! them to reinforce the edges between memories that keep showing up
//! together (§4.6).

use std::collections::VecDeque;
use std::sync::Mutex;

use openmemory_core::constants::COACTIVATION_BUFFER_CAPACITY;

/// `(src_id, dst_id, user_id)` pair awaiting waypoint reinforcement.
pub type CoactivationPair = (String, String, Option<String>);

/// Bounded FIFO. Full buffer drops the newest enqueue rather than evicting
/// pairs the maintenance task hasn't seen yet.
pub struct CoactivationBuffer {
    inner: Mutex<VecDeque<CoactivationPair>>,
}

impl CoactivationBuffer {
    pub fn new() -> Self {
        Self { inner: Mutex::new(VecDeque::with_capacity(COACTIVATION_BUFFER_CAPACITY)) }
    }

    pub fn push(&self, src_id: String, dst_id: String, user_id: Option<String>) {
        let mut q = self.inner.lock().expect("coactivation buffer lock poisoned");
        if q.len() >= COACTIVATION_BUFFER_CAPACITY {
            return;
        }
        q.push_back((src_id, dst_id, user_id));
    }

    /// Pushes every unordered pair within `ids` (a single query's returned
    /// set), tagged with `user_id`.
    pub fn push_coreturned(&self, ids: &[String], user_id: Option<String>) {
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                self.push(ids[i].clone(), ids[j].clone(), user_id.clone());
            }
        }
    }

    pub fn drain_up_to(&self, n: usize) -> Vec<CoactivationPair> {
        let mut q = self.inner.lock().expect("coactivation buffer lock poisoned");
        let take = n.min(q.len());
        q.drain(..take).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("coactivation buffer lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CoactivationBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_coreturned_covers_all_pairs() {
        let buf = CoactivationBuffer::new();
        buf.push_coreturned(&["a".into(), "b".into(), "c".into()], None);
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn drain_respects_requested_count() {
        let buf = CoactivationBuffer::new();
        buf.push("a".into(), "b".into(), None);
        buf.push("c".into(), "d".into(), None);
        let drained = buf.drain_up_to(1);
        assert_eq!(drained.len(), 1);
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn full_buffer_drops_newest_enqueue() {
        let buf = CoactivationBuffer::new();
        for i in 0..(COACTIVATION_BUFFER_CAPACITY + 10) {
            buf.push(format!("a{i}"), format!("b{i}"), None);
        }
        assert_eq!(buf.len(), COACTIVATION_BUFFER_CAPACITY);
    }
}
