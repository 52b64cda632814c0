use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use pacer_host::ForegroundDispatcher;

/// Type-erased firing step: run the background phase, post the continuation
/// or failure handler, report whether the background phase succeeded.
pub(crate) type FireFn = Box<dyn Fn(&Arc<dyn ForegroundDispatcher>) -> bool + Send + Sync>;

/// A scheduled action, shared between the pending queue and its
/// cancellation handle. Identity is Arc identity.
pub(crate) struct ActionEntry {
    /// Task name, for logging and metrics.
    pub(crate) name: String,
    pub(crate) fire: FireFn,
    /// `None` for one-shot actions; the re-applied gap for repeating ones.
    /// Immutable after construction.
    pub(crate) interval: Option<Duration>,
    /// One-way flag, set by the handle, read by the worker.
    canceled: AtomicBool,
}

impl ActionEntry {
    pub(crate) fn new(name: String, fire: FireFn, interval: Option<Duration>) -> Self {
        Self {
            name,
            fire,
            interval,
            canceled: AtomicBool::new(false),
        }
    }

    pub(crate) fn cancel(&self) {
        self.canceled.store(true, AtomicOrdering::Release);
    }

    pub(crate) fn is_canceled(&self) -> bool {
        self.canceled.load(AtomicOrdering::Acquire)
    }
}

/// Heap entry: an action plus the instant it becomes due.
struct Pending {
    fire_at: Instant,
    /// Insertion sequence; keeps equal fire times in a stable order.
    seq: u64,
    entry: Arc<ActionEntry>,
}

// BinaryHeap is a max-heap, so the ordering is inverted: the earliest-due
// entry compares greatest.
impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .fire_at
            .cmp(&self.fire_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.fire_at == other.fire_at && self.seq == other.seq
    }
}

impl Eq for Pending {}

/// Min-heap of pending actions keyed by fire time.
///
/// Cancellation is lazy: canceled entries stay in the heap until they reach
/// the head, so canceling never pays for arbitrary-element removal.
pub(crate) struct PendingQueue {
    heap: BinaryHeap<Pending>,
    next_seq: u64,
}

impl PendingQueue {
    pub(crate) fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    /// Insert an action. Returns `true` when it became the earliest-due
    /// entry, meaning a sleeping worker must re-evaluate its wait.
    pub(crate) fn push(&mut self, entry: Arc<ActionEntry>, fire_at: Instant) -> bool {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Pending {
            fire_at,
            seq,
            entry,
        });
        self.heap.peek().map_or(false, |head| head.seq == seq)
    }

    /// Fire time of the earliest-due action.
    pub(crate) fn peek(&self) -> Option<(Instant, &Arc<ActionEntry>)> {
        self.heap.peek().map(|p| (p.fire_at, &p.entry))
    }

    /// Remove and return the earliest-due action.
    pub(crate) fn pop(&mut self) -> Option<(Instant, Arc<ActionEntry>)> {
        self.heap.pop().map(|p| (p.fire_at, p.entry))
    }

    /// Drop canceled actions sitting at the head of the queue. Returns how
    /// many were discarded.
    pub(crate) fn discard_canceled_head(&mut self) -> usize {
        let mut discarded = 0;
        while self
            .heap
            .peek()
            .map_or(false, |head| head.entry.is_canceled())
        {
            self.heap.pop();
            discarded += 1;
        }
        discarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> Arc<ActionEntry> {
        Arc::new(ActionEntry::new(name.to_string(), Box::new(|_| true), None))
    }

    #[test]
    fn pops_in_fire_time_order() {
        let mut queue = PendingQueue::new();
        let now = Instant::now();

        queue.push(entry("late"), now + Duration::from_millis(50));
        queue.push(entry("early"), now + Duration::from_millis(10));
        queue.push(entry("mid"), now + Duration::from_millis(30));

        assert_eq!(queue.pop().unwrap().1.name, "early");
        assert_eq!(queue.pop().unwrap().1.name, "mid");
        assert_eq!(queue.pop().unwrap().1.name, "late");
        assert!(queue.is_empty());
    }

    #[test]
    fn equal_fire_times_keep_insertion_order() {
        let mut queue = PendingQueue::new();
        let at = Instant::now() + Duration::from_millis(10);

        queue.push(entry("first"), at);
        queue.push(entry("second"), at);

        assert_eq!(queue.pop().unwrap().1.name, "first");
        assert_eq!(queue.pop().unwrap().1.name, "second");
    }

    #[test]
    fn push_reports_new_head() {
        let mut queue = PendingQueue::new();
        let now = Instant::now();

        assert!(queue.push(entry("a"), now + Duration::from_millis(50)));
        assert!(!queue.push(entry("b"), now + Duration::from_millis(80)));
        assert!(queue.push(entry("c"), now + Duration::from_millis(10)));
    }

    #[test]
    fn discards_canceled_run_at_head() {
        let mut queue = PendingQueue::new();
        let now = Instant::now();

        let a = entry("a");
        let b = entry("b");
        queue.push(a.clone(), now);
        queue.push(b.clone(), now + Duration::from_millis(5));
        queue.push(entry("live"), now + Duration::from_millis(10));

        a.cancel();
        b.cancel();

        assert_eq!(queue.discard_canceled_head(), 2);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.peek().unwrap().1.name, "live");
    }

    #[test]
    fn canceled_entry_behind_head_is_not_discarded() {
        let mut queue = PendingQueue::new();
        let now = Instant::now();

        let behind = entry("behind");
        queue.push(entry("head"), now);
        queue.push(behind.clone(), now + Duration::from_millis(5));
        behind.cancel();

        assert_eq!(queue.discard_canceled_head(), 0);
        assert_eq!(queue.len(), 2);
    }
}
