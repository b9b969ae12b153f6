use crate::Millis;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

/// Handle to a scheduled wakeup, used to cancel it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Entry<W> {
    at: Millis,
    id: TimerId,
    wake: W,
}

impl<W> PartialEq for Entry<W> {
    fn eq(&self, other: &Self) -> bool {
        (self.at, self.id) == (other.at, other.id)
    }
}

impl<W> Eq for Entry<W> {}

impl<W> PartialOrd for Entry<W> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<W> Ord for Entry<W> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.at, self.id).cmp(&(other.at, other.id))
    }
}

/// Cancellable queue of timestamped wakeups.
///
/// Entries due at the same instant fire in scheduling order.
#[derive(Debug)]
pub struct TimerQueue<W> {
    heap: BinaryHeap<Reverse<Entry<W>>>,
    live: HashSet<TimerId>,
    next_id: u64,
}

impl<W> Default for TimerQueue<W> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            live: HashSet::new(),
            next_id: 0,
        }
    }
}

impl<W> TimerQueue<W> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, at: Millis, wake: W) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.live.insert(id);
        self.heap.push(Reverse(Entry { at, id, wake }));
        id
    }

    /// Returns false if the timer already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.live.remove(&id)
    }

    pub fn cancel_all(&mut self) {
        self.live.clear();
        self.heap.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Earliest instant a live wakeup is due
    pub fn next_deadline(&mut self) -> Option<Millis> {
        self.discard_cancelled();
        self.heap.peek().map(|Reverse(e)| e.at)
    }

    /// Pops the earliest wakeup due at or before `now`
    pub fn pop_due(&mut self, now: Millis) -> Option<(Millis, W)> {
        self.discard_cancelled();
        if self.heap.peek().is_some_and(|Reverse(e)| e.at <= now) {
            let Reverse(entry) = self.heap.pop()?;
            self.live.remove(&entry.id);
            return Some((entry.at, entry.wake));
        }
        None
    }

    fn discard_cancelled(&mut self) {
        while let Some(Reverse(top)) = self.heap.peek() {
            if self.live.contains(&top.id) {
                break;
            }
            self.heap.pop();
        }
    }
}
