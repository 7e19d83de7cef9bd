use std::time::Duration;

struct Scheduled<E> {
    due: Duration,
    seq: u64,
    event: E,
}

/// Deterministic timer queue.
///
/// Time only moves when the owner says so, which lets the run loop feed it
/// wall-clock deltas while tests step through transitions exactly. Events
/// scheduled for the same instant come out in the order they were scheduled.
pub struct Scheduler<E> {
    now: Duration,
    next_seq: u64,
    queue: Vec<Scheduled<E>>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            queue: Vec::new(),
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule(&mut self, delay: Duration, event: E) {
        self.queue.push(Scheduled {
            due: self.now + delay,
            seq: self.next_seq,
            event,
        });
        self.next_seq += 1;
    }

    /// Removes the earliest event due at or before `until` and moves the clock
    /// to its due time. Handlers may schedule follow-ups relative to that
    /// instant and still see them fire within the same `until`.
    pub fn pop_due(&mut self, until: Duration) -> Option<E> {
        let (idx, _) = self
            .queue
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due <= until)
            .min_by_key(|(_, s)| (s.due, s.seq))?;
        let scheduled = self.queue.swap_remove(idx);
        self.now = self.now.max(scheduled.due);
        Some(scheduled.event)
    }

    /// Moves the clock forward once all events up to `until` were handled.
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}
