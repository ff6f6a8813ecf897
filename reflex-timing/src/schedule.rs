use crate::Clock;
use reflex_core::Millis;
use std::time::Duration;

/// Identifies one scheduled task; never reused by a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// Delayed-task scheduler driven from a single-threaded event loop.
///
/// Nothing runs on its own: the owner calls `poll_due` from its update step
/// and receives the payloads whose deadlines have passed.
pub trait Scheduler {
    type Payload;

    fn after(&mut self, delay: Duration, payload: Self::Payload) -> TimerHandle;

    /// Returns false if the task already fired or was cancelled.
    fn cancel(&mut self, handle: TimerHandle) -> bool;

    fn poll_due(&mut self) -> Vec<Self::Payload>;

    fn pending(&self) -> usize;

    fn next_deadline(&self) -> Option<Millis>;
}

#[derive(Debug)]
struct Entry<T> {
    handle: TimerHandle,
    deadline: Millis,
    payload: T,
}

/// Deadline list polled against a `Clock`.
#[derive(Debug)]
pub struct DeadlineQueue<C: Clock, T> {
    clock: C,
    entries: Vec<Entry<T>>,
    next_handle: u64,
}

impl<C: Clock, T> DeadlineQueue<C, T> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            entries: Vec::new(),
            next_handle: 0,
        }
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }
}

impl<C: Clock, T> Scheduler for DeadlineQueue<C, T> {
    type Payload = T;

    fn after(&mut self, delay: Duration, payload: T) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        let delay_ms = Millis::try_from(delay.as_millis()).unwrap_or(Millis::MAX);
        let deadline = self.clock.now().saturating_add(delay_ms);
        self.entries.push(Entry {
            handle,
            deadline,
            payload,
        });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    fn poll_due(&mut self) -> Vec<T> {
        let now = self.clock.now();
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.entries.len() {
            if self.entries[i].deadline <= now {
                due.push(self.entries.remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|e| (e.deadline, e.handle));
        due.into_iter().map(|e| e.payload).collect()
    }

    fn pending(&self) -> usize {
        self.entries.len()
    }

    fn next_deadline(&self) -> Option<Millis> {
        self.entries.iter().map(|e| e.deadline).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ManualClock;

    #[test]
    fn fires_only_once_deadline_passes() {
        let clock = ManualClock::starting_at(0);
        let mut q = DeadlineQueue::new(clock.clone());
        q.after(Duration::from_millis(2500), "cue");
        assert_eq!(q.next_deadline(), Some(2500));

        clock.set(2499);
        assert!(q.poll_due().is_empty());
        clock.set(2500);
        assert_eq!(q.poll_due(), vec!["cue"]);
        assert_eq!(q.pending(), 0);
        assert!(q.poll_due().is_empty());
    }

    #[test]
    fn cancelled_task_never_fires() {
        let clock = ManualClock::starting_at(0);
        let mut q = DeadlineQueue::new(clock.clone());
        let h = q.after(Duration::from_millis(100), 1);
        assert!(q.is_pending(h));
        assert!(q.cancel(h));
        assert!(!q.cancel(h));
        clock.advance(1_000);
        assert!(q.poll_due().is_empty());
    }

    #[test]
    fn due_tasks_come_back_in_deadline_order() {
        let clock = ManualClock::starting_at(0);
        let mut q = DeadlineQueue::new(clock.clone());
        let a = q.after(Duration::from_millis(300), 'a');
        let b = q.after(Duration::from_millis(100), 'b');
        q.after(Duration::from_millis(200), 'c');
        assert_ne!(a, b);
        clock.set(1_000);
        assert_eq!(q.poll_due(), vec!['b', 'c', 'a']);
    }

    #[test]
    fn far_deadlines_saturate() {
        let clock = ManualClock::starting_at(Millis::MAX - 10);
        let mut q = DeadlineQueue::new(clock.clone());
        q.after(Duration::from_millis(100), ());
        q.after(Duration::MAX, ());
        assert_eq!(q.next_deadline(), Some(Millis::MAX));
        assert!(q.poll_due().is_empty());
        clock.set(Millis::MAX);
        assert_eq!(q.poll_due().len(), 2);
    }
}
