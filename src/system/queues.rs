// The system queues: ready-to-run events and ready-to-schedule timers,
// behind one lock. Both carry event handles only; the events themselves
// stay in the pool arena.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::{NoopRawMutex, RawMutex};
use embassy_sync::blocking_mutex::Mutex;

use crate::config::{EVENT_QUEUE_SIZE, SCHEDULE_QUEUE_SIZE};
use crate::event::Event;
use crate::pool::Handle;
use crate::queue::Ring;

struct Inner {
    event_queue: Ring<Handle<Event>, EVENT_QUEUE_SIZE>,
    schedule_queue: Ring<Handle<Event>, SCHEDULE_QUEUE_SIZE>,
}

/// The event queue (ready to run) and schedule queue (awaiting insertion
/// into the timer list).
pub struct Queues<M: RawMutex = NoopRawMutex> {
    inner: Mutex<M, RefCell<Inner>>,
}

impl<M: RawMutex> Queues<M> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                event_queue: Ring::new(),
                schedule_queue: Ring::new(),
            })),
        }
    }

    /// Appends to the ready-to-run queue. Hands the handle back when full.
    pub fn push_event(&self, handle: Handle<Event>) -> Result<(), Handle<Event>> {
        self.inner.lock(|inner| inner.borrow_mut().event_queue.push(handle))
    }

    pub fn pop_event(&self) -> Option<Handle<Event>> {
        self.inner.lock(|inner| inner.borrow_mut().event_queue.pop())
    }

    /// Events currently awaiting a run pass.
    pub fn event_count(&self) -> usize {
        self.inner.lock(|inner| inner.borrow().event_queue.len())
    }

    /// Appends to the schedule queue. Hands the handle back when full.
    pub fn push_scheduled(&self, handle: Handle<Event>) -> Result<(), Handle<Event>> {
        self.inner.lock(|inner| inner.borrow_mut().schedule_queue.push(handle))
    }

    pub fn pop_scheduled(&self) -> Option<Handle<Event>> {
        self.inner.lock(|inner| inner.borrow_mut().schedule_queue.pop())
    }

    /// Timer events currently awaiting insertion into the timer list.
    pub fn scheduled_count(&self) -> usize {
        self.inner.lock(|inner| inner.borrow().schedule_queue.len())
    }
}

impl<M: RawMutex> Default for Queues<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_two_queues_are_independent() {
        let queues: Queues = Queues::new();
        queues.push_event(Handle::new(1)).unwrap();
        queues.push_scheduled(Handle::new(2)).unwrap();

        assert_eq!(queues.event_count(), 1);
        assert_eq!(queues.scheduled_count(), 1);

        assert_eq!(queues.pop_event(), Some(Handle::new(1)));
        assert_eq!(queues.pop_scheduled(), Some(Handle::new(2)));
        assert_eq!(queues.pop_event(), None);
        assert_eq!(queues.pop_scheduled(), None);
    }
}
