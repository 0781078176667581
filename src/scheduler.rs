// Timer scheduler: a millisecond counter fed by a periodic interrupt and a
// due-sorted list of pending timers.
//
// The counter update is a single atomic store so the interrupt stays cheap;
// all list work happens on the main context inside `manage_timers`. Timers
// arrive through the schedule queue carrying their own list node, so
// draining the queue can never fail on allocation.

use core::cell::RefCell;
use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::{NoopRawMutex, RawMutex};
use embassy_sync::blocking_mutex::Mutex;

use crate::closure::Closure;
use crate::event::{Event, Kind};
use crate::list::{List, Node, NodeAccess};
use crate::pool::Handle;
use crate::system::{Pools, Queues};

/// Owns the wall-clock counter and the due-time-sorted timer list.
pub struct Scheduler<'a, M: RawMutex = NoopRawMutex> {
    pools: &'a Pools<M>,
    queues: &'a Queues<M>,
    timer: AtomicU32,
    timer_list: Mutex<M, RefCell<List>>,
}

impl<'a, M: RawMutex> Scheduler<'a, M> {
    pub fn new(pools: &'a Pools<M>, queues: &'a Queues<M>) -> Self {
        Self {
            pools,
            queues,
            timer: AtomicU32::new(0),
            timer_list: Mutex::new(RefCell::new(List::new())),
        }
    }

    /// Sets the counter to the new millisecond count. Called from the
    /// periodic timer interrupt; does not touch the timer list.
    pub fn update_timer(&self, now_ms: u32) {
        self.timer.store(now_ms, Ordering::Release);
    }

    /// Current counter value.
    pub fn now(&self) -> u32 {
        self.timer.load(Ordering::Acquire)
    }

    /// Runs `closure` once, `delay_ms` from now. Returns the event handle,
    /// or `None` when a pool or the schedule queue is exhausted.
    pub fn run_later(&self, delay_ms: u16, closure: Closure) -> Option<Handle<Event>> {
        self.schedule(delay_ms, false, false, closure)
    }

    /// Runs `closure` every `interval_ms`. With `immediate` the first fire
    /// happens on the next pass; otherwise one interval out. The event is
    /// kept alive and re-scheduled after each fire.
    pub fn run_at_intervals(
        &self,
        interval_ms: u16,
        immediate: bool,
        closure: Closure,
    ) -> Option<Handle<Event>> {
        self.schedule(interval_ms, true, immediate, closure)
    }

    fn schedule(
        &self,
        period_ms: u16,
        repeating: bool,
        immediate: bool,
        closure: Closure,
    ) -> Option<Handle<Event>> {
        let event = match self.pools.acquire_event() {
            Some(handle) => handle,
            None => {
                log::warn!("sched: event pool exhausted; timer dropped");
                return None;
            }
        };
        let node = match self.pools.acquire_node() {
            Some(handle) => handle,
            None => {
                self.pools.release_event(event);
                log::warn!("sched: node pool exhausted; timer dropped");
                return None;
            }
        };

        self.pools.put_event(
            event,
            Event::timer(period_ms, repeating, immediate, closure, self.now(), node),
        );

        // An immediate timer skips the timer list entirely on its first
        // fire; it reaches the list once the loop re-schedules it.
        let pushed = if immediate {
            self.queues.push_event(event)
        } else {
            self.queues.push_scheduled(event)
        };
        if pushed.is_err() {
            self.pools.release_node(node);
            self.pools.release_event(event);
            log::warn!("sched: queue full; timer dropped");
            return None;
        }
        Some(event)
    }

    /// Main-context pass: drains the schedule queue into the sorted timer
    /// list, then releases every due timer into the event queue.
    pub fn manage_timers(&self) {
        self.timer_list.lock(|cell| {
            let mut list = cell.borrow_mut();

            while let Some(event) = self.queues.pop_scheduled() {
                let (due, node) = match self.pools.event(event).kind {
                    Kind::Timer(timer) => (timer.due_time, timer.node),
                    _ => {
                        // only timers travel the schedule queue
                        debug_assert!(false, "non-timer event in the schedule queue");
                        continue;
                    }
                };
                self.pools.put_node(node, Node::new(event));
                // first strictly-later entry; equal due times keep
                // insertion order
                list.insert_when(self.pools, node, |other| {
                    self.pools
                        .event(other)
                        .due_time()
                        .map_or(false, |other_due| other_due > due)
                });
            }

            let now = self.now();
            loop {
                let Some(head) = list.head() else { break };
                let event = self.pools.node(head).event();
                let due = self.pools.event(event).due_time().unwrap_or(0);
                if due > now {
                    break;
                }
                if self.queues.push_event(event).is_err() {
                    log::warn!(
                        "sched: event queue full; {} due timer(s) wait for the next pass",
                        list.len()
                    );
                    break;
                }
                list.pop_head(self.pools);
            }
        });
    }

    #[cfg(test)]
    fn due_times(&self) -> Vec<u32> {
        self.timer_list.lock(|cell| {
            let list = cell.borrow();
            let mut out = Vec::new();
            list.for_each(self.pools, |event| {
                out.push(self.pools.event(event).due_time().unwrap());
            });
            out
        })
    }
}
