// Top-level container: wires one pools + queues pair to a scheduler and an
// event loop, and decides on each tick whether the scheduler needs a pass.
//
// The container is a convenience; the subsystems compose by hand just as
// well. Its one piece of state is the `run_scheduler` flag an interrupt
// sets alongside the counter update, so ticks skip timer management when
// nothing moved.

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::{NoopRawMutex, RawMutex};

use crate::closure::Closure;
use crate::event::Event;
use crate::evloop::EventLoop;
use crate::pool::Handle;
use crate::scheduler::Scheduler;
use crate::system::{Pools, Queues};

/// A wired-up event loop application.
pub struct App<'a, M: RawMutex = NoopRawMutex> {
    scheduler: Scheduler<'a, M>,
    event_loop: EventLoop<'a, M>,
    queues: &'a Queues<M>,
    run_scheduler: AtomicBool,
}

impl<'a, M: RawMutex> App<'a, M> {
    /// Wires `pools` and `queues` to a fresh scheduler and loop. The same
    /// two containers may also back any number of signal relays.
    pub fn new(pools: &'a Pools<M>, queues: &'a Queues<M>) -> Self {
        Self {
            scheduler: Scheduler::new(pools, queues),
            event_loop: EventLoop::new(pools, queues),
            queues,
            run_scheduler: AtomicBool::new(true),
        }
    }

    /// Yields control to the runtime: runs the scheduler if the counter
    /// moved or timers await scheduling, then performs a run pass.
    /// Recurring timers that fall due again while the tick executes are
    /// delivered within the same tick.
    pub fn tick(&self) {
        loop {
            if self.take_scheduler_flag() || self.queues.scheduled_count() > 0 {
                self.scheduler.manage_timers();
            }
            self.event_loop.run();

            if self.queues.scheduled_count() == 0 {
                break;
            }
            self.scheduler.manage_timers();
            if self.queues.event_count() == 0 {
                break;
            }
        }
    }

    /// Feeds the scheduler a new millisecond count. Called from the
    /// periodic timer interrupt.
    pub fn update_timer(&self, now_ms: u32) {
        self.scheduler.update_timer(now_ms);
        self.run_scheduler.store(true, Ordering::Release);
    }

    /// Current millisecond count.
    pub fn now(&self) -> u32 {
        self.scheduler.now()
    }

    /// See [`Scheduler::run_later`].
    pub fn run_later(&self, delay_ms: u16, closure: Closure) -> Option<Handle<Event>> {
        self.scheduler.run_later(delay_ms, closure)
    }

    /// See [`Scheduler::run_at_intervals`].
    pub fn run_at_intervals(
        &self,
        interval_ms: u16,
        immediate: bool,
        closure: Closure,
    ) -> Option<Handle<Event>> {
        self.scheduler.run_at_intervals(interval_ms, immediate, closure)
    }

    /// See [`EventLoop::enqueue_closure`].
    pub fn enqueue_closure(&self, closure: Closure) -> Option<Handle<Event>> {
        self.event_loop.enqueue_closure(closure)
    }

    fn take_scheduler_flag(&self) -> bool {
        self.run_scheduler.swap(false, Ordering::AcqRel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::closure::Value;

    fn count_up(closure: &mut Closure) -> Value {
        let counter = unsafe { closure.context.deref_mut::<u32>() };
        *counter += 1;
        Value::null()
    }

    fn fixture() -> (Pools, Queues) {
        (Pools::new(), Queues::new())
    }

    #[test]
    fn update_timer_moves_the_counter() {
        let (pools, queues) = fixture();
        let app = App::new(&pools, &queues);

        assert_eq!(app.now(), 0);
        app.update_timer(10);
        assert_eq!(app.now(), 10);
        app.update_timer(100);
        assert_eq!(app.now(), 100);
    }

    #[test]
    fn the_scheduler_flag_follows_timer_updates() {
        let (pools, queues) = fixture();
        let app = App::new(&pools, &queues);

        // set at construction, consumed by the first tick
        assert!(app.run_scheduler.load(Ordering::Acquire));
        app.tick();
        assert!(!app.run_scheduler.load(Ordering::Acquire));

        app.update_timer(100);
        assert!(app.run_scheduler.load(Ordering::Acquire));
        app.tick();
        assert!(!app.run_scheduler.load(Ordering::Acquire));
    }

    #[test]
    fn tick_drives_all_three_kinds_of_work() {
        let (pools, queues) = fixture();
        let app = App::new(&pools, &queues);

        let mut plain = 0u32;
        let mut delayed = 0u32;
        let mut periodic = 0u32;

        app.enqueue_closure(Closure::new(count_up, Value::from_mut(&mut plain))).unwrap();
        app.run_later(100, Closure::new(count_up, Value::from_mut(&mut delayed))).unwrap();
        app.run_at_intervals(100, true, Closure::new(count_up, Value::from_mut(&mut periodic)))
            .unwrap();

        app.tick();
        assert_eq!((plain, delayed, periodic), (1, 0, 1));

        app.update_timer(50);
        app.tick();
        assert_eq!((plain, delayed, periodic), (1, 0, 1));

        app.update_timer(100);
        app.tick();
        assert_eq!((plain, delayed, periodic), (1, 1, 2));
    }

    #[test]
    fn missed_recurrences_are_delivered_in_one_tick() {
        let (pools, queues) = fixture();
        let app = App::new(&pools, &queues);

        let mut fires = 0u32;
        app.run_at_intervals(300, true, Closure::new(count_up, Value::from_mut(&mut fires)))
            .unwrap();

        app.tick();
        assert_eq!(fires, 1);

        // skip straight past two periods; both land in this tick
        app.update_timer(900);
        app.tick();
        assert_eq!(fires, 4);
    }
}
