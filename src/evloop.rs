// The run-to-completion loop. Each pass drains the snapshot of events
// present at entry: work enqueued by a running closure waits for the next
// pass, which bounds the latency of everything already queued.
//
// Events are copied out of the arena before their closure runs, so no lock
// is held while application code executes and handlers are free to call
// back into the enqueue/schedule API.

use embassy_sync::blocking_mutex::raw::{NoopRawMutex, RawMutex};

use crate::closure::Closure;
use crate::event::{Event, Kind};
use crate::list::Node;
use crate::pool::Handle;
use crate::system::{Pools, Queues};

/// Drains the event queue and runs, recycles or re-schedules each event.
pub struct EventLoop<'a, M: RawMutex = NoopRawMutex> {
    pools: &'a Pools<M>,
    queues: &'a Queues<M>,
}

impl<'a, M: RawMutex> EventLoop<'a, M> {
    pub fn new(pools: &'a Pools<M>, queues: &'a Queues<M>) -> Self {
        Self { pools, queues }
    }

    /// Posts a closure for execution on the next pass. Returns the event
    /// handle, or `None` when the event pool or queue is exhausted.
    pub fn enqueue_closure(&self, closure: Closure) -> Option<Handle<Event>> {
        let handle = match self.pools.acquire_event() {
            Some(handle) => handle,
            None => {
                log::warn!("loop: event pool exhausted; closure dropped");
                return None;
            }
        };
        self.pools.put_event(handle, Event::closure(closure));
        if self.queues.push_event(handle).is_err() {
            self.pools.release_event(handle);
            log::warn!("loop: event queue full; closure dropped");
            return None;
        }
        Some(handle)
    }

    /// One pass: pops exactly the number of events queued at entry and
    /// dispatches each.
    pub fn run(&self) {
        let snapshot = self.queues.event_count();
        for _ in 0..snapshot {
            let Some(handle) = self.queues.pop_event() else { break };
            self.dispatch(handle);
        }
    }

    // Closures are invoked with their stored params slot: null for plain
    // closures and timers, the delivery value for listeners (written in by
    // `Relay::emit`). Handlers reach their state through the captured
    // context.
    fn dispatch(&self, handle: Handle<Event>) {
        let mut event = self.pools.event(handle);
        match event.kind {
            Kind::Closure => {
                let params = event.closure.params;
                event.closure.invoke(params);
                self.recycle(handle, event, None);
            }
            Kind::Timer(mut timer) => {
                let params = event.closure.params;
                event.closure.invoke(params);
                if timer.repeating {
                    // next fire keyed off the previous due time, not the
                    // clock, so late passes don't accumulate drift
                    timer.due_time = timer.due_time.wrapping_add(timer.period_ms as u32);
                    event.kind = Kind::Timer(timer);
                    self.pools.put_event(handle, event);
                    if self.queues.push_scheduled(handle).is_err() {
                        log::warn!("loop: schedule queue full; repeating timer dropped");
                        self.recycle(handle, event, Some(timer.node));
                    }
                } else {
                    self.recycle(handle, event, Some(timer.node));
                }
            }
            Kind::Listener(mut listener) => {
                if !listener.listening {
                    // unlistened while queued; the relay prunes the node on
                    // the next emit
                    return;
                }
                let params = event.closure.params;
                event.closure.invoke(params);
                if !listener.recurring {
                    listener.listening = false;
                    event.kind = Kind::Listener(listener);
                }
                self.pools.put_event(handle, event);
            }
        }
    }

    fn recycle(&self, handle: Handle<Event>, mut event: Event, node: Option<Handle<Node>>) {
        if let Some(node) = node {
            self.pools.release_node(node);
        }
        event.destroy();
        self.pools.release_event(handle);
    }
}
