// Signal relay: named events fanned out to listener lists, dispatched
// through the run-to-completion queue.
//
// Each signal id owns a listener list; emitting walks the list in
// subscription order and posts every live listener to the event queue.
// Unlistened and fired one-shot listeners stay in the list as tombstones
// until the next emit, which is the single place their node and event are
// released. No handle in the list ever refers to a recycled event.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::{NoopRawMutex, RawMutex};
use embassy_sync::blocking_mutex::Mutex;

use crate::closure::{Closure, Value};
use crate::config::SIGNAL_MAX_LISTENERS;
use crate::event::{Event, Kind};
use crate::list::{List, Node, NodeAccess};
use crate::pool::Handle;
use crate::system::{Pools, Queues};

/// Multiplexes `W` signal ids onto listener lists.
pub struct Relay<'a, const W: usize, M: RawMutex = NoopRawMutex> {
    pools: &'a Pools<M>,
    queues: &'a Queues<M>,
    vector: Mutex<M, RefCell<[List; W]>>,
}

impl<'a, const W: usize, M: RawMutex> Relay<'a, W, M> {
    pub fn new(pools: &'a Pools<M>, queues: &'a Queues<M>) -> Self {
        Self {
            pools,
            queues,
            vector: Mutex::new(RefCell::new([List::new(); W])),
        }
    }

    pub const fn width(&self) -> usize {
        W
    }

    /// Subscribes `closure` to `signal` until unlistened. Returns an opaque
    /// listener handle, or `None` on pool exhaustion.
    pub fn listen(&self, signal: usize, closure: Closure) -> Option<Handle<Event>> {
        self.subscribe(signal, closure, true)
    }

    /// Subscribes for a single delivery; the listener is pruned after it
    /// fires.
    pub fn listen_once(&self, signal: usize, closure: Closure) -> Option<Handle<Event>> {
        self.subscribe(signal, closure, false)
    }

    fn subscribe(&self, signal: usize, closure: Closure, recurring: bool) -> Option<Handle<Event>> {
        if signal >= W {
            log::warn!("relay: signal {} out of range (width {})", signal, W);
            return None;
        }
        let event = match self.pools.acquire_event() {
            Some(handle) => handle,
            None => {
                log::warn!("relay: event pool exhausted; listener dropped");
                return None;
            }
        };
        let node = match self.pools.acquire_node() {
            Some(handle) => handle,
            None => {
                self.pools.release_event(event);
                log::warn!("relay: node pool exhausted; listener dropped");
                return None;
            }
        };

        self.pools
            .put_event(event, Event::listener(signal, closure, recurring, node));
        self.pools.put_node(node, Node::new(event));

        self.vector.lock(|cell| {
            let mut lists = cell.borrow_mut();
            lists[signal].push_tail(self.pools, node);
            if lists[signal].len() > SIGNAL_MAX_LISTENERS {
                log::debug!(
                    "relay: signal {} has {} listeners",
                    signal,
                    lists[signal].len()
                );
            }
        });
        Some(event)
    }

    /// Posts every live listener of `signal` to the event queue, oldest
    /// subscriber first, with `params` stored as the listener's parameter.
    /// Dead entries encountered on the walk are unlinked and released.
    pub fn emit(&self, signal: usize, params: Value) {
        if signal >= W {
            log::warn!("relay: signal {} out of range (width {})", signal, W);
            return;
        }
        self.vector.lock(|cell| {
            let mut lists = cell.borrow_mut();
            let list = &mut lists[signal];

            let mut prev: Option<Handle<Node>> = None;
            let mut cursor = list.head();
            while let Some(node) = cursor {
                let entry = self.pools.node(node);
                let next = entry.next;
                let event = entry.event();
                let mut copy = self.pools.event(event);
                let live = matches!(copy.kind, Kind::Listener(listener) if listener.listening);
                if live {
                    copy.closure.params = params;
                    self.pools.put_event(event, copy);
                    if self.queues.push_event(event).is_err() {
                        log::warn!("relay: event queue full; delivery on signal {} dropped", signal);
                    }
                    prev = Some(node);
                } else {
                    list.unlink_after(self.pools, prev, node);
                    self.pools.release_node(node);
                    copy.destroy();
                    self.pools.release_event(event);
                }
                cursor = next;
            }
        });
    }

    /// Stops a listener. Idempotent; the entry is pruned on the next emit
    /// of its signal, and a delivery already queued is skipped by the loop.
    pub fn unlisten(&self, listener: Handle<Event>) {
        self.pools.update_event(listener, |event| {
            if let Kind::Listener(ref mut state) = event.kind {
                state.listening = false;
            }
        });
    }

    #[cfg(test)]
    fn listener_count(&self, signal: usize) -> usize {
        self.vector.lock(|cell| cell.borrow()[signal].len())
    }
}
