// The system pools: one for events, one for list nodes, behind one lock.
//
// Subsystems copy events out, operate, and copy back; no lock or borrow is
// ever held while application code runs. The pools are the only place event
// and node contents live; handles everywhere else are indices into these
// arenas.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::{NoopRawMutex, RawMutex};
use embassy_sync::blocking_mutex::Mutex;

use crate::config::{EVENT_POOL_SIZE, NODE_POOL_SIZE};
use crate::event::Event;
use crate::list::{Node, NodeAccess};
use crate::pool::{Handle, Pool};

struct Inner {
    events: Pool<Event, EVENT_POOL_SIZE>,
    nodes: Pool<Node, NODE_POOL_SIZE>,
}

/// The event pool and node pool shared by scheduler, loop and relays.
pub struct Pools<M: RawMutex = NoopRawMutex> {
    inner: Mutex<M, RefCell<Inner>>,
}

impl<M: RawMutex> Pools<M> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                events: Pool::new(),
                nodes: Pool::new(),
            })),
        }
    }

    pub fn acquire_event(&self) -> Option<Handle<Event>> {
        self.inner.lock(|inner| inner.borrow_mut().events.acquire())
    }

    pub fn release_event(&self, handle: Handle<Event>) -> bool {
        self.inner.lock(|inner| inner.borrow_mut().events.release(handle))
    }

    /// Copies an event out of the arena.
    pub fn event(&self, handle: Handle<Event>) -> Event {
        self.inner.lock(|inner| inner.borrow().events.get(handle))
    }

    /// Copies an event into the arena.
    pub fn put_event(&self, handle: Handle<Event>, event: Event) {
        self.inner.lock(|inner| inner.borrow_mut().events.set(handle, event))
    }

    /// Edits an event in place, under the lock. The editor must not call
    /// back into the system containers.
    pub fn update_event<R>(&self, handle: Handle<Event>, edit: impl FnOnce(&mut Event) -> R) -> R {
        self.inner.lock(|inner| {
            let mut inner = inner.borrow_mut();
            let mut event = inner.events.get(handle);
            let result = edit(&mut event);
            inner.events.set(handle, event);
            result
        })
    }

    pub fn acquire_node(&self) -> Option<Handle<Node>> {
        self.inner.lock(|inner| inner.borrow_mut().nodes.acquire())
    }

    pub fn release_node(&self, handle: Handle<Node>) -> bool {
        self.inner.lock(|inner| inner.borrow_mut().nodes.release(handle))
    }

    pub fn event_pool_is_empty(&self) -> bool {
        self.inner.lock(|inner| inner.borrow().events.is_empty())
    }

    pub fn available_events(&self) -> usize {
        self.inner.lock(|inner| inner.borrow().events.available())
    }

    pub fn available_nodes(&self) -> usize {
        self.inner.lock(|inner| inner.borrow().nodes.available())
    }
}

impl<M: RawMutex> NodeAccess for Pools<M> {
    fn node(&self, handle: Handle<Node>) -> Node {
        self.inner.lock(|inner| inner.borrow().nodes.get(handle))
    }

    fn put_node(&self, handle: Handle<Node>, node: Node) {
        self.inner.lock(|inner| inner.borrow_mut().nodes.set(handle, node))
    }
}

impl<M: RawMutex> Default for Pools<M> {
    fn default() -> Self {
        Self::new()
    }
}
