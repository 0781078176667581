// Shared containers: the two pools and two queues every subsystem borrows.
// All access is bracketed by the lock chosen through the `RawMutex`
// parameter, so the enqueue/schedule API stays callable from interrupt
// context when a real critical-section lock is selected.

pub mod pools;
pub mod queues;

pub use pools::Pools;
pub use queues::Queues;
