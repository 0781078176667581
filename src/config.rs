// Central repository of compile-time sizing. Edit in place as needed.
//
// Sizes are given in log2 form because the ring buffers backing pools and
// queues require power-of-two capacities (index arithmetic is bit-masked).

/// Event pool size in log2 form. Defaults to 128 events.
pub const EVENT_POOL_SIZE_LOG2: usize = 7;

/// Linked-list node pool size in log2 form. Defaults to 128 nodes.
pub const NODE_POOL_SIZE_LOG2: usize = 7;

/// Event queue (ready-to-run) size in log2 form. Defaults to 32 slots.
pub const EVENT_QUEUE_SIZE_LOG2: usize = 5;

/// Schedule queue (ready-to-schedule) size in log2 form. Defaults to 16 slots.
pub const SCHEDULE_QUEUE_SIZE_LOG2: usize = 4;

/// Advisory ceiling on listeners attached to a single signal. Exceeding it
/// is not an error; the relay logs an advisory so runaway subscription is
/// visible during bring-up.
pub const SIGNAL_MAX_LISTENERS: usize = 5;

pub const EVENT_POOL_SIZE: usize = 1 << EVENT_POOL_SIZE_LOG2;
pub const NODE_POOL_SIZE: usize = 1 << NODE_POOL_SIZE_LOG2;
pub const EVENT_QUEUE_SIZE: usize = 1 << EVENT_QUEUE_SIZE_LOG2;
pub const SCHEDULE_QUEUE_SIZE: usize = 1 << SCHEDULE_QUEUE_SIZE_LOG2;
