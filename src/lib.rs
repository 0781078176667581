//! picoloop: statically-allocated cooperative event loop for single-core
//! microcontrollers.
//!
//! No heap, no preemption: application code posts closures that run to
//! completion on one foreground context, schedules them for later or at
//! repeating intervals, and fans out named signals to listeners through
//! the same queue.
//!
//! - `queue`:     fixed-capacity circular FIFO of handles
//! - `pool`:      pre-allocated object slots with a free-handle queue
//! - `list`:      arena-linked lists (timer list, listener lists)
//! - `closure`:   function + captured context, invokable with a parameter
//! - `event`:     one unit of work: closure, timer or signal listener
//! - `system`:    the shared pools and queues, lock-bracketed
//! - `scheduler`: ms counter + due-sorted timer list
//! - `evloop`:    snapshot-draining run-to-completion loop
//! - `signal`:    publish/subscribe relay over the loop
//! - `app`:       container wiring the above, ticked from the main loop
//!
//! Cross-context locking is chosen by the `RawMutex` type parameter on the
//! shared containers: the default `NoopRawMutex` costs nothing on a single
//! context, `CriticalSectionRawMutex` makes the enqueue/schedule API safe
//! to call from interrupts.
//!
//! ```
//! use core::sync::atomic::{AtomicU32, Ordering};
//!
//! use picoloop::system::{Pools, Queues};
//! use picoloop::{App, Closure, Value};
//!
//! static BLINKS: AtomicU32 = AtomicU32::new(0);
//!
//! fn blink(_closure: &mut Closure) -> Value {
//!     BLINKS.fetch_add(1, Ordering::Relaxed);
//!     Value::null()
//! }
//!
//! let pools: Pools = Pools::new();
//! let queues: Queues = Queues::new();
//! let app = App::new(&pools, &queues);
//!
//! app.run_at_intervals(500, true, Closure::new(blink, Value::null())).unwrap();
//! app.tick(); // first fire, immediately
//!
//! app.update_timer(500); // normally done by the timer interrupt
//! app.tick(); // second fire
//! assert_eq!(BLINKS.load(Ordering::Relaxed), 2);
//! ```

#![cfg_attr(not(test), no_std)]

pub mod app;
pub mod closure;
pub mod config;
pub mod event;
pub mod evloop;
pub mod list;
pub mod pool;
pub mod queue;
pub mod scheduler;
pub mod signal;
pub mod system;

pub use app::App;
pub use closure::{Closure, Value};
pub use signal::Relay;
