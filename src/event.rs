// Events: one unit of work on the loop. A tagged record embedding the
// closure to run plus kind-specific state. Events live in the shared event
// pool; timers and listeners also carry the list node that threads them
// into the scheduler's timer list or a relay's listener list, so neither
// the scheduler nor the relay ever allocates mid-operation.

use crate::closure::Closure;
use crate::list::Node;
use crate::pool::Handle;

/// Timer state. `due_time` is absolute milliseconds on the scheduler's
/// counter; a repeating timer re-fires at `due_time + period_ms` with no
/// drift against the wall clock.
#[derive(Clone, Copy, Debug)]
pub struct Timer {
    pub due_time: u32,
    pub period_ms: u16,
    pub repeating: bool,
    /// First fire on the next tick instead of one period out.
    pub immediate: bool,
    /// Reserved. There is no cancellation surface for in-flight timers yet.
    pub cancelled: bool,
    pub(crate) node: Handle<Node>,
}

/// Signal listener state.
#[derive(Clone, Copy, Debug)]
pub struct Listener {
    pub signal: usize,
    pub recurring: bool,
    /// Cleared by `unlisten` or after a one-shot listener fires; the relay
    /// prunes non-listening entries on the next emit.
    pub listening: bool,
    pub(crate) node: Handle<Node>,
}

/// What an event is, and the state that comes with it.
#[derive(Clone, Copy, Debug)]
pub enum Kind {
    Closure,
    Timer(Timer),
    Listener(Listener),
}

/// One unit of work: a closure plus the bookkeeping that says when and why
/// it runs.
#[derive(Clone, Copy, Debug)]
pub struct Event {
    pub closure: Closure,
    pub kind: Kind,
}

impl Event {
    /// A bare closure, run once on the next pass.
    pub fn closure(closure: Closure) -> Self {
        Self {
            closure,
            kind: Kind::Closure,
        }
    }

    /// A timer due at `now + period_ms`, or at `now` when `immediate`.
    ///
    /// A repeating timer with a zero period is normalized to one-shot: it
    /// would otherwise never leave the due set.
    pub fn timer(
        period_ms: u16,
        repeating: bool,
        immediate: bool,
        closure: Closure,
        now: u32,
        node: Handle<Node>,
    ) -> Self {
        let due_time = if immediate {
            now
        } else {
            now.wrapping_add(period_ms as u32)
        };
        Self {
            closure,
            kind: Kind::Timer(Timer {
                due_time,
                period_ms,
                repeating: repeating && period_ms > 0,
                immediate,
                cancelled: false,
                node,
            }),
        }
    }

    /// A listener on `signal`, live until unlistened (or until it fires,
    /// when not recurring).
    pub fn listener(signal: usize, closure: Closure, recurring: bool, node: Handle<Node>) -> Self {
        Self {
            closure,
            kind: Kind::Listener(Listener {
                signal,
                recurring,
                listening: true,
                node,
            }),
        }
    }

    /// Runs the embedded closure's destructor.
    pub fn destroy(&mut self) {
        self.closure.destroy();
    }

    /// The timer due time, for events that have one.
    pub fn due_time(&self) -> Option<u32> {
        match self.kind {
            Kind::Timer(timer) => Some(timer.due_time),
            _ => None,
        }
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::closure(Closure::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::closure::Value;

    fn nop(_closure: &mut Closure) -> Value {
        Value::null()
    }

    #[test]
    fn timer_due_time_respects_immediate() {
        let node = Handle::new(0);
        let deferred = Event::timer(300, true, false, Closure::new(nop, Value::null()), 1000, node);
        assert_eq!(deferred.due_time(), Some(1300));

        let immediate = Event::timer(300, true, true, Closure::new(nop, Value::null()), 1000, node);
        assert_eq!(immediate.due_time(), Some(1000));
    }

    #[test]
    fn zero_period_repeating_becomes_one_shot() {
        let event = Event::timer(0, true, false, Closure::default(), 0, Handle::new(0));
        match event.kind {
            Kind::Timer(timer) => assert!(!timer.repeating),
            _ => panic!("expected a timer"),
        }
    }

    #[test]
    fn listener_starts_listening() {
        let event = Event::listener(3, Closure::default(), true, Handle::new(0));
        match event.kind {
            Kind::Listener(listener) => {
                assert_eq!(listener.signal, 3);
                assert!(listener.listening);
                assert!(listener.recurring);
            }
            _ => panic!("expected a listener"),
        }
    }

    #[test]
    fn bare_closures_have_no_due_time() {
        assert_eq!(Event::closure(Closure::default()).due_time(), None);
    }
}
