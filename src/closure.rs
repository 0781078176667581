// Closures: a function bound to a captured context, invokable later with a
// parameter. The context, parameter and return slots are opaque
// pointer-sized words; handlers read state from wherever it lives when they
// run. The loop never interprets these words.

use core::fmt;
use core::ptr;

/// Opaque pointer-sized word used for closure context, parameters and
/// return values.
///
/// A `Value` can carry a pointer to application state
/// ([`from_mut`](Value::from_mut)) or a plain integer
/// ([`from_usize`](Value::from_usize)). Dereferencing is unsafe and typed at
/// the edge: the handler that stored the word knows what it points to.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Value(*mut ());

// Values travel inside events across the ISR/main boundary. The word itself
// is inert data; whatever it points at is only ever dereferenced by
// application handlers, which own the context discipline.
unsafe impl Send for Value {}
unsafe impl Sync for Value {}

impl Value {
    /// The null word. Closures that capture nothing use this.
    pub const fn null() -> Self {
        Value(ptr::null_mut())
    }

    pub fn is_null(self) -> bool {
        self.0.is_null()
    }

    /// Wraps a reference to application state.
    ///
    /// The referent must outlive every invocation of the closure carrying
    /// this word.
    pub fn from_mut<T>(value: &mut T) -> Self {
        Value(value as *mut T as *mut ())
    }

    /// Wraps a plain integer. Handy for small payloads such as signal
    /// parameters or discriminants.
    pub fn from_usize(value: usize) -> Self {
        Value(value as *mut ())
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Recovers the referent stored with [`from_mut`](Value::from_mut).
    ///
    /// # Safety
    ///
    /// The word must have been created from a `&mut T` whose referent is
    /// still alive, and no other reference to it may be active for the
    /// returned borrow's duration.
    pub unsafe fn deref_mut<'a, T>(self) -> &'a mut T {
        &mut *(self.0 as *mut T)
    }

    /// Shared-reference variant of [`deref_mut`](Value::deref_mut).
    ///
    /// # Safety
    ///
    /// Same as `deref_mut`, except other shared references may coexist.
    pub unsafe fn deref<'a, T>(self) -> &'a T {
        &*(self.0 as *const T)
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({:p})", self.0)
    }
}

/// Signature of a closure body. The closure itself is passed in so the body
/// can read `context` and `params` and leave data in `rv`.
pub type ClosureFn = fn(&mut Closure) -> Value;

/// A function bound to a captured context.
///
/// Closures are plain copyable values; copies invoke independently. The
/// last parameter and return value are stored on the closure after each
/// invocation.
#[derive(Clone, Copy, Debug)]
pub struct Closure {
    function: ClosureFn,
    /// Captured context, set at creation.
    pub context: Value,
    /// Parameter of the most recent invocation.
    pub params: Value,
    /// Return value of the most recent invocation.
    pub rv: Value,
    destructor: Option<ClosureFn>,
}

fn nop(_closure: &mut Closure) -> Value {
    Value::null()
}

impl Closure {
    pub fn new(function: ClosureFn, context: Value) -> Self {
        Self {
            function,
            context,
            params: Value::null(),
            rv: Value::null(),
            destructor: None,
        }
    }

    /// As [`new`](Closure::new), with a destructor run when the owning event
    /// is destroyed. The destructor receives the closure and typically tears
    /// down whatever `context` points at.
    pub fn with_destructor(function: ClosureFn, context: Value, destructor: ClosureFn) -> Self {
        Self {
            function,
            context,
            params: Value::null(),
            rv: Value::null(),
            destructor: Some(destructor),
        }
    }

    /// Invokes the closure. `params` and the returned value are stored on
    /// the closure and remain readable until the next invocation.
    pub fn invoke(&mut self, params: Value) -> Value {
        self.params = params;
        let function = self.function;
        self.rv = function(self);
        self.rv
    }

    /// Runs the destructor, if any.
    pub fn destroy(&mut self) {
        if let Some(destructor) = self.destructor {
            destructor(self);
        }
    }
}

impl Default for Closure {
    fn default() -> Self {
        Self::new(nop, Value::null())
    }
}
