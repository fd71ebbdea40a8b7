//! A push-based reactive dataflow engine.
//!
//! The engine is built from four kinds of pieces:
//! 1. **Values**: multicast streams of discrete events. Pushing an item into a [`Value`] delivers
//!    it, synchronously and in registration order, to every consumer attached at that moment.
//! 2. **Operators**: typed transformations that derive a new `Value` from an existing one
//!    ([`map`](Value::map), [`filter`](Value::filter), [`reduce`](Value::reduce),
//!    [`later`](Value::later), [`switch`](Value::switch), ...).
//! 3. **Sources and targets**: lazy adapters at the edges of the graph. A [`Source`] turns an
//!    external event slot into a `Value` the first time it is needed; a [`Target`] binds a
//!    `Value` to an external side effect, exactly once.
//! 4. **Dragging**: a pointer-gesture state machine ([`drag`]) whose output is itself a `Value`.
//!
//! ```rust
//! use gear::Value;
//! use std::{cell::RefCell, rc::Rc};
//!
//! let src = Value::<i32>::default();
//! let mapped = src.map(|x| x * 2);
//!
//! let results = Rc::new(RefCell::new(Vec::new()));
//! let subscription = mapped.attach({
//!     let results = Rc::clone(&results);
//!     move |x| results.borrow_mut().push(x)
//! });
//!
//! src.flow(3);
//! src.flow(5);
//! assert_eq!(*results.borrow(), [6, 10]);
//!
//! // detaching stops delivery
//! subscription.cancel();
//! src.flow(7);
//! assert_eq!(*results.borrow(), [6, 10]);
//! ```
//!
//! ## Design Principles and Assumptions
//! - **Push, don't pull.** Nothing is recomputed on read. Every emission runs its entire
//!   downstream chain to completion on the calling stack.
//! - **Single-threaded.** Values are `!Send`. All shared state lives behind `Rc`/`RefCell`, and no
//!   internal borrow is held while user code runs, so consumers may attach to or flow into the
//!   value that is currently emitting.
//! - **Explicit deferral.** Only [`defaults_to`](Value::defaults_to), [`later`](Value::later) and
//!   [`repeater`](Value::repeater) step outside the current call stack. They schedule their work
//!   through [`gear_spawner::Executor`], which must be initialized once by the host.
//! - **Ownership flows upstream.** A derived value keeps its upstream values alive; upstream values
//!   only hold weak [`Emitter`]s to their downstreams. Dropping the last handle to a derived value
//!   detaches it.

#![deny(missing_docs)]
#![forbid(unsafe_code)]

use std::fmt::Arguments;

pub mod drag;
pub mod error;
pub mod operators;
pub mod source;
pub mod target;
pub mod value;

pub use error::{required, BindError, MissingResource};
pub use source::{HandlerSlots, Source};
pub use target::Target;
pub use value::{Emitter, Subscription, Value, ValueStream};

/// Reexports frequently-used types.
pub mod prelude {
    pub use crate::{
        drag::{DraggingHandler, Modifiers, PointerPosition},
        operators::Operator,
        Emitter, Source, Subscription, Target, Value,
    };
}

/// Reports a non-fatal wiring problem.
///
/// Goes through `tracing` when that feature is enabled, the browser console on the web, and
/// standard error everywhere else.
#[allow(unused)]
#[doc(hidden)]
pub fn log_warning(text: Arguments) {
    #[cfg(feature = "tracing")]
    {
        tracing::warn!(text);
    }
    #[cfg(all(
        not(feature = "tracing"),
        target_arch = "wasm32",
        target_os = "unknown"
    ))]
    {
        web_sys::console::warn_1(&text.to_string().into());
    }
    #[cfg(all(
        not(feature = "tracing"),
        not(all(target_arch = "wasm32", target_os = "unknown"))
    ))]
    {
        eprintln!("{}", text);
    }
}
