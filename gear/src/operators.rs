//! The typed combinators that derive one [`Value`](crate::Value) from another.
//!
//! Every combinator method on `Value` is a thin wrapper around one of the operators in this
//! module and [`Value::pipe`](crate::Value::pipe). Stateful operators hold their state
//! explicitly, so each derived value owns exactly the state it needs and nothing else.
//!
//! Custom operators implement [`Operator`] directly.

use crate::Emitter;
use std::{fmt, marker::PhantomData};

mod latency;
mod reduce;
mod repeater;
mod switch;

pub use latency::Latency;
pub use reduce::Reduce;
pub use repeater::Repeater;
pub use switch::{FlowSwitch, Switch};

/// A transformation applied to every item of an upstream value.
pub trait Operator<In>: 'static {
    /// The type of item this operator emits.
    type Output: Clone + 'static;

    /// Handles one upstream item, emitting zero or more results through `emit`.
    fn apply(&self, item: In, emit: &Emitter<Self::Output>);
}

/// Runs a general effect that may emit any number of results per item.
pub struct Then<F, Out> {
    effect: F,
    ty: PhantomData<fn() -> Out>,
}

impl<F, Out> Then<F, Out> {
    /// Wraps `effect`.
    pub fn new(effect: F) -> Self {
        Self {
            effect,
            ty: PhantomData,
        }
    }
}

impl<In, Out, F> Operator<In> for Then<F, Out>
where
    In: 'static,
    Out: Clone + 'static,
    F: Fn(In, &Emitter<Out>) + 'static,
{
    type Output = Out;

    fn apply(&self, item: In, emit: &Emitter<Out>) {
        (self.effect)(item, emit)
    }
}

impl<F, Out> fmt::Debug for Then<F, Out> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Then").finish_non_exhaustive()
    }
}

/// Emits exactly one transformed item per input.
pub struct Map<F, Out> {
    f: F,
    ty: PhantomData<fn() -> Out>,
}

impl<F, Out> Map<F, Out> {
    /// Wraps `f`.
    pub fn new(f: F) -> Self {
        Self { f, ty: PhantomData }
    }
}

impl<In, Out, F> Operator<In> for Map<F, Out>
where
    In: 'static,
    Out: Clone + 'static,
    F: Fn(In) -> Out + 'static,
{
    type Output = Out;

    fn apply(&self, item: In, emit: &Emitter<Out>) {
        emit.emit((self.f)(item))
    }
}

impl<F, Out> fmt::Debug for Map<F, Out> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Map").finish_non_exhaustive()
    }
}

/// Drops items that do not match a predicate.
pub struct Filter<F> {
    predicate: F,
}

impl<F> Filter<F> {
    /// Wraps `predicate`.
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<In, F> Operator<In> for Filter<F>
where
    In: Clone + 'static,
    F: Fn(&In) -> bool + 'static,
{
    type Output = In;

    fn apply(&self, item: In, emit: &Emitter<In>) {
        if (self.predicate)(&item) {
            emit.emit(item)
        }
    }
}

impl<F> fmt::Debug for Filter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::Operator;
    use crate::{Emitter, Value};
    use std::{cell::RefCell, rc::Rc};

    /// Emits running pairs of the previous and current item.
    struct Pairwise<T>(RefCell<Option<T>>);

    impl<T: Clone + 'static> Operator<T> for Pairwise<T> {
        type Output = (T, T);

        fn apply(&self, item: T, emit: &Emitter<(T, T)>) {
            let previous = self.0.replace(Some(item.clone()));
            if let Some(previous) = previous {
                emit.emit((previous, item));
            }
        }
    }

    #[test]
    fn custom_operators_plug_into_pipe() {
        let src = Value::<i32>::default();
        let pairs = src.pipe(Pairwise(RefCell::new(None)));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _sub = pairs.attach({
            let seen = Rc::clone(&seen);
            move |pair| seen.borrow_mut().push(pair)
        });

        for x in [1, 2, 4] {
            src.flow(x);
        }
        assert_eq!(*seen.borrow(), [(1, 2), (2, 4)]);
    }
}
