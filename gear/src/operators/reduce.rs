use super::Operator;
use crate::Emitter;
use std::{cell::RefCell, fmt};

/// A running left fold: each input is folded into the accumulator, which is then emitted.
///
/// The accumulator lives in this operator, so it is shared by every consumer of the value that
/// owns it.
pub struct Reduce<F, A> {
    reducer: F,
    state: RefCell<A>,
}

impl<F, A> Reduce<F, A> {
    /// Creates a fold starting from `identity`.
    pub fn new(reducer: F, identity: A) -> Self {
        Self {
            reducer,
            state: RefCell::new(identity),
        }
    }
}

impl<In, A, F> Operator<In> for Reduce<F, A>
where
    In: 'static,
    A: Clone + 'static,
    F: Fn(A, In) -> A + 'static,
{
    type Output = A;

    fn apply(&self, item: In, emit: &Emitter<A>) {
        // the reducer may itself trigger another emission upstream
        let accumulator = self.state.borrow().clone();
        let next = (self.reducer)(accumulator, item);
        *self.state.borrow_mut() = next.clone();
        emit.emit(next);
    }
}

impl<F, A: fmt::Debug> fmt::Debug for Reduce<F, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reduce")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
