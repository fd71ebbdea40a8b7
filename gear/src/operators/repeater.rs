use super::Operator;
use crate::Emitter;
use gear_spawner::Executor;
use std::{cell::Cell, fmt, rc::Rc, time::Duration};

/// Forwards each item, then keeps re-emitting it on an interval until the next item arrives.
///
/// An item equal to the `rest` value is forwarded once and never repeated; this is how a
/// continuous input (a held key, a pressed button) is switched off.
pub struct Repeater<T> {
    interval: Duration,
    rest: T,
    generation: Rc<Cell<u64>>,
}

impl<T> Repeater<T> {
    /// Creates a repeater that fires every `interval` unless the latest item equals `rest`.
    pub fn new(interval: Duration, rest: T) -> Self {
        Self {
            interval,
            rest,
            generation: Default::default(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Operator<T> for Repeater<T> {
    type Output = T;

    fn apply(&self, item: T, emit: &Emitter<T>) {
        let generation = self.generation.get().wrapping_add(1);
        self.generation.set(generation);
        emit.emit(item.clone());
        if item == self.rest {
            return;
        }

        let current = Rc::clone(&self.generation);
        let interval = self.interval;
        let emit = emit.clone();
        Executor::spawn_local(async move {
            loop {
                Executor::sleep(interval).await;
                if current.get() != generation || !emit.is_live() {
                    break;
                }
                emit.emit(item.clone());
            }
        });
    }
}

impl<T: fmt::Debug> fmt::Debug for Repeater<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repeater")
            .field("interval", &self.interval)
            .field("rest", &self.rest)
            .finish_non_exhaustive()
    }
}
