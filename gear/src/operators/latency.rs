use super::Operator;
use crate::Emitter;
use gear_spawner::Executor;
use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    fmt, mem,
    rc::Rc,
};

/// Defers every item to the next turn of the executor.
///
/// Items are queued in arrival order and drained by a single task, so a burst of synchronous
/// emissions is delivered in order, in one later turn. Items that arrive while a batch is being
/// delivered wait for the turn after that, so a consumer feeding back into its own upstream
/// advances one step per turn.
pub struct Latency<T> {
    queue: Rc<RefCell<VecDeque<T>>>,
    scheduled: Rc<Cell<bool>>,
}

impl<T> Latency<T> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            queue: Default::default(),
            scheduled: Default::default(),
        }
    }

    /// The number of items waiting to be delivered.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }
}

impl<T> Default for Latency<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> Operator<T> for Latency<T> {
    type Output = T;

    fn apply(&self, item: T, emit: &Emitter<T>) {
        self.queue.borrow_mut().push_back(item);
        if self.scheduled.replace(true) {
            return;
        }
        let queue = Rc::clone(&self.queue);
        let scheduled = Rc::clone(&self.scheduled);
        let emit = emit.clone();
        Executor::spawn_local(async move {
            let batch = mem::take(&mut *queue.borrow_mut());
            // anything emitted from here on schedules its own task
            scheduled.set(false);
            for item in batch {
                emit.emit(item);
            }
        });
    }
}

impl<T> fmt::Debug for Latency<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Latency")
            .field("pending", &self.pending())
            .field("scheduled", &self.scheduled.get())
            .finish()
    }
}
