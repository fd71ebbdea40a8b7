//! The ordered set of consumers attached to a [`Value`](crate::Value).
//!
//! This is a linear list built on a `Vec<_>`, on the assumption that fan-out is usually small.
//! Emission walks a snapshot of the list, so consumers can be attached or removed while an
//! emission is in progress without invalidating it.

use std::{cell::Cell, fmt::Debug, rc::Rc};

pub(crate) struct ConsumerEntry<T> {
    id: u64,
    active: Cell<bool>,
    delivered: Cell<bool>,
    callback: Box<dyn Fn(T)>,
}

impl<T> ConsumerEntry<T> {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Whether this consumer has observed at least one item.
    pub fn has_delivered(&self) -> bool {
        self.delivered.get()
    }

    pub fn deactivate(&self) {
        self.active.set(false);
    }

    pub fn deliver(&self, item: T) {
        if self.active.get() {
            self.delivered.set(true);
            (self.callback)(item);
        }
    }
}

impl<T> Debug for ConsumerEntry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsumerEntry")
            .field("id", &self.id)
            .field("active", &self.active.get())
            .finish()
    }
}

pub(crate) struct ConsumerSet<T> {
    next_id: u64,
    entries: Vec<Rc<ConsumerEntry<T>>>,
}

impl<T> Default for ConsumerSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ConsumerSet<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::with_capacity(2),
        }
    }

    pub fn insert(&mut self, callback: Box<dyn Fn(T)>) -> Rc<ConsumerEntry<T>> {
        let entry = Rc::new(ConsumerEntry {
            id: self.next_id,
            active: Cell::new(true),
            delivered: Cell::new(false),
            callback,
        });
        self.next_id += 1;
        self.entries.push(Rc::clone(&entry));
        entry
    }

    pub fn remove(&mut self, id: u64) {
        if let Some(pos) = self.entries.iter().position(|e| e.id == id) {
            // `.remove()` rather than `.swap_remove()`: delivery order is registration order
            self.entries.remove(pos);
        }
    }

    pub fn snapshot(&self) -> Vec<Rc<ConsumerEntry<T>>> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::ConsumerSet;
    use std::{cell::RefCell, rc::Rc};

    #[test]
    fn removal_keeps_registration_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut set = ConsumerSet::new();
        let ids: Vec<u64> = (0..4)
            .map(|n| {
                let seen = Rc::clone(&seen);
                set.insert(Box::new(move |x: i32| {
                    seen.borrow_mut().push((n, x))
                }))
                .id()
            })
            .collect();

        set.remove(ids[1]);
        assert_eq!(set.len(), 3);
        for entry in set.snapshot() {
            entry.deliver(7);
        }
        assert_eq!(*seen.borrow(), [(0, 7), (2, 7), (3, 7)]);
    }

    #[test]
    fn inactive_entries_are_skipped() {
        let count = Rc::new(RefCell::new(0));
        let mut set = ConsumerSet::new();
        let entry = set.insert(Box::new({
            let count = Rc::clone(&count);
            move |_: ()| *count.borrow_mut() += 1
        }));
        let snapshot = set.snapshot();
        entry.deactivate();
        for entry in snapshot {
            entry.deliver(());
        }
        assert_eq!(*count.borrow(), 0);
        assert!(!entry.has_delivered());
    }
}
