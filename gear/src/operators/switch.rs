use super::Operator;
use crate::{log_warning, Emitter, Value};
use rustc_hash::FxHashMap;
use std::{
    cell::{Cell, RefCell},
    fmt::{self, Debug},
    hash::Hash,
    rc::Rc,
};

/// Routes items to one of several downstream values, selected by key.
///
/// The selection is level-based: whatever key was selected last receives every item until
/// another key is selected. Nothing is replayed on a change of key.
pub struct Switch<K, T> {
    selected: RefCell<Option<K>>,
    cases: FxHashMap<K, Value<T>>,
}

impl<K, T> Switch<K, T>
where
    K: Eq + Hash + Debug,
    T: Clone + 'static,
{
    /// Creates a switch over `cases`, with nothing selected.
    pub fn new(cases: impl IntoIterator<Item = (K, Value<T>)>) -> Self {
        Self {
            selected: RefCell::new(None),
            cases: cases.into_iter().collect(),
        }
    }

    /// Selects the case that receives subsequent items.
    pub fn select(&self, key: K) {
        if !self.cases.contains_key(&key) {
            log_warning(format_args!(
                "Switch has no case for key {key:?}; items will be dropped \
                 until another key is selected."
            ));
        }
        *self.selected.borrow_mut() = Some(key);
    }

    /// The currently selected key, if any.
    pub fn selected(&self) -> Option<K>
    where
        K: Clone,
    {
        self.selected.borrow().clone()
    }

    /// Delivers `item` to the selected case.
    pub fn route(&self, item: T) {
        let target = self
            .selected
            .borrow()
            .as_ref()
            .and_then(|key| self.cases.get(key))
            .cloned();
        if let Some(target) = target {
            target.flow(item);
        }
    }
}

impl<K: Debug, T> Debug for Switch<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Switch")
            .field("selected", &self.selected)
            .field("cases", &self.cases.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Forwards items only while its gate is open.
///
/// The gate is a shared cell, normally driven by a `Value<bool>`; see
/// [`Value::flow_switch`](crate::Value::flow_switch).
#[derive(Debug, Clone)]
pub struct FlowSwitch {
    open: Rc<Cell<bool>>,
}

impl FlowSwitch {
    /// Creates a gate in the given state.
    pub fn new(open: bool) -> Self {
        Self {
            open: Rc::new(Cell::new(open)),
        }
    }

    /// The shared gate state.
    pub fn state(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.open)
    }
}

impl<T: Clone + 'static> Operator<T> for FlowSwitch {
    type Output = T;

    fn apply(&self, item: T, emit: &Emitter<T>) {
        if self.open.get() {
            emit.emit(item)
        }
    }
}
