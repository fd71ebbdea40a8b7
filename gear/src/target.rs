//! Write-once sinks that connect a [`Value`] to an external side effect.

use crate::{error::BindError, Subscription, Value};
use std::{cell::RefCell, fmt, rc::Rc};

/// A binding point that accepts exactly one [`Value`] for its whole lifetime.
///
/// Once bound, every item of the value is handed to the target's consumer. Dropping the target
/// detaches it.
///
/// ```rust
/// use gear::{BindError, Target, Value};
/// use std::{cell::Cell, rc::Rc};
///
/// let last = Rc::new(Cell::new(0));
/// let target = Target::new({
///     let last = Rc::clone(&last);
///     move |x| last.set(x)
/// });
///
/// let value = Value::default();
/// target.bind(value.clone()).unwrap();
/// value.flow(7);
/// assert_eq!(last.get(), 7);
///
/// assert_eq!(target.bind(Value::default()), Err(BindError::AlreadyBound));
/// assert_eq!(target.unbind(), Err(BindError::NeverUnbound));
/// ```
pub struct Target<T> {
    consumer: Rc<dyn Fn(T)>,
    binding: RefCell<Option<Binding<T>>>,
}

struct Binding<T> {
    value: Value<T>,
    _subscription: Subscription,
}

impl<T> fmt::Debug for Target<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("type", &std::any::type_name::<T>())
            .field("bound", &self.is_bound())
            .finish()
    }
}

impl<T> Target<T> {
    /// Whether a value has been bound.
    pub fn is_bound(&self) -> bool {
        self.binding.borrow().is_some()
    }
}

impl<T: Clone + 'static> Target<T> {
    /// Creates an unbound target around `consumer`.
    pub fn new(consumer: impl Fn(T) + 'static) -> Self {
        Self {
            consumer: Rc::new(consumer),
            binding: RefCell::new(None),
        }
    }

    /// The bound value, if any.
    pub fn value(&self) -> Option<Value<T>> {
        self.binding
            .borrow()
            .as_ref()
            .map(|binding| binding.value.clone())
    }

    /// Sets the bound value.
    ///
    /// The first `Some` binds the target and attaches its consumer. Setting `None` before that is
    /// a no-op. After binding, any further call fails: with [`BindError::AlreadyBound`] for
    /// `Some`, and [`BindError::NeverUnbound`] for `None`.
    pub fn set_value(&self, value: Option<Value<T>>) -> Result<(), BindError> {
        let mut binding = self.binding.borrow_mut();
        match (binding.is_some(), value) {
            (true, Some(_)) => Err(BindError::AlreadyBound),
            (true, None) => Err(BindError::NeverUnbound),
            (false, None) => Ok(()),
            (false, Some(value)) => {
                let consumer = Rc::clone(&self.consumer);
                let subscription = value.attach(move |item| consumer(item));
                *binding = Some(Binding {
                    value,
                    _subscription: subscription,
                });
                Ok(())
            }
        }
    }

    /// Binds `value`. Equivalent to `set_value(Some(value))`.
    pub fn bind(&self, value: Value<T>) -> Result<(), BindError> {
        self.set_value(Some(value))
    }

    /// Tries to clear the binding. Equivalent to `set_value(None)`.
    pub fn unbind(&self) -> Result<(), BindError> {
        self.set_value(None)
    }
}
