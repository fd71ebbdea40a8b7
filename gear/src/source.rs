//! Lazy adapters from external event producers to [`Value`]s.

use crate::{Emitter, Value};
use std::{
    cell::{OnceCell, RefCell},
    fmt,
    rc::Rc,
};

/// A host object with assignable event-handler slots, such as an element's `onpointerdown`.
///
/// Assigning a handler replaces whatever the slot held before.
pub trait HandlerSlots<K, E> {
    /// Stores `handler` in the slot named by `key`.
    fn set_handler(&self, key: K, handler: Box<dyn Fn(E)>);
}

impl<K, E, H> HandlerSlots<K, E> for Rc<H>
where
    H: HandlerSlots<K, E> + ?Sized,
{
    fn set_handler(&self, key: K, handler: Box<dyn Fn(E)>) {
        (**self).set_handler(key, handler)
    }
}

/// A lazily-created, memoized [`Value`].
///
/// Nothing is wired up until [`value`](Source::value) is first read; from then on every read
/// returns the same value. Clones share that memo.
pub struct Source<T> {
    inner: Rc<SourceInner<T>>,
}

struct SourceInner<T> {
    factory: RefCell<Option<Box<dyn FnOnce() -> Value<T>>>>,
    value: OnceCell<Value<T>>,
}

impl<T> Clone for Source<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Source<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("type", &std::any::type_name::<T>())
            .field("realized", &self.is_realized())
            .finish()
    }
}

impl<T> Source<T> {
    /// Whether the underlying value has been created yet.
    pub fn is_realized(&self) -> bool {
        self.inner.value.get().is_some()
    }
}

impl<T: Clone + 'static> Source<T> {
    /// Wraps a producer that is handed the value's [`Emitter`] on first access.
    pub fn new(producer: impl FnOnce(Emitter<T>) + 'static) -> Self {
        Self::lazy(move || Value::new(producer))
    }

    /// Wraps a factory that builds the value on first access.
    pub fn lazy(factory: impl FnOnce() -> Value<T> + 'static) -> Self {
        Self {
            inner: Rc::new(SourceInner {
                factory: RefCell::new(Some(Box::new(factory))),
                value: OnceCell::new(),
            }),
        }
    }

    /// Binds a host's event slot, passing events through unchanged.
    pub fn from_event<H, K>(host: H, key: K) -> Self
    where
        H: HandlerSlots<K, T> + 'static,
        K: 'static,
    {
        Self::from_event_with::<H, K, T, _>(host, key, |emitter| {
            Box::new(move |event| emitter.emit(event))
        })
    }

    /// Binds a host's event slot, with `adapter` shaping the emitter into the handler the slot
    /// expects.
    ///
    /// ```rust
    /// use gear::{HandlerSlots, Source};
    /// use std::{cell::RefCell, rc::Rc};
    ///
    /// #[derive(Default)]
    /// struct Input {
    ///     oninput: RefCell<Option<Box<dyn Fn(String)>>>,
    /// }
    ///
    /// impl HandlerSlots<&'static str, String> for Input {
    ///     fn set_handler(&self, _key: &'static str, handler: Box<dyn Fn(String)>) {
    ///         *self.oninput.borrow_mut() = Some(handler);
    ///     }
    /// }
    ///
    /// let input = Rc::new(Input::default());
    /// let lengths = Source::from_event_with(Rc::clone(&input), "oninput", |emitter| {
    ///     Box::new(move |text: String| emitter.emit(text.len()))
    /// });
    /// assert!(input.oninput.borrow().is_none());
    ///
    /// let seen = Rc::new(RefCell::new(Vec::new()));
    /// let _sub = lengths.value().attach({
    ///     let seen = Rc::clone(&seen);
    ///     move |n| seen.borrow_mut().push(n)
    /// });
    /// (input.oninput.borrow().as_ref().unwrap())("gear".to_string());
    /// assert_eq!(*seen.borrow(), [4]);
    /// ```
    pub fn from_event_with<H, K, E, A>(host: H, key: K, adapter: A) -> Self
    where
        H: HandlerSlots<K, E> + 'static,
        K: 'static,
        A: FnOnce(Emitter<T>) -> Box<dyn Fn(E)> + 'static,
    {
        Self::new(move |emitter| host.set_handler(key, adapter(emitter)))
    }

    /// Returns the value, creating it on first access.
    ///
    /// # Panics
    /// Panics if called from inside this source's own factory: a source cannot be built from
    /// itself.
    #[track_caller]
    pub fn value(&self) -> Value<T> {
        if let Some(value) = self.inner.value.get() {
            return value.clone();
        }
        let factory = self.inner.factory.borrow_mut().take();
        let Some(factory) = factory else {
            panic!(
                "At {}, Source::value() was called while the same source was \
                 still being built; its factory cannot read the source itself.",
                std::panic::Location::caller()
            );
        };
        let value = factory();
        self.inner.value.get_or_init(|| value).clone()
    }

    /// Returns a source whose value is `f` applied to this source's value.
    ///
    /// Neither source is realized until the returned one is read.
    pub fn map<U, F>(&self, f: F) -> Source<U>
    where
        U: Clone + 'static,
        F: FnOnce(Value<T>) -> Value<U> + 'static,
    {
        let source = self.clone();
        Source::lazy(move || f(source.value()))
    }
}
