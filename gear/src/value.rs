//! Push-based multicast streams.

use crate::operators::{
    Filter, FlowSwitch, Latency, Map, Operator, Reduce, Repeater, Switch, Then,
};
use gear_spawner::Executor;
use std::{
    cell::RefCell,
    fmt::{Debug, Formatter, Result},
    hash::Hash,
    panic::Location,
    rc::{Rc, Weak},
    time::Duration,
};

mod consumers;
mod stream;
mod subscription;

use consumers::{ConsumerEntry, ConsumerSet};
pub use stream::ValueStream;
use subscription::Detach;
pub use subscription::Subscription;

/// A multicast stream of discrete events.
///
/// A `Value` is a cheap handle: cloning it shares the same stream. Items pushed with
/// [`flow`](Value::flow) are delivered synchronously to every consumer attached when the
/// emission starts, in registration order. There is no replay: a consumer attached after an
/// emission never sees it, unless the value was built with [`defaults_to`](Value::defaults_to).
///
/// Values are extended, never mutated, by their combinators: each one returns a new `Value` that
/// keeps its upstream alive for as long as it lives itself.
pub struct Value<T> {
    pub(crate) inner: Rc<ValueInner<T>>,
}

pub(crate) struct ValueInner<T> {
    #[cfg(debug_assertions)]
    defined_at: &'static Location<'static>,
    consumers: RefCell<ConsumerSet<T>>,
    upstream: RefCell<Vec<Subscription>>,
    initial: Option<T>,
}

/// The write end of a [`Value`], handed to producers and operators.
///
/// An emitter only holds a weak reference: once its value has been dropped, emitted items go
/// nowhere.
pub struct Emitter<T>(Weak<ValueInner<T>>);

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self(Weak::clone(&self.0))
    }
}

impl<T> Debug for Emitter<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("Emitter")
            .field("type", &std::any::type_name::<T>())
            .field("live", &self.is_live())
            .finish()
    }
}

impl<T> Emitter<T> {
    /// Whether the value this emitter feeds still exists.
    pub fn is_live(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl<T: Clone + 'static> Emitter<T> {
    /// Pushes an item into the value, if it still exists.
    pub fn emit(&self, item: T) {
        if let Some(inner) = self.0.upgrade() {
            Value { inner }.flow(item);
        }
    }
}

impl<T> Clone for Value<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Debug for Value<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let mut s = f.debug_struct("Value");
        s.field("type", &std::any::type_name::<T>());
        if let Ok(consumers) = self.inner.consumers.try_borrow() {
            s.field("consumers", &consumers.len());
        }
        #[cfg(debug_assertions)]
        s.field("defined_at", &self.inner.defined_at);
        s.finish()
    }
}

impl<T> PartialEq for Value<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Eq for Value<T> {}

impl<T> Hash for Value<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::ptr::hash(Rc::as_ptr(&self.inner), state);
    }
}

impl<T: Clone + 'static> Default for Value<T> {
    #[track_caller]
    fn default() -> Self {
        Self::with_initial(None)
    }
}

impl<T: Clone + 'static> FromIterator<Value<T>> for Value<T> {
    #[track_caller]
    fn from_iter<I: IntoIterator<Item = Value<T>>>(iter: I) -> Self {
        Self::merge(iter)
    }
}

impl<T: Clone + 'static> Value<T> {
    /// Creates a value and immediately hands its [`Emitter`] to `producer`.
    ///
    /// The producer runs once, synchronously. It typically stores the emitter in some external
    /// event callback.
    /// ```rust
    /// # use gear::Value;
    /// # use std::{cell::RefCell, rc::Rc};
    /// let slot = Rc::new(RefCell::new(None));
    /// let value = Value::new({
    ///     let slot = Rc::clone(&slot);
    ///     move |emitter| *slot.borrow_mut() = Some(emitter)
    /// });
    ///
    /// let seen = Rc::new(RefCell::new(Vec::new()));
    /// value.attach({
    ///     let seen = Rc::clone(&seen);
    ///     move |x: u8| seen.borrow_mut().push(x)
    /// }).forget();
    ///
    /// slot.borrow().as_ref().unwrap().emit(4);
    /// assert_eq!(*seen.borrow(), [4]);
    /// ```
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip_all)
    )]
    #[track_caller]
    pub fn new(producer: impl FnOnce(Emitter<T>)) -> Self {
        let value = Self::with_initial(None);
        producer(value.emitter());
        value
    }

    #[track_caller]
    fn with_initial(initial: Option<T>) -> Self {
        Self {
            inner: Rc::new(ValueInner {
                #[cfg(debug_assertions)]
                defined_at: Location::caller(),
                consumers: Default::default(),
                upstream: Default::default(),
                initial,
            }),
        }
    }

    /// Returns a weak handle that pushes items into this value.
    pub fn emitter(&self) -> Emitter<T> {
        Emitter(Rc::downgrade(&self.inner))
    }

    /// Registers a consumer for every future emission.
    ///
    /// Consumers run in registration order. If this value was built with
    /// [`defaults_to`](Value::defaults_to), the consumer is also scheduled to receive the default
    /// on the next turn of the executor.
    pub fn attach(&self, consumer: impl Fn(T) + 'static) -> Subscription {
        let entry = self
            .inner
            .consumers
            .borrow_mut()
            .insert(Box::new(consumer));
        if let Some(initial) = &self.inner.initial {
            schedule_default(Rc::clone(&entry), initial.clone());
        }
        Subscription::new(Attachment {
            value: Rc::clone(&self.inner),
            entry,
        })
    }

    /// Emits one item to every consumer attached right now.
    pub fn flow(&self, item: T) {
        let consumers = self.inner.consumers.borrow().snapshot();
        let mut consumers = consumers.into_iter().peekable();
        while let Some(consumer) = consumers.next() {
            if consumers.peek().is_some() {
                consumer.deliver(item.clone());
            } else {
                consumer.deliver(item);
                break;
            }
        }
    }

    /// The number of consumers currently attached.
    pub fn consumer_count(&self) -> usize {
        self.inner.consumers.borrow().len()
    }

    /// Derives a new value by running every item through `operator`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip_all)
    )]
    #[track_caller]
    pub fn pipe<O>(&self, operator: O) -> Value<O::Output>
    where
        O: Operator<T>,
    {
        let downstream = Value::with_initial(None);
        let emitter = downstream.emitter();
        downstream
            .retain(self.attach(move |item| operator.apply(item, &emitter)));
        downstream
    }

    /// Derives a new value from an effect that may emit any number of results per item.
    ///
    /// ```rust
    /// # use gear::Value;
    /// # use std::{cell::RefCell, rc::Rc};
    /// let words = Value::<&str>::default();
    /// let letters = words.then(|word, emit| word.chars().for_each(|c| emit.emit(c)));
    ///
    /// let seen = Rc::new(RefCell::new(String::new()));
    /// let _sub = letters.attach({
    ///     let seen = Rc::clone(&seen);
    ///     move |c| seen.borrow_mut().push(c)
    /// });
    /// words.flow("gear");
    /// assert_eq!(*seen.borrow(), "gear");
    /// ```
    #[track_caller]
    pub fn then<U, F>(&self, effect: F) -> Value<U>
    where
        U: Clone + 'static,
        F: Fn(T, &Emitter<U>) + 'static,
    {
        self.pipe(Then::<F, U>::new(effect))
    }

    /// Derives a value with exactly one transformed item per input.
    #[track_caller]
    pub fn map<U, F>(&self, f: F) -> Value<U>
    where
        U: Clone + 'static,
        F: Fn(T) -> U + 'static,
    {
        self.pipe(Map::<F, U>::new(f))
    }

    /// Derives a value that only forwards items matching `predicate`.
    #[track_caller]
    pub fn filter<F>(&self, predicate: F) -> Value<T>
    where
        F: Fn(&T) -> bool + 'static,
    {
        self.pipe(Filter::new(predicate))
    }

    /// Derives a running left fold of this value, starting from `identity`.
    ///
    /// Every input is folded in and the new accumulator is emitted at once. Consumers also receive
    /// `identity` itself on the next turn, unless an item reaches them first.
    #[track_caller]
    pub fn reduce<A, F>(&self, reducer: F, identity: A) -> Value<A>
    where
        A: Clone + 'static,
        F: Fn(A, T) -> A + 'static,
    {
        self.pipe(Reduce::new(reducer, identity.clone()))
            .defaults_to(identity)
    }

    /// Derives a value that forwards every item and also gives each new consumer `initial`,
    /// on the next turn of the executor.
    ///
    /// The deferred default is skipped for a consumer that has already observed an item, or has
    /// been cancelled, by the time it would be delivered.
    #[track_caller]
    pub fn defaults_to(&self, initial: T) -> Value<T> {
        let downstream = Value::with_initial(Some(initial));
        let emitter = downstream.emitter();
        downstream.retain(self.attach(move |item| emitter.emit(item)));
        downstream
    }

    /// Derives a value that delivers each item on the next turn of the executor.
    ///
    /// Items keep their order.
    #[track_caller]
    pub fn later(&self) -> Value<T> {
        self.pipe(Latency::new())
    }

    /// Derives a value that forwards items only while the latest boolean from `on` is `true`.
    ///
    /// The gate starts in the `initial` state.
    #[track_caller]
    pub fn flow_switch(&self, on: &Value<bool>, initial: bool) -> Value<T> {
        let gate = FlowSwitch::new(initial);
        let control = on.attach({
            let state = gate.state();
            move |open| state.set(open)
        });
        let downstream = self.pipe(gate);
        downstream.retain(control);
        downstream
    }

    /// Routes items to the case selected by the most recent key from `controller`.
    ///
    /// Items arriving before the first key are dropped. Changing the key redirects all later
    /// items at once, without replay; no item is ever delivered to two cases. Dropping the
    /// returned [`Subscription`] tears the routing down.
    pub fn switch<K>(
        &self,
        controller: &Value<K>,
        cases: impl IntoIterator<Item = (K, Value<T>)>,
    ) -> Subscription
    where
        K: Clone + Eq + Hash + Debug + 'static,
    {
        let switch = Rc::new(Switch::new(cases));
        let selection = controller.attach({
            let switch = Rc::clone(&switch);
            move |key| switch.select(key)
        });
        let routing = self.attach(move |item| switch.route(item));
        selection.merge(routing)
    }

    /// Merges any number of values into one that forwards every item of each, as it occurs.
    #[track_caller]
    pub fn merge(values: impl IntoIterator<Item = Value<T>>) -> Self {
        let merged = Self::with_initial(None);
        for value in values {
            let emitter = merged.emitter();
            merged.retain(value.attach(move |item| emitter.emit(item)));
        }
        merged
    }

    /// Returns a [`Stream`](futures::Stream) of every future item of this value.
    pub fn to_stream(&self) -> ValueStream<T> {
        ValueStream::new(self)
    }

    pub(crate) fn retain(&self, upstream: Subscription) {
        self.inner.upstream.borrow_mut().push(upstream);
    }
}

impl<T: Clone + PartialEq + 'static> Value<T> {
    /// Derives a value that forwards each item and then repeats it every `interval`, until the
    /// next item arrives.
    ///
    /// An item equal to `rest` is forwarded once and not repeated.
    #[track_caller]
    pub fn repeater(&self, interval: Duration, rest: T) -> Value<T> {
        self.pipe(Repeater::new(interval, rest))
    }
}

fn schedule_default<T: 'static>(entry: Rc<ConsumerEntry<T>>, initial: T) {
    Executor::spawn_local(async move {
        if entry.is_active() && !entry.has_delivered() {
            entry.deliver(initial);
        }
    });
}

struct Attachment<T> {
    value: Rc<ValueInner<T>>,
    entry: Rc<ConsumerEntry<T>>,
}

impl<T> Detach for Attachment<T> {
    fn detach(&self) {
        self.entry.deactivate();
        if let Ok(mut consumers) = self.value.consumers.try_borrow_mut() {
            consumers.remove(self.entry.id());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Value;
    use std::{cell::RefCell, rc::Rc};

    fn recorder<T: 'static>() -> (Rc<RefCell<Vec<T>>>, impl Fn(T) + 'static) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let push = {
            let log = Rc::clone(&log);
            move |item| log.borrow_mut().push(item)
        };
        (log, push)
    }

    #[test]
    fn fan_out_runs_in_attachment_order() {
        let value = Value::<i32>::default();
        let order = Rc::new(RefCell::new(Vec::new()));
        let subs: Vec<_> = (0..3)
            .map(|n| {
                let order = Rc::clone(&order);
                value.attach(move |x| order.borrow_mut().push((n, x)))
            })
            .collect();

        value.flow(9);
        assert_eq!(*order.borrow(), [(0, 9), (1, 9), (2, 9)]);
        drop(subs);
    }

    #[test]
    fn map_transforms_each_item() {
        let src = Value::default();
        let mapped = src.map(|x: i32| x * 2);
        let (results, push) = recorder();
        let _sub = mapped.attach(push);

        src.flow(3);
        assert_eq!(*results.borrow(), [6]);
        src.flow(5);
        assert_eq!(*results.borrow(), [6, 10]);
    }

    #[test]
    fn filter_and_then() {
        let src = Value::<u32>::default();
        let evens = src.filter(|x| x % 2 == 0);
        let twice = evens.then(|x, emit| {
            emit.emit(x);
            emit.emit(x);
        });
        let (results, push) = recorder();
        let _sub = twice.attach(push);

        for x in 1..=4 {
            src.flow(x);
        }
        assert_eq!(*results.borrow(), [2, 2, 4, 4]);
    }

    #[test]
    fn no_replay_for_late_consumers() {
        let value = Value::<&str>::default();
        value.flow("early");
        let (results, push) = recorder();
        let _sub = value.attach(push);
        value.flow("late");
        assert_eq!(*results.borrow(), ["late"]);
    }

    #[test]
    fn consumer_attached_during_emission_waits_for_the_next_one() {
        let value = Value::<i32>::default();
        let (results, push) = recorder();
        let push = Rc::new(push);
        let late = Rc::new(RefCell::new(None));
        let _first = value.attach({
            let value = value.clone();
            let late = Rc::clone(&late);
            let push = Rc::clone(&push);
            move |_| {
                if late.borrow().is_none() {
                    let push = Rc::clone(&push);
                    *late.borrow_mut() = Some(value.attach(move |x| push(x)));
                }
            }
        });

        value.flow(1);
        assert!(results.borrow().is_empty());
        value.flow(2);
        assert_eq!(*results.borrow(), [2]);
    }

    #[test]
    fn cancel_detaches_and_drop_releases_upstream() {
        let src = Value::<i32>::default();
        let (results, push) = recorder();
        let sub = src.attach(push);
        assert_eq!(src.consumer_count(), 1);
        sub.cancel();
        assert_eq!(src.consumer_count(), 0);
        src.flow(1);
        assert!(results.borrow().is_empty());

        let mapped = src.map(|x| x + 1);
        assert_eq!(src.consumer_count(), 1);
        drop(mapped);
        assert_eq!(src.consumer_count(), 0);
    }

    #[test]
    fn subscription_keeps_a_derived_chain_alive() {
        let src = Value::<i32>::default();
        let (results, push) = recorder();
        let sub = src.map(|x| x * 10).filter(|x| *x > 10).attach(push);

        src.flow(1);
        src.flow(2);
        assert_eq!(*results.borrow(), [20]);

        drop(sub);
        assert_eq!(src.consumer_count(), 0);
    }

    #[test]
    fn merge_forwards_in_event_order() {
        let a = Value::<char>::default();
        let b = Value::<char>::default();
        let merged: Value<char> = [a.clone(), b.clone()].into_iter().collect();
        let (results, push) = recorder();
        let _sub = merged.attach(push);

        a.flow('a');
        b.flow('b');
        a.flow('c');
        assert_eq!(*results.borrow(), ['a', 'b', 'c']);
    }

    #[test]
    fn emitter_outliving_its_value_goes_nowhere() {
        let value = Value::<i32>::default();
        let emitter = value.emitter();
        assert!(emitter.is_live());
        drop(value);
        assert!(!emitter.is_live());
        emitter.emit(1);
    }

    #[test]
    fn flow_switch_gates_items() {
        let src = Value::<i32>::default();
        let on = Value::<bool>::default();
        let gated = src.flow_switch(&on, false);
        let (results, push) = recorder();
        let _sub = gated.attach(push);

        src.flow(1);
        on.flow(true);
        src.flow(2);
        on.flow(false);
        src.flow(3);
        assert_eq!(*results.borrow(), [2]);
    }
}
