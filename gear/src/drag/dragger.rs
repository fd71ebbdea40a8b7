use super::{Modifiers, PointerPosition};
use std::fmt;

/// Maps pointer positions to values for the duration of one gesture.
pub type Mapper<V> = Box<dyn Fn(PointerPosition) -> V>;

/// Defines what a drag gesture does: rotate, pan, scale, ...
pub trait DraggingHandler<V> {
    /// The value at the start of a gesture.
    fn current_value(
        &self,
        position: PointerPosition,
        modifiers: Modifiers,
    ) -> V;

    /// Builds the mapping from later pointer positions to values, relative to the gesture's
    /// starting value and position.
    fn mapper(
        &self,
        value: V,
        from: PointerPosition,
        modifiers: Modifiers,
    ) -> Mapper<V>;

    /// Settles the value a gesture ends on: snapping, clamping, rounding, committing.
    fn finalize(&self, value: V) -> V {
        value
    }
}

struct Gesture<V> {
    initial: V,
    mapper: Mapper<V>,
}

/// Runs one gesture at a time through a [`DraggingHandler`].
pub struct Dragger<V, H> {
    handler: H,
    gesture: Option<Gesture<V>>,
}

impl<V, H> Dragger<V, H> {
    /// Creates an idle dragger.
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            gesture: None,
        }
    }

    /// The handler this dragger runs.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Whether a gesture is in progress.
    pub fn is_active(&self) -> bool {
        self.gesture.is_some()
    }

    /// The value the current gesture started from.
    pub fn initial_value(&self) -> Option<&V> {
        self.gesture.as_ref().map(|gesture| &gesture.initial)
    }
}

impl<V: Clone, H: DraggingHandler<V>> Dragger<V, H> {
    /// Starts a gesture at `position`, returning its initial value.
    ///
    /// Starting again while a gesture is active replaces it.
    pub fn start(
        &mut self,
        position: PointerPosition,
        modifiers: Modifiers,
    ) -> V {
        let initial = self.handler.current_value(position, modifiers);
        let mapper = self.handler.mapper(initial.clone(), position, modifiers);
        self.gesture = Some(Gesture {
            initial: initial.clone(),
            mapper,
        });
        initial
    }

    /// Maps `position` through the current gesture, or `None` if there is none.
    pub fn drag(&self, position: PointerPosition) -> Option<V> {
        self.gesture.as_ref().map(|gesture| (gesture.mapper)(position))
    }

    /// Ends the current gesture at `position`, returning its finalized value.
    pub fn end(&mut self, position: PointerPosition) -> Option<V> {
        let gesture = self.gesture.take()?;
        Some(self.handler.finalize((gesture.mapper)(position)))
    }
}

impl<V: fmt::Debug, H: fmt::Debug> fmt::Debug for Dragger<V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dragger")
            .field("handler", &self.handler)
            .field("initial", &self.initial_value())
            .finish()
    }
}
