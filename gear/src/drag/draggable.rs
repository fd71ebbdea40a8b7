use super::{Dragger, DraggingHandler, PointerEvent};
use crate::{HandlerSlots, Source, Value};
use std::{cell::RefCell, fmt, rc::Rc};

/// An element that can take exclusive ownership of a pointer's events.
pub trait PointerCapture {
    /// Routes all further events of `pointer_id` to this element.
    fn set_pointer_capture(&self, pointer_id: i32);

    /// Gives up a capture taken with [`set_pointer_capture`](PointerCapture::set_pointer_capture).
    fn release_pointer_capture(&self, pointer_id: i32);
}

impl<E: PointerCapture + ?Sized> PointerCapture for Rc<E> {
    fn set_pointer_capture(&self, pointer_id: i32) {
        (**self).set_pointer_capture(pointer_id)
    }

    fn release_pointer_capture(&self, pointer_id: i32) {
        (**self).release_pointer_capture(pointer_id)
    }
}

/// Whether an element is in the middle of a gesture.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    /// No gesture.
    #[default]
    Idle,
    /// A gesture driven by the captured pointer.
    Dragging {
        /// The captured pointer.
        pointer_id: i32,
    },
}

/// What a pointer event did to an element's gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition<V> {
    /// A gesture started, with its initial value.
    Started(V),
    /// The gesture moved.
    Dragged(V),
    /// The pointer went up and the gesture ended, with its finalized value.
    Ended(V),
    /// A move arrived with the primary button already released (for example after a focus loss
    /// swallowed the pointer-up), so the gesture ended there, with its finalized value.
    ButtonReleasedWithoutPointerUp(V),
    /// The event did not affect any gesture.
    Ignored,
}

impl<V> Transition<V> {
    /// The value produced by this transition, if any.
    pub fn into_value(self) -> Option<V> {
        match self {
            Transition::Started(value)
            | Transition::Dragged(value)
            | Transition::Ended(value)
            | Transition::ButtonReleasedWithoutPointerUp(value) => Some(value),
            Transition::Ignored => None,
        }
    }

    /// Whether this transition finished a gesture.
    pub fn is_end(&self) -> bool {
        matches!(
            self,
            Transition::Ended(_) | Transition::ButtonReleasedWithoutPointerUp(_)
        )
    }
}

/// The per-element drag state machine.
///
/// At most one gesture runs per element. A pointer-down while a gesture is running is ignored
/// rather than queued, and so are events from any pointer other than the captured one.
pub struct Draggable<V, H, E> {
    element: E,
    dragger: Dragger<V, H>,
    state: DragState,
}

impl<V, H, E> Draggable<V, H, E>
where
    V: Clone,
    H: DraggingHandler<V>,
    E: PointerCapture,
{
    /// Creates an idle state machine for `element`.
    pub fn new(element: E, dragger: Dragger<V, H>) -> Self {
        Self {
            element,
            dragger,
            state: DragState::Idle,
        }
    }

    /// The current state.
    pub fn state(&self) -> DragState {
        self.state
    }

    /// Whether a gesture is in progress.
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// The element this state machine captures pointers on.
    pub fn element(&self) -> &E {
        &self.element
    }

    /// Dispatches an event by the slot it arrived on.
    pub fn handle(
        &mut self,
        slot: PointerSlot,
        event: &PointerEvent,
    ) -> Transition<V> {
        let transition = match slot {
            PointerSlot::Down => self.pointer_down(event),
            PointerSlot::Move => self.pointer_move(event),
            PointerSlot::Up => self.pointer_up(event),
        };
        #[cfg(feature = "tracing")]
        tracing::trace!(
            ?slot,
            pointer_id = event.pointer_id,
            state = ?self.state,
            ended = transition.is_end(),
            "drag event"
        );
        transition
    }

    /// Captures the pointer and starts a gesture, unless one is already running.
    pub fn pointer_down(&mut self, event: &PointerEvent) -> Transition<V> {
        if self.is_dragging() {
            return Transition::Ignored;
        }
        self.element.set_pointer_capture(event.pointer_id);
        self.state = DragState::Dragging {
            pointer_id: event.pointer_id,
        };
        Transition::Started(self.dragger.start(event.position, event.modifiers))
    }

    /// Continues the gesture, or ends it if the primary button is no longer held.
    pub fn pointer_move(&mut self, event: &PointerEvent) -> Transition<V> {
        if !self.is_captured(event) {
            return Transition::Ignored;
        }
        if event.is_primary_pressed() {
            self.dragger
                .drag(event.position)
                .map_or(Transition::Ignored, Transition::Dragged)
        } else {
            self.finish(event).map_or(
                Transition::Ignored,
                Transition::ButtonReleasedWithoutPointerUp,
            )
        }
    }

    /// Releases the pointer and ends the gesture.
    pub fn pointer_up(&mut self, event: &PointerEvent) -> Transition<V> {
        if !self.is_captured(event) {
            return Transition::Ignored;
        }
        self.finish(event)
            .map_or(Transition::Ignored, Transition::Ended)
    }

    fn is_captured(&self, event: &PointerEvent) -> bool {
        self.state
            == DragState::Dragging {
                pointer_id: event.pointer_id,
            }
    }

    fn finish(&mut self, event: &PointerEvent) -> Option<V> {
        self.element.release_pointer_capture(event.pointer_id);
        self.state = DragState::Idle;
        self.dragger.end(event.position)
    }
}

impl<V: fmt::Debug, H: fmt::Debug, E> fmt::Debug for Draggable<V, H, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Draggable")
            .field("dragger", &self.dragger)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// The pointer event slots an element exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerSlot {
    /// `onpointerdown`
    Down,
    /// `onpointermove`
    Move,
    /// `onpointerup`
    Up,
}

/// The three pointer streams of one element, as lazy [`Source`]s.
#[derive(Debug, Clone)]
pub struct PointerEvents {
    /// Pointer-down events.
    pub down: Source<PointerEvent>,
    /// Pointer-move events.
    pub moves: Source<PointerEvent>,
    /// Pointer-up events.
    pub up: Source<PointerEvent>,
}

impl PointerEvents {
    /// Binds the pointer slots of `host`. Each slot is assigned the first time its stream is
    /// read.
    pub fn from_host<H>(host: H) -> Self
    where
        H: HandlerSlots<PointerSlot, PointerEvent> + Clone + 'static,
    {
        Self {
            down: Source::from_event(host.clone(), PointerSlot::Down),
            moves: Source::from_event(host.clone(), PointerSlot::Move),
            up: Source::from_event(host, PointerSlot::Up),
        }
    }
}

/// Runs drag gestures on `element` and emits every value they produce: the initial value, each
/// dragged value, and the finalized value.
pub fn dragging<V, H, E>(
    element: E,
    handler: H,
    events: &PointerEvents,
) -> Value<V>
where
    V: Clone + 'static,
    H: DraggingHandler<V> + 'static,
    E: PointerCapture + 'static,
{
    let draggable =
        RefCell::new(Draggable::new(element, Dragger::new(handler)));
    let tagged = Value::merge([
        events.down.value().map(|event| (PointerSlot::Down, event)),
        events.moves.value().map(|event| (PointerSlot::Move, event)),
        events.up.value().map(|event| (PointerSlot::Up, event)),
    ]);
    tagged.then(move |(slot, event), emit| {
        let transition = draggable.borrow_mut().handle(slot, &event);
        if let Some(value) = transition.into_value() {
            emit.emit(value);
        }
    })
}
