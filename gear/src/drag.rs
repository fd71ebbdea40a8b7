//! Pointer-dragging gestures.
//!
//! A gesture is split in two layers:
//! - [`Dragger`] runs a single gesture through a [`DraggingHandler`]: the handler decides what
//!   the gesture is worth at its start, and how later pointer positions map to values.
//! - [`Draggable`] is the per-element state machine around it. It owns pointer capture and
//!   decides which events start, continue or end a gesture.
//!
//! [`dragging`] wires both onto the pointer events of an element and exposes the result as a
//! [`Value`](crate::Value).

mod draggable;
mod dragger;
mod handlers;
mod pointer;

pub use draggable::{
    dragging, DragState, Draggable, PointerCapture, PointerEvents, PointerSlot,
    Transition,
};
pub use dragger::{Dragger, DraggingHandler, Mapper};
pub use handlers::{Rotation, Translation};
pub use pointer::{
    pointer_position, ElementBounds, Modifiers, PointerEvent, PointerPosition,
    PRIMARY_BUTTON,
};
