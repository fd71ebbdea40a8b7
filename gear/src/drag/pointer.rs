/// A pointer position in clip space: both axes run from `-1` to `1`, with `y` pointing up.
pub type PointerPosition = [f64; 2];

/// The `buttons` bit of the primary (usually left) button.
pub const PRIMARY_BUTTON: u16 = 1;

/// The modifier keys held when a gesture starts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Modifiers {
    /// Whether Shift is held.
    pub shift: bool,
    /// Whether Control is held.
    pub ctrl: bool,
    /// Whether Alt is held.
    pub alt: bool,
}

/// The part of a host pointer event that gestures care about.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Where the pointer is, in clip space.
    pub position: PointerPosition,
    /// The bitmask of buttons currently pressed.
    pub buttons: u16,
    /// The modifier keys currently held.
    pub modifiers: Modifiers,
    /// The host's id for this pointer, used for capture.
    pub pointer_id: i32,
}

impl PointerEvent {
    /// Whether the primary button is pressed.
    pub fn is_primary_pressed(&self) -> bool {
        self.buttons & PRIMARY_BUTTON != 0
    }
}

/// An element's bounding box, in client coordinates.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ElementBounds {
    /// Distance from the viewport's left edge.
    pub left: f64,
    /// Distance from the viewport's top edge.
    pub top: f64,
    /// Width of the element.
    pub width: f64,
    /// Height of the element.
    pub height: f64,
}

/// Maps client coordinates into clip space relative to `bounds`.
///
/// A degenerate (zero-sized) element maps everything to its centre.
pub fn pointer_position(
    client: [f64; 2],
    bounds: &ElementBounds,
) -> PointerPosition {
    if bounds.width <= 0.0 || bounds.height <= 0.0 {
        return [0.0, 0.0];
    }
    let x = (client[0] - bounds.left) / bounds.width;
    let y = (client[1] - bounds.top) / bounds.height;
    [2.0 * x - 1.0, 1.0 - 2.0 * y]
}
