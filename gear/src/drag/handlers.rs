use super::{DraggingHandler, Mapper, Modifiers, PointerPosition};
use std::{
    cell::Cell,
    f64::consts::{PI, TAU},
    rc::Rc,
};

/// Pans a 2D offset. Holding Alt when the gesture starts drags at a tenth of the speed.
///
/// Clones share the committed offset, which is updated whenever a gesture ends.
#[derive(Debug, Default, Clone)]
pub struct Translation {
    offset: Rc<Cell<[f64; 2]>>,
}

impl Translation {
    /// The drag speed while Alt is held.
    pub const FINE_SPEED: f64 = 0.1;

    /// Creates a handler starting at `offset`.
    pub fn new(offset: [f64; 2]) -> Self {
        Self {
            offset: Rc::new(Cell::new(offset)),
        }
    }

    /// The offset committed by the last finished gesture.
    pub fn value(&self) -> [f64; 2] {
        self.offset.get()
    }
}

impl DraggingHandler<[f64; 2]> for Translation {
    fn current_value(&self, _: PointerPosition, _: Modifiers) -> [f64; 2] {
        self.offset.get()
    }

    fn mapper(
        &self,
        value: [f64; 2],
        from: PointerPosition,
        modifiers: Modifiers,
    ) -> Mapper<[f64; 2]> {
        let speed = if modifiers.alt { Self::FINE_SPEED } else { 1.0 };
        Box::new(move |to| {
            [
                value[0] + (to[0] - from[0]) * speed,
                value[1] + (to[1] - from[1]) * speed,
            ]
        })
    }

    fn finalize(&self, value: [f64; 2]) -> [f64; 2] {
        self.offset.set(value);
        value
    }
}

/// Turns an angle, in radians, around the centre of the element. Holding Shift when the gesture
/// starts snaps the angle to steps of 15°.
///
/// Clones share the committed angle, which is normalized into `[0, 2π)` whenever a gesture ends.
#[derive(Debug, Default, Clone)]
pub struct Rotation {
    angle: Rc<Cell<f64>>,
}

impl Rotation {
    /// The snapping step while Shift is held.
    pub const SNAP: f64 = PI / 12.0;

    /// Creates a handler starting at `angle`.
    pub fn new(angle: f64) -> Self {
        Self {
            angle: Rc::new(Cell::new(angle)),
        }
    }

    /// The angle committed by the last finished gesture.
    pub fn value(&self) -> f64 {
        self.angle.get()
    }
}

fn heading(position: PointerPosition) -> f64 {
    position[1].atan2(position[0])
}

impl DraggingHandler<f64> for Rotation {
    fn current_value(&self, _: PointerPosition, _: Modifiers) -> f64 {
        self.angle.get()
    }

    fn mapper(
        &self,
        value: f64,
        from: PointerPosition,
        modifiers: Modifiers,
    ) -> Mapper<f64> {
        let start = heading(from);
        let snap = modifiers.shift;
        Box::new(move |to| {
            let angle = value + heading(to) - start;
            if snap {
                (angle / Self::SNAP).round() * Self::SNAP
            } else {
                angle
            }
        })
    }

    fn finalize(&self, value: f64) -> f64 {
        let angle = value.rem_euclid(TAU);
        self.angle.set(angle);
        angle
    }
}
