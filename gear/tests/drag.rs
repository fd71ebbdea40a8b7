use gear::{
    drag::{
        dragging, PointerCapture, PointerEvent, PointerEvents, PointerSlot,
        Translation, PRIMARY_BUTTON,
    },
    HandlerSlots,
};
use std::{cell::RefCell, collections::HashMap, rc::Rc};

/// A fake element: records pointer capture and lets tests fire pointer events.
#[derive(Default)]
struct Element {
    handlers: RefCell<HashMap<PointerSlot, Rc<dyn Fn(PointerEvent)>>>,
    captured: RefCell<Vec<String>>,
}

impl Element {
    fn fire(&self, slot: PointerSlot, x: f64, buttons: u16, pointer_id: i32) {
        let handler = self.handlers.borrow().get(&slot).cloned();
        if let Some(handler) = handler {
            handler(PointerEvent {
                position: [x, 0.0],
                buttons,
                pointer_id,
                ..Default::default()
            });
        }
    }
}

impl HandlerSlots<PointerSlot, PointerEvent> for Element {
    fn set_handler(
        &self,
        key: PointerSlot,
        handler: Box<dyn Fn(PointerEvent)>,
    ) {
        self.handlers.borrow_mut().insert(key, Rc::from(handler));
    }
}

impl PointerCapture for Element {
    fn set_pointer_capture(&self, pointer_id: i32) {
        self.captured.borrow_mut().push(format!("set {pointer_id}"));
    }

    fn release_pointer_capture(&self, pointer_id: i32) {
        self.captured
            .borrow_mut()
            .push(format!("release {pointer_id}"));
    }
}

type Recorded = Rc<RefCell<Vec<f64>>>;

fn setup() -> (Rc<Element>, Translation, Recorded, gear::Subscription) {
    let element = Rc::new(Element::default());
    let events = PointerEvents::from_host(Rc::clone(&element));
    let translation = Translation::default();
    let offsets = dragging(Rc::clone(&element), translation.clone(), &events);

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sub = offsets.attach({
        let seen = Rc::clone(&seen);
        move |[x, _]: [f64; 2]| seen.borrow_mut().push(x)
    });
    (element, translation, seen, sub)
}

#[test]
fn gesture_emits_start_moves_and_end() {
    let (element, translation, seen, _sub) = setup();

    element.fire(PointerSlot::Down, 0.0, PRIMARY_BUTTON, 1);
    element.fire(PointerSlot::Move, 0.25, PRIMARY_BUTTON, 1);
    element.fire(PointerSlot::Move, 0.5, PRIMARY_BUTTON, 1);
    element.fire(PointerSlot::Up, 0.75, 0, 1);

    assert_eq!(*seen.borrow(), [0.0, 0.25, 0.5, 0.75]);
    assert_eq!(*element.captured.borrow(), ["set 1", "release 1"]);
    assert_eq!(translation.value(), [0.75, 0.0]);

    // the next gesture continues from the committed offset
    element.fire(PointerSlot::Down, 0.0, PRIMARY_BUTTON, 1);
    element.fire(PointerSlot::Up, -0.25, 0, 1);
    assert_eq!(seen.borrow()[4..], [0.75, 0.5]);
}

#[test]
fn moves_without_a_gesture_are_ignored() {
    let (element, _, seen, _sub) = setup();

    element.fire(PointerSlot::Move, 0.5, PRIMARY_BUTTON, 1);
    element.fire(PointerSlot::Up, 0.5, 0, 1);
    assert!(seen.borrow().is_empty());
    assert!(element.captured.borrow().is_empty());
}

#[test]
fn second_pointer_cannot_hijack_a_gesture() {
    let (element, _, seen, _sub) = setup();

    element.fire(PointerSlot::Down, 0.0, PRIMARY_BUTTON, 1);
    element.fire(PointerSlot::Down, 0.5, PRIMARY_BUTTON, 2);
    element.fire(PointerSlot::Move, 0.5, PRIMARY_BUTTON, 2);
    element.fire(PointerSlot::Up, 0.5, 0, 2);
    element.fire(PointerSlot::Move, 0.25, PRIMARY_BUTTON, 1);

    assert_eq!(*seen.borrow(), [0.0, 0.25]);
    assert_eq!(*element.captured.borrow(), ["set 1"]);
}

#[test]
fn lost_pointer_up_ends_the_gesture_on_the_next_move() {
    let (element, translation, seen, _sub) = setup();

    element.fire(PointerSlot::Down, 0.0, PRIMARY_BUTTON, 4);
    element.fire(PointerSlot::Move, 0.5, PRIMARY_BUTTON, 4);
    // the button came up while the window had lost focus
    element.fire(PointerSlot::Move, 0.75, 0, 4);
    element.fire(PointerSlot::Move, 1.0, 0, 4);

    assert_eq!(*seen.borrow(), [0.0, 0.5, 0.75]);
    assert_eq!(*element.captured.borrow(), ["set 4", "release 4"]);
    assert_eq!(translation.value(), [0.75, 0.0]);
}
