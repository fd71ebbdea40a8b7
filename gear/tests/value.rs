use gear::prelude::*;
use std::{cell::RefCell, rc::Rc};

fn log<T: 'static>() -> (Rc<RefCell<Vec<T>>>, impl Fn(T) + 'static) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let push = {
        let log = Rc::clone(&log);
        move |item| log.borrow_mut().push(item)
    };
    (log, push)
}

#[test]
fn every_consumer_sees_every_item_in_order() {
    let value = Value::<u32>::default();
    let (first, push_first) = log();
    let (second, push_second) = log();
    let _a = value.attach(push_first);
    let _b = value.attach(push_second);

    for x in 0..5 {
        value.flow(x);
    }
    assert_eq!(*first.borrow(), [0, 1, 2, 3, 4]);
    assert_eq!(*second.borrow(), [0, 1, 2, 3, 4]);
}

#[test]
fn diamond_delivers_both_branches_per_item() {
    let src = Value::<i32>::default();
    let left = src.map(|x| format!("L{x}"));
    let right = src.map(|x| format!("R{x}"));
    let joined = Value::merge([left, right]);
    let (seen, push) = log();
    let _sub = joined.attach(push);

    src.flow(1);
    src.flow(2);
    assert_eq!(*seen.borrow(), ["L1", "R1", "L2", "R2"]);
}

#[test]
fn producer_emits_through_its_emitter() {
    let slot: Rc<RefCell<Option<Emitter<&str>>>> = Default::default();
    let value = Value::new({
        let slot = Rc::clone(&slot);
        move |emitter| *slot.borrow_mut() = Some(emitter)
    });
    let upper = value.map(|s: &str| s.to_uppercase());
    let (seen, push) = log();
    let _sub = upper.attach(push);

    if let Some(emitter) = slot.borrow().as_ref() {
        emitter.emit("drag");
        emitter.emit("drop");
    }
    assert_eq!(*seen.borrow(), ["DRAG", "DROP"]);
}

#[test]
fn consumer_can_flow_into_another_value() {
    let a = Value::<i32>::default();
    let b = Value::<i32>::default();
    let (seen, push) = log();
    let _forward = a.attach({
        let b = b.clone();
        move |x| b.flow(x + 100)
    });
    let _sub = b.attach(push);

    a.flow(1);
    b.flow(2);
    assert_eq!(*seen.borrow(), [101, 2]);
}

#[test]
fn cancelling_inside_a_consumer_stops_later_emissions() {
    let value = Value::<i32>::default();
    let (seen, push) = log();
    let handle: Rc<RefCell<Option<Subscription>>> = Default::default();
    *handle.borrow_mut() = Some(value.attach({
        let handle = Rc::clone(&handle);
        move |x| {
            push(x);
            if x == 2 {
                if let Some(sub) = handle.borrow_mut().take() {
                    sub.cancel();
                }
            }
        }
    }));

    for x in 1..=4 {
        value.flow(x);
    }
    assert_eq!(*seen.borrow(), [1, 2]);
    assert_eq!(value.consumer_count(), 0);
}

#[test]
fn forgotten_subscriptions_stay_attached() {
    let src = Value::<i32>::default();
    let (seen, push) = log();
    src.filter(|x| x % 2 == 1).attach(push).forget();

    for x in 0..6 {
        src.flow(x);
    }
    assert_eq!(*seen.borrow(), [1, 3, 5]);
    assert_eq!(src.consumer_count(), 1);
}

#[test]
fn merged_subscriptions_cancel_together() {
    let a = Value::<i32>::default();
    let b = Value::<i32>::default();
    let both = a
        .attach(|_| {})
        .merge(b.attach(|_| {}))
        .merge(Subscription::empty());
    assert_eq!((a.consumer_count(), b.consumer_count()), (1, 1));
    both.cancel();
    assert_eq!((a.consumer_count(), b.consumer_count()), (0, 0));
}
