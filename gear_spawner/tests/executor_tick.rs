#![cfg(feature = "futures-executor")]

use gear_spawner::Executor;
use std::{cell::RefCell, rc::Rc};

#[test]
fn test_executor_tick() {
    Executor::init_futures_executor()
        .expect("Failed to initialize futures executor");

    let log = Rc::new(RefCell::new(Vec::new()));

    // The first task yields once, so the second task gets a turn in between
    Executor::spawn_local({
        let log = Rc::clone(&log);
        async move {
            log.borrow_mut().push("a: before tick");
            Executor::tick().await;
            log.borrow_mut().push("a: after tick");
        }
    });
    Executor::spawn_local({
        let log = Rc::clone(&log);
        async move {
            log.borrow_mut().push("b");
        }
    });

    assert!(log.borrow().is_empty());
    Executor::poll_local();

    let log = log.borrow();
    assert_eq!(log.len(), 3);
    assert_eq!(log[0], "a: before tick");
    assert_eq!(log[2], "a: after tick");
}
