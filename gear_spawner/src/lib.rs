//! This crate schedules work onto "the next turn" of whatever task queue the host program runs,
//! without tying the caller to a particular executor.
//!
//! It only supports a single executor per program, but that executor can be set at runtime,
//! anywhere in your crate (or an application that depends on it). Everything it runs is local to
//! the current thread: the reactive graphs that use it are single-threaded by construction.
//!
//! The executor provides three things:
//! - [`Executor::spawn_local`] queues a `!Send` [`Future`] to run on a later turn.
//! - [`Executor::sleep`] resolves after a [`Duration`], using the host's timers.
//! - [`Executor::poll_local`] drives queued work, for executors that need to be pumped by hand.
//!
//! ```rust
//! use gear_spawner::Executor;
//!
//! Executor::init_futures_executor()
//!     .expect("executor should only be initialized once");
//!
//! // queue a Future that is !Send
//! let rc = std::rc::Rc::new(());
//! Executor::spawn_local(async move {
//!     _ = rc;
//! });
//!
//! // run everything that is ready
//! Executor::poll_local();
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

use std::{
    future::{poll_fn, Future},
    pin::Pin,
    sync::OnceLock,
    task::Poll,
    time::Duration,
};
use thiserror::Error;

/// A boxed, pinned [`Future`] that may hold `!Send` data.
pub type PinnedLocalFuture<T> = Pin<Box<dyn Future<Output = T>>>;

static EXECUTOR_FNS: OnceLock<ExecutorFns> = OnceLock::new();
static CUSTOM_EXECUTOR: OnceLock<Box<dyn CustomExecutor + Send + Sync>> =
    OnceLock::new();

#[derive(Clone, Copy)]
struct ExecutorFns {
    spawn_local: fn(PinnedLocalFuture<()>),
    poll_local: fn(),
    sleep: fn(Duration) -> PinnedLocalFuture<()>,
}

/// Errors that can occur when using the executor.
#[derive(Error, Debug)]
pub enum ExecutorError {
    /// The executor has already been set.
    #[error("Executor has already been set.")]
    AlreadySet,
}

/// A user-provided executor, installed with [`Executor::init_custom_executor`].
///
/// This is the hook for hosts that run their own event loop, and for tests that want to control
/// time by hand.
pub trait CustomExecutor {
    /// Queues a [`Future`] to run on a later turn of the current thread.
    fn spawn_local(&self, fut: PinnedLocalFuture<()>);

    /// Runs queued work until nothing more can make progress.
    fn poll_local(&self);

    /// Returns a [`Future`] that resolves once `duration` has elapsed.
    fn sleep(&self, duration: Duration) -> PinnedLocalFuture<()>;
}

/// The global executor used to schedule deferred work.
pub struct Executor;

impl Executor {
    /// Queues a [`Future`] that cannot be sent across threads.
    ///
    /// The future is never polled synchronously: its first poll happens on a later turn of the
    /// executor.
    /// ```rust
    /// use gear_spawner::Executor;
    ///
    /// Executor::init_futures_executor()
    ///     .expect("executor should only be initialized once");
    ///
    /// Executor::spawn_local(async { /* ... */ });
    /// ```
    #[track_caller]
    pub fn spawn_local(fut: impl Future<Output = ()> + 'static) {
        match EXECUTOR_FNS.get() {
            Some(fns) => (fns.spawn_local)(Box::pin(fut)),
            None => missing_executor("Executor::spawn_local()"),
        }
    }

    /// Drives queued local work until it stalls.
    ///
    /// This is a no-op for executors that drive themselves (tokio, wasm-bindgen).
    pub fn poll_local() {
        if let Some(fns) = EXECUTOR_FNS.get() {
            (fns.poll_local)()
        }
    }

    /// Waits for `duration` on the host's timers.
    #[track_caller]
    pub fn sleep(duration: Duration) -> PinnedLocalFuture<()> {
        match EXECUTOR_FNS.get() {
            Some(fns) => (fns.sleep)(duration),
            None => {
                missing_executor("Executor::sleep()");
                Box::pin(futures::future::pending())
            }
        }
    }

    /// Yields once, resuming on the next turn of the executor.
    pub async fn tick() {
        let mut yielded = false;
        poll_fn(|cx| {
            if yielded {
                Poll::Ready(())
            } else {
                yielded = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        })
        .await
    }
}

#[track_caller]
fn missing_executor(operation: &str) {
    #[cfg(all(debug_assertions, feature = "tracing"))]
    tracing::error!(
        "At {}, tried to use {operation} before the Executor had been set.",
        std::panic::Location::caller()
    );
    #[cfg(all(debug_assertions, not(feature = "tracing")))]
    panic!(
        "At {}, tried to use {operation} before the Executor had been set.",
        std::panic::Location::caller()
    );
    #[cfg(not(debug_assertions))]
    let _ = operation;
}

impl Executor {
    /// Globally sets the [`tokio`] runtime as the executor used to schedule tasks.
    ///
    /// Local tasks go through [`tokio::task::spawn_local`], so they must be scheduled from inside
    /// a [`tokio::task::LocalSet`].
    ///
    /// Returns `Err(_)` if an executor has already been set.
    ///
    /// Requires the `tokio` feature to be activated on this crate.
    #[cfg(feature = "tokio")]
    #[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
    pub fn init_tokio() -> Result<(), ExecutorError> {
        EXECUTOR_FNS
            .set(ExecutorFns {
                spawn_local: |fut| {
                    tokio::task::spawn_local(fut);
                },
                poll_local: || {},
                sleep: |duration| -> PinnedLocalFuture<()> {
                    Box::pin(tokio::time::sleep(duration))
                },
            })
            .map_err(|_| ExecutorError::AlreadySet)
    }

    /// Globally sets the [`wasm-bindgen-futures`] runtime as the executor used to schedule
    /// tasks, with `setTimeout` as the timer.
    ///
    /// Returns `Err(_)` if an executor has already been set.
    ///
    /// Requires the `wasm-bindgen` feature to be activated on this crate.
    #[cfg(feature = "wasm-bindgen")]
    #[cfg_attr(docsrs, doc(cfg(feature = "wasm-bindgen")))]
    pub fn init_wasm_bindgen() -> Result<(), ExecutorError> {
        fn sleep(duration: Duration) -> PinnedLocalFuture<()> {
            let millis = duration.as_millis().try_into().unwrap_or(i32::MAX);
            let promise = js_sys::Promise::new(&mut |resolve, _reject| {
                if let Some(window) = web_sys::window() {
                    _ = window
                        .set_timeout_with_callback_and_timeout_and_arguments_0(
                            &resolve, millis,
                        );
                }
            });
            Box::pin(async move {
                _ = wasm_bindgen_futures::JsFuture::from(promise).await;
            })
        }

        EXECUTOR_FNS
            .set(ExecutorFns {
                spawn_local: |fut| {
                    wasm_bindgen_futures::spawn_local(fut);
                },
                poll_local: || {},
                sleep,
            })
            .map_err(|_| ExecutorError::AlreadySet)
    }

    /// Globally sets the [`futures`] executor as the executor used to schedule tasks, with a
    /// thread-local [`LocalPool`](futures::executor::LocalPool) per thread.
    ///
    /// The pool is not driven automatically: call [`Executor::poll_local`] to run whatever is
    /// ready. Timers are backed by a short-lived helper thread each.
    ///
    /// Returns `Err(_)` if an executor has already been set.
    ///
    /// Requires the `futures-executor` feature to be activated on this crate.
    #[cfg(feature = "futures-executor")]
    #[cfg_attr(docsrs, doc(cfg(feature = "futures-executor")))]
    pub fn init_futures_executor() -> Result<(), ExecutorError> {
        use futures::{
            channel::oneshot,
            executor::{LocalPool, LocalSpawner},
            task::LocalSpawnExt,
        };
        use std::cell::RefCell;

        thread_local! {
            static LOCAL_POOL: RefCell<LocalPool> =
                RefCell::new(LocalPool::new());
            static SPAWNER: LocalSpawner =
                LOCAL_POOL.with(|pool| pool.borrow().spawner());
        }

        EXECUTOR_FNS
            .set(ExecutorFns {
                spawn_local: |fut| {
                    SPAWNER.with(|spawner| {
                        spawner
                            .spawn_local(fut)
                            .expect("failed to spawn future");
                    });
                },
                poll_local: || {
                    LOCAL_POOL.with(|pool| {
                        // a task that pumps the pool itself would re-enter here
                        if let Ok(mut pool) = pool.try_borrow_mut() {
                            pool.run_until_stalled();
                        }
                    });
                },
                sleep: |duration| -> PinnedLocalFuture<()> {
                    let (tx, rx) = oneshot::channel();
                    std::thread::spawn(move || {
                        std::thread::sleep(duration);
                        _ = tx.send(());
                    });
                    Box::pin(async move {
                        _ = rx.await;
                    })
                },
            })
            .map_err(|_| ExecutorError::AlreadySet)
    }

    /// Globally sets a [`CustomExecutor`] as the executor used to schedule tasks.
    ///
    /// Returns `Err(_)` if an executor has already been set.
    pub fn init_custom_executor(
        executor: impl CustomExecutor + Send + Sync + 'static,
    ) -> Result<(), ExecutorError> {
        if EXECUTOR_FNS.get().is_some() {
            return Err(ExecutorError::AlreadySet);
        }
        CUSTOM_EXECUTOR
            .set(Box::new(executor))
            .map_err(|_| ExecutorError::AlreadySet)?;
        EXECUTOR_FNS
            .set(ExecutorFns {
                spawn_local: |fut| {
                    if let Some(executor) = CUSTOM_EXECUTOR.get() {
                        executor.spawn_local(fut);
                    }
                },
                poll_local: || {
                    if let Some(executor) = CUSTOM_EXECUTOR.get() {
                        executor.poll_local();
                    }
                },
                sleep: |duration| -> PinnedLocalFuture<()> {
                    match CUSTOM_EXECUTOR.get() {
                        Some(executor) => executor.sleep(duration),
                        None => Box::pin(futures::future::pending()),
                    }
                },
            })
            .map_err(|_| ExecutorError::AlreadySet)
    }
}
