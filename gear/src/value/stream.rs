use super::{Subscription, Value};
use futures::{
    channel::mpsc::{unbounded, UnboundedReceiver},
    Stream, StreamExt,
};
use std::{
    pin::Pin,
    task::{Context, Poll},
};

/// A [`Stream`] of the items emitted by a [`Value`] after the stream was created.
///
/// Items are buffered until polled. Dropping the stream detaches it from the value.
#[must_use = "streams do nothing unless polled"]
#[derive(Debug)]
pub struct ValueStream<T> {
    rx: UnboundedReceiver<T>,
    _subscription: Subscription,
}

impl<T: Clone + 'static> ValueStream<T> {
    pub(crate) fn new(value: &Value<T>) -> Self {
        let (tx, rx) = unbounded();
        let subscription = value.attach(move |item| {
            _ = tx.unbounded_send(item);
        });
        Self {
            rx,
            _subscription: subscription,
        }
    }
}

impl<T> Stream for ValueStream<T> {
    type Item = T;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        self.rx.poll_next_unpin(cx)
    }
}
