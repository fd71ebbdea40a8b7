use std::{fmt, mem};

/// Something that can be detached from the graph.
pub(crate) trait Detach {
    fn detach(&self);
}

/// A handle to one or more consumers attached to a [`Value`](crate::Value).
///
/// Dropping the handle detaches its consumers. Call [`Subscription::forget`] to keep them
/// attached for as long as the value they are attached to lives.
#[must_use = "dropping a Subscription detaches its consumer; call \
              `.forget()` to keep it attached"]
pub struct Subscription {
    links: Vec<Box<dyn Detach>>,
}

impl Subscription {
    pub(crate) fn new(link: impl Detach + 'static) -> Self {
        Self {
            links: vec![Box::new(link)],
        }
    }

    /// A subscription that holds nothing.
    pub fn empty() -> Self {
        Self { links: Vec::new() }
    }

    /// Combines two subscriptions into one that cancels both.
    pub fn merge(mut self, mut other: Subscription) -> Self {
        self.links.append(&mut other.links);
        self
    }

    /// Detaches every consumer held by this subscription.
    pub fn cancel(mut self) {
        self.detach_all();
    }

    /// Keeps the consumers attached for the lifetime of the values they are attached to.
    ///
    /// The values themselves are kept alive as well: a forgotten subscription is never released.
    pub fn forget(self) {
        mem::forget(self);
    }

    fn detach_all(&mut self) {
        for link in mem::take(&mut self.links) {
            link.detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach_all();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("links", &self.links.len())
            .finish()
    }
}
