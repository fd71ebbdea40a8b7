//! Errors raised while wiring a graph together.

use thiserror::Error;

/// Errors that can occur when binding a [`Target`](crate::Target).
///
/// Both variants signal a programming error in the wiring code: a target accepts exactly one
/// value for its whole lifetime.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindError {
    /// A second value was bound to a target that is already bound.
    #[error("Already bound!")]
    AlreadyBound,
    /// A bound target was cleared.
    #[error("Once bound, never unbound!")]
    NeverUnbound,
}

/// A resource the graph depends on could not be found at the boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Required {0} is missing.")]
pub struct MissingResource(pub String);

/// Asserts that an external resource (an element, a slot, a context) exists.
///
/// ```rust
/// use gear::{required, MissingResource};
///
/// let canvas: Option<&str> = None;
/// let err = required(canvas, "canvas element").unwrap_err();
/// assert_eq!(err, MissingResource("canvas element".into()));
/// ```
pub fn required<T>(
    resource: Option<T>,
    what: impl Into<String>,
) -> Result<T, MissingResource> {
    resource.ok_or_else(|| MissingResource(what.into()))
}
