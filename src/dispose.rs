//! Dispose: the ownership contract shared by every container.
//!
//! A container is bound to one `Dispose<T>` for its whole lifetime. Whenever
//! a stored value leaves the container without being handed back to the
//! caller (removal, overwrite, clear, teardown) the container passes it to
//! `dispose` exactly once.

/// Destructor capability for owned values of type `T`.
pub trait Dispose<T> {
    /// Consume `value`. Called exactly once per value that leaves a
    /// container without being returned to the caller.
    fn dispose(&self, value: T);
}

/// Dispose by dropping. The default for every container.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct DropValue;

impl<T> Dispose<T> for DropValue {
    #[inline]
    fn dispose(&self, value: T) {
        drop(value);
    }
}

impl<T, F> Dispose<T> for F
where
    F: Fn(T),
{
    #[inline]
    fn dispose(&self, value: T) {
        self(value)
    }
}
