//! Explicit fresh/stale wrapper for derived values.
//!
//! Aggregates such as the total mass stored are derived from the ledgers.
//! Recomputing them on every read is wasteful on hot paths, so the store
//! keeps the last computed value in a [`Cached`] and marks it stale on every
//! mutation. Readers choose whether a stale value is acceptable.

/// A derived value together with whether it still reflects its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cached<T> {
    value: T,
    stale: bool,
}

impl<T: Clone> Cached<T> {
    /// Wrap a value known to be current.
    pub const fn fresh(value: T) -> Self {
        Self {
            value,
            stale: false,
        }
    }

    /// Wrap a placeholder that must be recomputed before it is trusted.
    pub const fn stale(value: T) -> Self {
        Self { value, stale: true }
    }

    /// Mark the value as out of date.
    pub const fn invalidate(&mut self) {
        self.stale = true;
    }

    /// Whether the value is out of date.
    pub const fn is_stale(&self) -> bool {
        self.stale
    }

    /// The last computed value, current or not.
    pub const fn peek(&self) -> &T {
        &self.value
    }

    /// Return the value, recomputing it first if it is stale and the caller
    /// does not accept a stale read.
    pub fn get(&mut self, allow_stale: bool, recompute: impl FnOnce() -> T) -> T {
        if self.stale && !allow_stale {
            self.value = recompute();
            self.stale = false;
        }
        self.value.clone()
    }
}
