//! The single apply primitive behind `save`, `add_to`, `remove_from`, and
//! `set_value`.
//!
//! Every apply operation has the same shape: if the key is absent it is
//! created with a mutation-specific default, otherwise the existing value is
//! combined with the mutation. Arithmetic wraps on overflow (two's
//! complement), matching native integer behavior without panicking.

/// A value change to apply to one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// Absent: `1`. Present: `+1`.
    Increment,
    /// Absent: `amount`. Present: `+amount`.
    Add(i64),
    /// Absent: `-amount`. Present: `-amount`.
    Subtract(i64),
    /// Absent or present: `amount`.
    Set(i64),
}

impl Mutation {
    /// The value a key takes when the mutation creates it.
    pub const fn on_create(self) -> i64 {
        match self {
            Self::Increment => 1,
            Self::Add(amount) | Self::Set(amount) => amount,
            Self::Subtract(amount) => amount.wrapping_neg(),
        }
    }

    /// The value a key takes when the mutation is applied to `current`.
    pub const fn combine(self, current: i64) -> i64 {
        match self {
            Self::Increment => current.wrapping_add(1),
            Self::Add(amount) => current.wrapping_add(amount),
            Self::Subtract(amount) => current.wrapping_sub(amount),
            Self::Set(amount) => amount,
        }
    }

    /// Resolve the post-mutation value given the current value, if any.
    pub fn resolve(self, current: Option<i64>) -> i64 {
        current.map_or_else(|| self.on_create(), |value| self.combine(value))
    }
}
