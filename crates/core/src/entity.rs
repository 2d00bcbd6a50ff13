//! Entity trait: identity that survives edits of every other field.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
