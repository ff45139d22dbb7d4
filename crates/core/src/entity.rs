//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Identity is storage-assigned: a freshly constructed entity has no id until it
/// is saved for the first time.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + Ord + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier, if the entity has been persisted.
    fn id(&self) -> Option<Self::Id>;

    /// Attach a storage-assigned identifier.
    fn assign_id(&mut self, id: Self::Id);

    fn is_new(&self) -> bool {
        self.id().is_none()
    }
}
