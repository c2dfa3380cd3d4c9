//! Identity for stored records.

/// A record whose id is assigned by its store and never changes afterwards.
pub trait Entity {
    type Id: Copy + Ord + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> Self::Id;
}
