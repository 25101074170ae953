//! Identity of records held in keyed collections.

/// A record with a stable identifier.
///
/// The local item store locates, replaces and removes elements through this
/// trait rather than comparing whole records.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
