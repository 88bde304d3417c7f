// ABOUTME: Phantom-typed identifiers for trait definitions and target instances.
// ABOUTME: Prevents accidental swapping of definition and target ids.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

/// Marker types for phantom type parameters.
/// Using empty enums prevents instantiation and requires no trait bounds.
pub enum TraitMarker {}
pub enum TargetMarker {}

/// A type-safe process-unique identifier.
///
/// Using phantom types, this ensures you can't accidentally pass a `TraitId`
/// where a `TargetId` is expected, catching bugs at compile time.
#[must_use = "ids identify live definitions or targets and should not be ignored"]
pub struct Id<T> {
    value: u64,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    pub(crate) fn new(value: u64) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub fn as_u64(&self) -> u64 {
        self.value
    }
}

static NEXT_TRAIT_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_TARGET_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate the next trait definition id. Never reused within a process.
pub(crate) fn next_trait_id() -> TraitId {
    Id::new(NEXT_TRAIT_ID.fetch_add(1, Ordering::Relaxed))
}

/// Allocate the next target instance id. Never reused within a process.
pub(crate) fn next_target_id() -> TargetId {
    Id::new(NEXT_TARGET_ID.fetch_add(1, Ordering::Relaxed))
}

// Manual trait implementations that don't require T to implement the trait.
// This is necessary because T is only used as a phantom type marker.

impl<T> std::fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Id").field("value", &self.value).finish()
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> std::fmt::Display for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u64::deserialize(deserializer)?;
        Ok(Self::new(value))
    }
}

pub type TraitId = Id<TraitMarker>;
pub type TargetId = Id<TargetMarker>;
