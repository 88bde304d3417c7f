// ABOUTME: Capability tags and the identity shim for composed targets.
// ABOUTME: Lets external type checks keep succeeding for every composed trait.

use std::collections::HashSet;

use crate::def::TraitDef;
use crate::target::Target;
use crate::types::TraitId;

/// The set of trait identities a target has been composed with.
///
/// Grows monotonically: composition inserts the whole resolution order, and
/// nothing ever removes a tag. Membership is idempotent, so composing the
/// same trait twice records it once.
#[derive(Debug, Default, Clone)]
pub struct CapabilitySet {
    tags: HashSet<TraitId>,
}

impl CapabilitySet {
    /// Record a capability. Returns false when it was already present.
    pub fn insert(&mut self, id: TraitId) -> bool {
        self.tags.insert(id)
    }

    pub fn contains(&self, id: TraitId) -> bool {
        self.tags.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Identity shim: does `target` behave as an instance of `def`?
///
/// True when `def` was composed onto the target, directly or as an ancestor
/// of a composed trait. The target's concrete type never changes; callers
/// checking against the original sealed type use
/// [`Target::is_sealed_instance`] instead.
pub fn is_instance_of(target: &Target, def: &TraitDef) -> bool {
    target.is_instance_of(def)
}
