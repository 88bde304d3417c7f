// ABOUTME: The target instance - the sealed object traits are grafted onto.
// ABOUTME: A cheaply cloneable handle over a slot table; identity never changes across composition.

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::def::{Member, MethodFn, TraitDef};
use crate::dispatch::{DispatchError, Receiver};
use crate::fallback::FallbackChain;
use crate::identity::CapabilitySet;
use crate::types::{TargetId, TraitId, TraitName, TypeName};

/// A bound member slot on a target.
///
/// Methods always carry the trait that declared them; that tag is what makes
/// super dispatch possible without inspecting the call stack. Data written
/// directly through [`Target::set`] has no owning trait.
#[derive(Clone)]
pub(crate) enum Slot {
    Data {
        owner: Option<Arc<TraitDef>>,
        value: Value,
    },
    Method {
        owner: Arc<TraitDef>,
        func: MethodFn,
    },
}

struct TargetInner {
    sealed_type: TypeName,
    slots: HashMap<String, Slot>,
    capabilities: CapabilitySet,
    fallbacks: FallbackChain,
}

/// Handle to a target instance.
///
/// Clones share the same underlying instance; every "composed result" is the
/// same target, not a copy. Locks are held only across individual slot reads
/// and writes, never across a method invocation, so composed methods may
/// freely re-enter the same target.
///
/// Concurrent composition of one target is a caller precondition, not
/// something this type serializes.
pub struct Target {
    id: TargetId,
    inner: Arc<RwLock<TargetInner>>,
}

impl Clone for Target {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: self.inner.clone(),
        }
    }
}

impl Target {
    /// A fresh, empty instance of the given sealed type.
    pub fn new(sealed_type: TypeName) -> Self {
        Self {
            id: crate::types::next_target_id(),
            inner: Arc::new(RwLock::new(TargetInner {
                sealed_type,
                slots: HashMap::new(),
                capabilities: CapabilitySet::default(),
                fallbacks: FallbackChain::default(),
            })),
        }
    }

    pub fn id(&self) -> TargetId {
        self.id
    }

    /// The original sealed type; invariant for the life of the target.
    pub fn sealed_type(&self) -> TypeName {
        self.inner.read().sealed_type.clone()
    }

    /// Whether two handles refer to the same instance.
    pub fn ptr_eq(&self, other: &Target) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Whether the target itself exposes `name`, ignoring fallbacks.
    pub fn has_own(&self, name: &str) -> bool {
        self.inner.read().slots.contains_key(name)
    }

    /// Whether `name` resolves on the target or any attached fallback.
    pub fn has(&self, name: &str) -> bool {
        if self.has_own(name) {
            return true;
        }
        self.fallback_helpers()
            .iter()
            .any(|helper| helper.has(name))
    }

    /// Read a data member. Falls back to attached helpers on a local miss.
    pub fn get(&self, name: &str) -> Result<Value, DispatchError> {
        {
            let inner = self.inner.read();
            match inner.slots.get(name) {
                Some(Slot::Data { value, .. }) => return Ok(value.clone()),
                Some(Slot::Method { .. }) => {
                    return Err(DispatchError::NotData(name.to_string()));
                }
                None => {}
            }
        }

        match crate::fallback::find_provider(&self.fallback_helpers(), name) {
            Some(helper) => helper.get(name),
            None => Err(DispatchError::UnknownMember(name.to_string())),
        }
    }

    /// Write a data member directly on the target, shadowing any previous
    /// slot under that name.
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.inner.write().slots.insert(
            name.into(),
            Slot::Data {
                owner: None,
                value: value.into(),
            },
        );
    }

    /// Invoke a callable member, bound to this target's own state.
    ///
    /// Resolution is late: the slot is looked up at call time, so the most
    /// recently composed implementation wins. On a local miss the call is
    /// forwarded to the first fallback helper exposing the name and runs
    /// against that helper's state.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, DispatchError> {
        let bound = {
            let inner = self.inner.read();
            match inner.slots.get(name) {
                Some(Slot::Method { owner, func }) => Some((owner.clone(), func.clone())),
                Some(Slot::Data { .. }) => {
                    return Err(DispatchError::NotCallable(name.to_string()));
                }
                None => None,
            }
        };

        if let Some((owner, func)) = bound {
            tracing::trace!(
                "dispatching '{}' on target {} via trait '{}'",
                name,
                self.id,
                owner.name()
            );
            let receiver = Receiver::new(self.clone(), owner.clone());
            return (func.as_ref())(&receiver, args).map_err(|source| DispatchError::Method {
                member: name.to_string(),
                trait_name: owner.name().clone(),
                source,
            });
        }

        match crate::fallback::find_provider(&self.fallback_helpers(), name) {
            Some(helper) => helper.call(name, args),
            None => Err(DispatchError::UnknownMember(name.to_string())),
        }
    }

    /// Export the target's own data slots as a JSON object.
    pub fn snapshot(&self) -> Value {
        let inner = self.inner.read();
        let mut map = serde_json::Map::new();
        for (name, slot) in &inner.slots {
            if let Slot::Data { value, .. } = slot {
                map.insert(name.clone(), value.clone());
            }
        }
        Value::Object(map)
    }

    /// Capability check: has this target been composed with `def`,
    /// directly or through an ancestor of a composed trait?
    pub fn is_instance_of(&self, def: &TraitDef) -> bool {
        self.inner.read().capabilities.contains(def.id())
    }

    /// Capability check against the original sealed type.
    pub fn is_sealed_instance(&self, type_name: &TypeName) -> bool {
        self.inner.read().sealed_type == *type_name
    }

    /// Number of distinct trait capabilities recorded on this target.
    pub fn capability_count(&self) -> usize {
        self.inner.read().capabilities.len()
    }

    /// Graft a single member, recording the declaring trait in the slot.
    pub(crate) fn graft(&self, name: &str, owner: &Arc<TraitDef>, member: &Member) {
        let slot = match member {
            Member::Data(value) => Slot::Data {
                owner: Some(owner.clone()),
                value: value.clone(),
            },
            Member::Method(func) => Slot::Method {
                owner: owner.clone(),
                func: func.clone(),
            },
        };
        self.inner.write().slots.insert(name.to_string(), slot);
    }

    /// The trait currently owning the slot under `name`, if any.
    pub(crate) fn slot_owner(&self, name: &str) -> Option<TraitName> {
        match self.inner.read().slots.get(name)? {
            Slot::Data { owner, .. } => owner.as_ref().map(|def| def.name().clone()),
            Slot::Method { owner, .. } => Some(owner.name().clone()),
        }
    }

    /// Names of all slots currently on the target.
    pub(crate) fn own_member_names(&self) -> Vec<String> {
        self.inner.read().slots.keys().cloned().collect()
    }

    pub(crate) fn add_capabilities(&self, ids: impl IntoIterator<Item = TraitId>) {
        let mut inner = self.inner.write();
        for id in ids {
            inner.capabilities.insert(id);
        }
    }

    pub(crate) fn attach_fallback_helper(&self, helper: &Target) {
        self.inner.write().fallbacks.attach(helper.clone());
    }

    fn fallback_helpers(&self) -> Vec<Target> {
        self.inner.read().fallbacks.snapshot()
    }
}

impl std::fmt::Debug for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("Target")
            .field("id", &self.id)
            .field("sealed_type", &inner.sealed_type)
            .field("members", &inner.slots.len())
            .field("capabilities", &inner.capabilities.len())
            .field("fallbacks", &inner.fallbacks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn empty_target() -> Target {
        Target::new(TypeName::new("host.Record").unwrap())
    }

    #[test]
    fn set_then_get_round_trips() {
        let target = empty_target();
        target.set("zero", json!("zero"));
        assert_eq!(target.get("zero").unwrap(), json!("zero"));
    }

    #[test]
    fn get_unknown_member_fails() {
        let target = empty_target();
        let err = target.get("missing").unwrap_err();
        assert!(matches!(err, DispatchError::UnknownMember(name) if name == "missing"));
    }

    #[test]
    fn call_on_data_slot_is_not_callable() {
        let target = empty_target();
        target.set("x", 1);
        let err = target.call("x", &[]).unwrap_err();
        assert!(matches!(err, DispatchError::NotCallable(name) if name == "x"));
    }

    #[test]
    fn clones_share_identity_and_state() {
        let target = empty_target();
        let alias = target.clone();
        alias.set("shared", true);

        assert!(target.ptr_eq(&alias));
        assert_eq!(target.id(), alias.id());
        assert_eq!(target.get("shared").unwrap(), json!(true));
    }

    #[test]
    fn snapshot_exports_only_data_slots() {
        let target = empty_target();
        target.set("a", 1);
        target.set("b", "two");

        let snapshot = target.snapshot();
        assert_eq!(snapshot, json!({"a": 1, "b": "two"}));
    }

    #[test]
    fn sealed_type_is_invariant() {
        let host = TypeName::new("ui.View").unwrap();
        let target = Target::new(host.clone());
        assert!(target.is_sealed_instance(&host));
        assert!(!target.is_sealed_instance(&TypeName::new("ui.Button").unwrap()));
    }
}
