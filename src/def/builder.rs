// ABOUTME: Builder for trait definitions.
// ABOUTME: Validates names and rejects duplicate members or parents at build time.

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{CtorFn, DefError, Member, MethodError, MethodFn, TraitDef};
use crate::dispatch::Receiver;
use crate::types::{TraitName, TypeName};

/// Builds an immutable [`TraitDef`].
///
/// Members and parents are collected in declaration order; all validation
/// happens in [`build`](Self::build) so declarations read as one chain.
pub struct TraitDefBuilder {
    name: String,
    parents: Vec<Arc<TraitDef>>,
    members: Vec<(String, Member)>,
    constructor: Option<CtorFn>,
    sealed_base: Option<String>,
}

impl TraitDefBuilder {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parents: Vec::new(),
            members: Vec::new(),
            constructor: None,
            sealed_base: None,
        }
    }

    /// Declare a parent trait. Declaration order is the local precedence
    /// order used by linearization.
    pub fn parent(mut self, parent: &Arc<TraitDef>) -> Self {
        self.parents.push(parent.clone());
        self
    }

    /// Declare a data member with its default value.
    pub fn data(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.members
            .push((name.into(), Member::Data(value.into())));
        self
    }

    /// Declare a callable member.
    pub fn method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Receiver, &[Value]) -> Result<Value, MethodError> + Send + Sync + 'static,
    {
        let func: MethodFn = Arc::new(f);
        self.members.push((name.into(), Member::Method(func)));
        self
    }

    /// Declare the constructor. Runs only when this trait is the one being
    /// composed; ancestor constructors run only via explicit super dispatch.
    pub fn constructor<F>(mut self, f: F) -> Self
    where
        F: Fn(&Receiver, &[Value]) -> Result<(), MethodError> + Send + Sync + 'static,
    {
        self.constructor = Some(Arc::new(f));
        self
    }

    /// Declare the sealed host type this trait extends. Consulted by the
    /// sealed-type adapter when manufacturing a fresh target.
    pub fn sealed_base(mut self, type_name: impl Into<String>) -> Self {
        self.sealed_base = Some(type_name.into());
        self
    }

    pub fn build(self) -> Result<Arc<TraitDef>, DefError> {
        let name = TraitName::new(&self.name)?;

        let sealed_base = match self.sealed_base {
            Some(raw) => Some(TypeName::new(&raw)?),
            None => None,
        };

        for (i, parent) in self.parents.iter().enumerate() {
            if self.parents[..i].iter().any(|p| p.id() == parent.id()) {
                return Err(DefError::DuplicateParent(parent.name().clone()));
            }
        }

        let mut members = BTreeMap::new();
        for (member_name, member) in self.members {
            if members.insert(member_name.clone(), member).is_some() {
                return Err(DefError::DuplicateMember(member_name));
            }
        }

        Ok(Arc::new(TraitDef::from_parts(
            name,
            self.parents,
            members,
            self.constructor,
            sealed_base,
        )))
    }
}
