// ABOUTME: Immutable trait definitions - the declarative unit of composition.
// ABOUTME: A definition bundles data members, callable members, parents, and a constructor.

mod builder;

pub use builder::TraitDefBuilder;

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

use crate::dispatch::Receiver;
use crate::mro::LinearizeError;
use crate::types::{TraitId, TraitName, TypeName};

/// Error type returned by trait-author method and constructor bodies.
///
/// Bodies are arbitrary user code, so errors are propagated verbatim as
/// boxed errors inside the crate's typed wrappers.
pub type MethodError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A composed callable member. Invoked with the bound receiver and
/// positional arguments.
pub type MethodFn = Arc<dyn Fn(&Receiver, &[Value]) -> Result<Value, MethodError> + Send + Sync>;

/// A trait constructor. Runs against the target after members are grafted.
pub type CtorFn = Arc<dyn Fn(&Receiver, &[Value]) -> Result<(), MethodError> + Send + Sync>;

/// Errors raised while building a trait definition.
#[derive(Debug, Error)]
pub enum DefError {
    #[error("invalid trait name: {0}")]
    InvalidName(#[from] crate::types::TraitNameError),

    #[error("invalid sealed base type: {0}")]
    InvalidSealedBase(#[from] crate::types::TypeNameError),

    #[error("member '{0}' declared more than once")]
    DuplicateMember(String),

    #[error("trait '{0}' listed more than once as a parent")]
    DuplicateParent(TraitName),
}

/// A declared member of a trait definition.
#[derive(Clone)]
pub enum Member {
    /// A data member with its declared default value.
    Data(Value),
    /// A callable member.
    Method(MethodFn),
}

impl Member {
    pub fn is_data(&self) -> bool {
        matches!(self, Member::Data(_))
    }

    pub fn is_method(&self) -> bool {
        matches!(self, Member::Method(_))
    }
}

impl std::fmt::Debug for Member {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Member::Data(value) => f.debug_tuple("Data").field(value).finish(),
            Member::Method(_) => f.debug_tuple("Method").field(&"<fn>").finish(),
        }
    }
}

/// Memoized strict ancestry (resolution order minus the definition itself).
pub(crate) type AncestryCell = OnceLock<Result<Vec<Arc<TraitDef>>, LinearizeError>>;

/// An immutable bundle of data and behavior with declared parent traits.
///
/// Definitions are built once through [`TraitDefBuilder`] and shared as
/// `Arc<TraitDef>`; many targets may be composed from the same definition.
/// Parents are owned `Arc`s, so the ancestor graph is acyclic by
/// construction.
pub struct TraitDef {
    id: TraitId,
    name: TraitName,
    parents: Vec<Arc<TraitDef>>,
    members: BTreeMap<String, Member>,
    constructor: Option<CtorFn>,
    sealed_base: Option<TypeName>,
    ancestry: AncestryCell,
}

impl TraitDef {
    /// Start building a definition with the given name.
    pub fn builder(name: impl Into<String>) -> TraitDefBuilder {
        TraitDefBuilder::new(name)
    }

    pub(crate) fn from_parts(
        name: TraitName,
        parents: Vec<Arc<TraitDef>>,
        members: BTreeMap<String, Member>,
        constructor: Option<CtorFn>,
        sealed_base: Option<TypeName>,
    ) -> Self {
        Self {
            id: crate::types::next_trait_id(),
            name,
            parents,
            members,
            constructor,
            sealed_base,
            ancestry: OnceLock::new(),
        }
    }

    /// Process-unique identity assigned at build time.
    pub fn id(&self) -> TraitId {
        self.id
    }

    pub fn name(&self) -> &TraitName {
        &self.name
    }

    /// Declared parents, in declaration order.
    pub fn parents(&self) -> &[Arc<TraitDef>] {
        &self.parents
    }

    /// Declared members, ordered by name.
    pub fn members(&self) -> impl Iterator<Item = (&str, &Member)> {
        self.members.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    pub fn constructor(&self) -> Option<&CtorFn> {
        self.constructor.as_ref()
    }

    /// Sealed base type this trait extends, if it declares one directly.
    pub fn sealed_base(&self) -> Option<&TypeName> {
        self.sealed_base.as_ref()
    }

    pub(crate) fn ancestry_cell(&self) -> &AncestryCell {
        &self.ancestry
    }
}

impl std::fmt::Debug for TraitDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraitDef")
            .field("id", &self.id)
            .field("name", &self.name)
            .field(
                "parents",
                &self.parents.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("members", &self.members.keys().collect::<Vec<_>>())
            .field("has_constructor", &self.constructor.is_some())
            .field("sealed_base", &self.sealed_base)
            .finish()
    }
}
