// ABOUTME: Bound receivers and super dispatch along the resolution order.
// ABOUTME: Replaces call-stack introspection with an explicit declaring-trait tag.

use serde_json::Value;
use std::sync::Arc;

use crate::def::{MethodError, TraitDef};
use crate::mro::{LinearizeError, Mro, linearize};
use crate::target::Target;
use crate::types::TraitName;

/// Errors raised by member lookup and dispatch.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// No member under that name, locally or through fallbacks.
    #[error("no member named '{0}'")]
    UnknownMember(String),

    /// The member exists but is a data slot.
    #[error("member '{0}' is not callable")]
    NotCallable(String),

    /// The member exists but is a method slot.
    #[error("member '{0}' is not a data member")]
    NotData(String),

    /// No trait after the calling one declares the member. The caller holds
    /// the least-derived implementation; there is nothing further to defer to.
    #[error("no implementation of '{member}' after trait '{calling}'")]
    NoSuchSuperMember { member: String, calling: TraitName },

    /// Linearization failed while building a super proxy.
    #[error(transparent)]
    Linearize(#[from] LinearizeError),

    /// A method body failed; the underlying error is propagated verbatim.
    #[error("method '{member}' of trait '{trait_name}' failed: {source}")]
    Method {
        member: String,
        trait_name: TraitName,
        #[source]
        source: MethodError,
    },

    /// A constructor reached through super dispatch failed.
    #[error("constructor of trait '{trait_name}' failed: {source}")]
    Constructor {
        trait_name: TraitName,
        #[source]
        source: MethodError,
    },
}

/// The bound context every composed callable receives.
///
/// Pairs the shared target with the trait that declared the currently
/// executing member. That explicit tag, captured at composition time, is
/// what lets super dispatch know where in the chain it stands.
pub struct Receiver {
    target: Target,
    declaring: Arc<TraitDef>,
}

impl Receiver {
    pub(crate) fn new(target: Target, declaring: Arc<TraitDef>) -> Self {
        Self { target, declaring }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// The trait whose member body is currently executing.
    pub fn declaring_trait(&self) -> &Arc<TraitDef> {
        &self.declaring
    }

    /// Read a data member from the shared target.
    pub fn get(&self, name: &str) -> Result<Value, DispatchError> {
        self.target.get(name)
    }

    /// Write a data member on the shared target.
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.target.set(name, value);
    }

    /// Invoke a member on the shared target. Late-bound: resolves the most
    /// recently composed implementation, like a virtual call through `self`.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, DispatchError> {
        self.target.call(name, args)
    }

    /// Build the ephemeral super proxy for "the next implementation up the
    /// chain" relative to the declaring trait.
    pub fn superior(&self) -> Result<Super, DispatchError> {
        let order = linearize(&self.declaring)?;
        Ok(Super {
            target: self.target.clone(),
            calling: self.declaring.clone(),
            order,
        })
    }
}

impl std::fmt::Debug for Receiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Receiver")
            .field("target", &self.target.id())
            .field("declaring", self.declaring.name())
            .finish()
    }
}

/// Ephemeral super proxy: resolves members from traits strictly after the
/// calling trait in its own resolution order. Created per dispatch, holds no
/// persistent state.
pub struct Super {
    target: Target,
    calling: Arc<TraitDef>,
    order: Mro,
}

impl Super {
    /// Invoke the next implementation of `name` up the chain, bound to the
    /// same shared target. Traits that don't declare the member are skipped.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, DispatchError> {
        for def in self.order.after(self.calling.id()) {
            match def.member(name) {
                Some(crate::def::Member::Method(func)) => {
                    tracing::trace!(
                        "super dispatch of '{}' from '{}' resolved to '{}'",
                        name,
                        self.calling.name(),
                        def.name()
                    );
                    let receiver = Receiver::new(self.target.clone(), def.clone());
                    return (func.as_ref())(&receiver, args).map_err(|source| DispatchError::Method {
                        member: name.to_string(),
                        trait_name: def.name().clone(),
                        source,
                    });
                }
                Some(crate::def::Member::Data(_)) => {
                    return Err(DispatchError::NotCallable(name.to_string()));
                }
                None => continue,
            }
        }

        Err(DispatchError::NoSuchSuperMember {
            member: name.to_string(),
            calling: self.calling.name().clone(),
        })
    }

    /// Read the next declaration of a data member up the chain.
    ///
    /// Returns the *declared* default of the next trait, not the target's
    /// current slot, mirroring a class-attribute read through `super`.
    pub fn get(&self, name: &str) -> Result<Value, DispatchError> {
        for def in self.order.after(self.calling.id()) {
            match def.member(name) {
                Some(crate::def::Member::Data(value)) => return Ok(value.clone()),
                Some(crate::def::Member::Method(_)) => {
                    return Err(DispatchError::NotData(name.to_string()));
                }
                None => continue,
            }
        }

        Err(DispatchError::NoSuchSuperMember {
            member: name.to_string(),
            calling: self.calling.name().clone(),
        })
    }

    /// Run the next ancestor constructor up the chain against the shared
    /// target. A no-op when no ancestor declares one, so root traits can
    /// defer unconditionally.
    pub fn construct(&self, args: &[Value]) -> Result<(), DispatchError> {
        for def in self.order.after(self.calling.id()) {
            if let Some(ctor) = def.constructor() {
                tracing::trace!(
                    "super constructor from '{}' resolved to '{}'",
                    self.calling.name(),
                    def.name()
                );
                let receiver = Receiver::new(self.target.clone(), def.clone());
                return (ctor.as_ref())(&receiver, args).map_err(|source| DispatchError::Constructor {
                    trait_name: def.name().clone(),
                    source,
                });
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Super {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Super")
            .field("target", &self.target.id())
            .field("calling", self.calling.name())
            .field("chain_len", &self.order.len())
            .finish()
    }
}
