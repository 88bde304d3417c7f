// ABOUTME: The composer - grafts a trait definition and its ancestry onto a target.
// ABOUTME: Applies members in resolution order and runs the requested trait's constructor.

mod diagnostics;

pub use diagnostics::{Conflict, Diagnostics};

use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

use crate::def::{MethodError, TraitDef};
use crate::dispatch::Receiver;
use crate::mro::{LinearizeError, linearize};
use crate::target::Target;
use crate::types::TraitName;

/// Errors raised during composition.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    /// The trait's ancestor graph could not be linearized. Raised before
    /// any mutation of the target.
    #[error(transparent)]
    Linearize(#[from] LinearizeError),

    /// The requested trait's constructor failed. Members grafted before the
    /// constructor ran remain on the target.
    #[error("constructor of trait '{trait_name}' failed: {source}")]
    Constructor {
        trait_name: TraitName,
        #[source]
        source: MethodError,
    },

    /// A member would overwrite one the target already exposed, and the
    /// composer was configured to deny conflicts.
    #[error("member '{member}' from trait '{trait_name}' conflicts with an existing member")]
    Conflict { member: String, trait_name: TraitName },
}

/// How to treat a grafted name the target already exposed before this
/// composition began. Overrides *within* one composition (a derived trait
/// shadowing its own ancestor) are normal resolution, never conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Last composition wins, silently. The default.
    #[default]
    Silent,
    /// Last composition wins; every conflict is recorded and logged.
    Warn,
    /// Fail before the conflicting write.
    Deny,
}

/// Composition configuration, threaded explicitly into the composer rather
/// than read from process-wide state.
#[derive(Debug, Clone, Default)]
pub struct ComposeOptions {
    pub conflicts: ConflictPolicy,
}

/// Grafts trait definitions onto targets and accumulates conflict
/// diagnostics across compositions.
#[derive(Default)]
pub struct Composer {
    options: ComposeOptions,
    diagnostics: Diagnostics,
}

impl Composer {
    pub fn new(options: ComposeOptions) -> Self {
        Self {
            options,
            diagnostics: Diagnostics::default(),
        }
    }

    /// Conflicts recorded so far under [`ConflictPolicy::Warn`].
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Graft `def` and its ancestry onto `target`.
    ///
    /// Returns the same target handle, so the result of one composition can
    /// be the target of the next. Members are applied least-derived first;
    /// more-derived declarations overwrite. Only `def`'s own constructor
    /// runs - ancestor constructors run solely through explicit super
    /// dispatch from inside it.
    pub fn compose(
        &mut self,
        target: &Target,
        def: &Arc<TraitDef>,
        args: &[Value],
    ) -> Result<Target, ComposeError> {
        let order = linearize(def)?;

        tracing::debug!(
            "composing trait '{}' ({} layers) onto target {}",
            def.name(),
            order.len(),
            target.id()
        );

        // Names the target exposed before this call; overwriting one of
        // these is a naming conflict under the configured policy. Each name
        // conflicts once, attributed to the layer whose declaration wins
        // (the most derived one), and Deny aborts before any graft.
        let preexisting: HashSet<String> = target.own_member_names().into_iter().collect();
        let mut reported: HashSet<&str> = HashSet::new();
        for layer in order.iter() {
            for (name, _) in layer.members() {
                if preexisting.contains(name) && reported.insert(name) {
                    self.report_conflict(target, layer, name)?;
                }
            }
        }

        for layer in order.iter_rev() {
            for (name, member) in layer.members() {
                target.graft(name, layer, member);
            }
        }

        target.add_capabilities(order.iter().map(|layer| layer.id()));

        if let Some(ctor) = def.constructor() {
            let receiver = Receiver::new(target.clone(), def.clone());
            (ctor.as_ref())(&receiver, args).map_err(|source| ComposeError::Constructor {
                trait_name: def.name().clone(),
                source,
            })?;
        }

        Ok(target.clone())
    }

    fn report_conflict(
        &mut self,
        target: &Target,
        layer: &Arc<TraitDef>,
        name: &str,
    ) -> Result<(), ComposeError> {
        match self.options.conflicts {
            ConflictPolicy::Silent => Ok(()),
            ConflictPolicy::Warn => {
                self.diagnostics.record(Conflict {
                    member: name.to_string(),
                    winner: layer.name().clone(),
                    displaced: target.slot_owner(name),
                });
                Ok(())
            }
            ConflictPolicy::Deny => Err(ComposeError::Conflict {
                member: name.to_string(),
                trait_name: layer.name().clone(),
            }),
        }
    }
}

/// One-shot composition with default options (silent last-wins conflicts).
pub fn compose(target: &Target, def: &Arc<TraitDef>, args: &[Value]) -> Result<Target, ComposeError> {
    Composer::default().compose(target, def, args)
}
