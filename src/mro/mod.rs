// ABOUTME: C3 linearization of trait ancestor graphs.
// ABOUTME: Produces the single resolution order shared by composition and super dispatch.

use nonempty::NonEmpty;
use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;

use crate::def::TraitDef;
use crate::types::{TraitId, TraitName};

/// Errors raised while linearizing a trait's ancestor graph.
///
/// `Clone` because the result is memoized per definition and handed out to
/// every later caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LinearizeError {
    #[error("trait graph contains a cycle through '{trait_name}'")]
    Cycle { trait_name: TraitName },

    #[error(
        "cannot linearize '{trait_name}': parent declarations produce inconsistent precedence"
    )]
    Inconsistent { trait_name: TraitName },
}

/// A trait's resolution order: the definition itself first, then its
/// ancestors, each exactly once, most-derived first.
#[derive(Debug, Clone)]
pub struct Mro {
    order: NonEmpty<Arc<TraitDef>>,
}

impl Mro {
    /// The most-derived definition; always the trait that was linearized.
    pub fn head(&self) -> &Arc<TraitDef> {
        &self.order.head
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, id: TraitId) -> bool {
        self.iter().any(|def| def.id() == id)
    }

    /// Most-derived first: the search order for super dispatch.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<TraitDef>> {
        std::iter::once(&self.order.head).chain(self.order.tail.iter())
    }

    /// Least-derived first: the application order for composition, so that
    /// more-derived members overwrite ancestor members.
    pub fn iter_rev(&self) -> impl Iterator<Item = &Arc<TraitDef>> {
        self.order
            .tail
            .iter()
            .rev()
            .chain(std::iter::once(&self.order.head))
    }

    /// Definitions strictly after the first occurrence of `id`.
    ///
    /// Empty when `id` is last or absent; super dispatch treats both as the
    /// terminal case.
    pub fn after(&self, id: TraitId) -> impl Iterator<Item = &Arc<TraitDef>> {
        self.iter().skip_while(move |def| def.id() != id).skip(1)
    }
}

/// Compute the resolution order of a trait definition.
///
/// C3: the definition itself, then the monotonic merge of each parent's own
/// resolution order and the local parent list. Memoized per definition, so
/// repeated calls are cheap and deterministic.
pub fn linearize(def: &Arc<TraitDef>) -> Result<Mro, LinearizeError> {
    let ancestors = def
        .ancestry_cell()
        .get_or_init(|| compute_ancestry(def))
        .clone()?;

    Ok(Mro {
        order: NonEmpty {
            head: def.clone(),
            tail: ancestors,
        },
    })
}

/// Strict ancestors of `def` in resolution order (everything after `def`).
fn compute_ancestry(def: &Arc<TraitDef>) -> Result<Vec<Arc<TraitDef>>, LinearizeError> {
    let mut sequences: Vec<VecDeque<Arc<TraitDef>>> = Vec::new();
    for parent in def.parents() {
        sequences.push(linearize(parent)?.iter().cloned().collect());
    }
    sequences.push(def.parents().iter().cloned().collect());

    // Defensive: an Arc-built graph cannot cycle, but a definition showing
    // up in its own ancestry must never produce a bogus order.
    if sequences
        .iter()
        .flatten()
        .any(|ancestor| ancestor.id() == def.id())
    {
        return Err(LinearizeError::Cycle {
            trait_name: def.name().clone(),
        });
    }

    merge(sequences, def.name())
}

/// C3 monotonic merge: repeatedly emit the first head that appears in no
/// sequence's tail. Stalling means the parent orders are irreconcilable.
fn merge(
    mut sequences: Vec<VecDeque<Arc<TraitDef>>>,
    trait_name: &TraitName,
) -> Result<Vec<Arc<TraitDef>>, LinearizeError> {
    let mut out = Vec::new();

    loop {
        sequences.retain(|seq| !seq.is_empty());
        if sequences.is_empty() {
            return Ok(out);
        }

        let candidate = sequences
            .iter()
            .filter_map(|seq| seq.front())
            .find(|head| {
                sequences
                    .iter()
                    .all(|seq| seq.iter().skip(1).all(|def| def.id() != head.id()))
            })
            .cloned();

        match candidate {
            Some(next) => {
                for seq in &mut sequences {
                    if seq.front().is_some_and(|head| head.id() == next.id()) {
                        seq.pop_front();
                    }
                }
                out.push(next);
            }
            None => {
                return Err(LinearizeError::Inconsistent {
                    trait_name: trait_name.clone(),
                });
            }
        }
    }
}
