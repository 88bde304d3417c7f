// ABOUTME: Diagnostics accumulator for naming conflicts during composition.
// ABOUTME: Conflicts are reported without blocking composition under the Warn policy.

use crate::types::TraitName;

/// Collects naming conflicts observed while composing.
#[derive(Default)]
pub struct Diagnostics {
    conflicts: Vec<Conflict>,
}

impl Diagnostics {
    /// Record a conflict, auto-logging it via tracing.
    pub(crate) fn record(&mut self, conflict: Conflict) {
        match &conflict.displaced {
            Some(displaced) => tracing::warn!(
                "member '{}' from trait '{}' overrides the implementation from trait '{}'",
                conflict.member,
                conflict.winner,
                displaced
            ),
            None => tracing::warn!(
                "member '{}' from trait '{}' overrides an existing target member",
                conflict.member,
                conflict.winner
            ),
        }
        self.conflicts.push(conflict);
    }

    /// All conflicts recorded so far.
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// A naming conflict: a grafted member overwrote a name the target already
/// exposed when composition began.
#[derive(Debug, Clone)]
pub struct Conflict {
    /// The contested member name.
    pub member: String,
    /// The trait whose declaration won.
    pub winner: TraitName,
    /// The trait that previously owned the slot, when it was trait-owned.
    pub displaced: Option<TraitName>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> TraitName {
        TraitName::new(s).unwrap()
    }

    #[test]
    fn diagnostics_start_empty() {
        let diag = Diagnostics::default();
        assert!(!diag.has_conflicts());
        assert!(diag.conflicts().is_empty());
    }

    #[test]
    fn diagnostics_collect_conflicts() {
        let mut diag = Diagnostics::default();
        diag.record(Conflict {
            member: "greet".to_string(),
            winner: name("Loud"),
            displaced: Some(name("Quiet")),
        });
        diag.record(Conflict {
            member: "tint".to_string(),
            winner: name("Tinted"),
            displaced: None,
        });

        assert!(diag.has_conflicts());
        assert_eq!(diag.conflicts().len(), 2);
        assert_eq!(diag.conflicts()[0].member, "greet");
    }
}
