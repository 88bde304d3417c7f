// ABOUTME: Deferred/proxy composition - forward missed lookups to helper objects.
// ABOUTME: Helpers keep their own state; the first attached helper wins per name.

use crate::target::Target;

/// Ordered fallback helpers attached to a target.
///
/// Unlike eager composition this mode is not linearized: helpers are
/// consulted in attach order only after a local lookup misses, and a name
/// already present on the target is never overridden.
#[derive(Default)]
pub(crate) struct FallbackChain {
    helpers: Vec<Target>,
}

impl FallbackChain {
    pub(crate) fn attach(&mut self, helper: Target) {
        self.helpers.push(helper);
    }

    pub(crate) fn snapshot(&self) -> Vec<Target> {
        self.helpers.clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.helpers.len()
    }
}

/// First helper exposing `name`, in attach order.
pub(crate) fn find_provider(helpers: &[Target], name: &str) -> Option<Target> {
    helpers.iter().find(|helper| helper.has(name)).cloned()
}

/// Attach `helper` as a fallback of `target`.
///
/// Lookups that miss on `target` are forwarded to `helper`, and forwarded
/// calls run against the helper's own state rather than the target's. Two
/// divergent state sets are the deliberate trade-off of this mode; use
/// [`compose`](crate::compose::compose) when state must be shared.
///
/// Attaching a target to itself (directly or through a helper cycle) is a
/// caller error and makes lookups on missing names non-terminating.
pub fn attach_fallback(target: &Target, helper: &Target) {
    tracing::debug!(
        "attaching fallback helper {} to target {}",
        helper.id(),
        target.id()
    );
    target.attach_fallback_helper(helper);
}
