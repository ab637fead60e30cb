//! Proximity association
//!
//! An email picks up the phones of the closest enclosing element whose
//! rendered text holds at least one valid phone. The climb starts at the
//! email's context anchor and is bounded by [`AssociationPolicy::max_depth`].
//! Claims are global to the run: a phone belongs to the first email (in
//! document order) that reaches it.

use crate::config::{AssociationPolicy, PhoneHeuristics};
use crate::dom::DomTree;
use crate::extraction::aggregate::ContactGroup;
use crate::extraction::context::ScanContext;
use crate::extraction::patterns::EmailCandidate;
use tracing::trace;

/// Links emails to nearby phones
pub struct ProximityAssociator<'a, T: DomTree> {
    tree: &'a T,
    policy: &'a AssociationPolicy,
    heuristics: &'a PhoneHeuristics,
}

impl<'a, T: DomTree> ProximityAssociator<'a, T> {
    /// Create an associator over `tree`
    pub fn new(tree: &'a T, policy: &'a AssociationPolicy, heuristics: &'a PhoneHeuristics) -> Self {
        Self {
            tree,
            policy,
            heuristics,
        }
    }

    /// Build the group of a first-seen email, claiming its phones
    pub fn associate(
        &self,
        email: &EmailCandidate<T::Node>,
        ctx: &mut ScanContext<T::Node>,
    ) -> ContactGroup {
        let mut phones = Vec::new();
        let mut node = Some(email.anchor);

        for level in 0..self.policy.max_depth {
            let Some(current) = node else { break };

            let found = ctx
                .phones_at(current, || {
                    let text = self.tree.text_of(current);
                    self.heuristics
                        .valid_phones(&text)
                        .into_iter()
                        .map(String::from)
                        .collect()
                })
                .to_vec();

            if !found.is_empty() {
                trace!(
                    "{} reaches {} phones at level {}",
                    email.canonical,
                    found.len(),
                    level
                );
                for phone in found {
                    if ctx.claim(&phone) {
                        phones.push(phone);
                    }
                }
                if self.policy.stop_at_first_match {
                    break;
                }
            }

            node = self.tree.parent(current);
        }

        ContactGroup::new(email.raw.clone(), phones)
    }
}
