//! Interaction registry and matching engine.
//!
//! The registry holds the expectation set for the current test scope plus
//! the deduplicated set accumulated across the whole run. Matching against
//! the scoped set is also the point of usage accounting: the unique winner
//! of a match gets its usage count bumped, and verification later asserts
//! every scoped interaction was used exactly once.

use super::types::{HttpMethod, Interaction, MatchError, RegistrationError, VerificationError};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

/// Registry of expected interactions for one mock-server instance.
///
/// Registration and clearing take the write lock; matching takes the read
/// lock and bumps the winner's atomic counter, so concurrent inbound
/// requests never lose an increment and never observe a scope
/// mid-mutation. State is never shared across instances.
pub struct InteractionRegistry {
    /// Expectation set of the current test scope. `None` means no scope
    /// was ever initialized, which matching reports differently from an
    /// initialized scope with no candidates.
    scoped: RwLock<Option<Vec<Arc<Interaction>>>>,
    /// All interactions seen this run, deduplicated by description plus
    /// provider states; source of the final contract document.
    accumulated: RwLock<Vec<Arc<Interaction>>>,
}

impl InteractionRegistry {
    pub fn new() -> Self {
        Self {
            scoped: RwLock::new(None),
            accumulated: RwLock::new(Vec::new()),
        }
    }

    /// Add one interaction to the current scope, initializing the scope if
    /// this is its first registration.
    ///
    /// The scoped set rejects duplicates by (description, provider states);
    /// the accumulated set silently deduplicates by the same identity, so a
    /// contract line replayed by several tests is emitted once.
    pub fn add(&self, interaction: Interaction) -> Result<Arc<Interaction>, RegistrationError> {
        let mut scoped = self.scoped.write();
        let entries = scoped.get_or_insert_with(Vec::new);

        if entries.iter().any(|x| x.is_same_contract(&interaction)) {
            return Err(RegistrationError::DuplicateInteraction {
                description: interaction.description.clone(),
                provider_states: interaction
                    .provider_states
                    .iter()
                    .map(|s| s.name.clone())
                    .collect(),
            });
        }

        let interaction = Arc::new(interaction);

        let mut accumulated = self.accumulated.write();
        if !accumulated.iter().any(|x| x.is_same_contract(&interaction)) {
            accumulated.push(Arc::clone(&interaction));
        }
        entries.push(Arc::clone(&interaction));

        debug!(description = %interaction.description, "registered interaction");
        Ok(interaction)
    }

    /// Replace the active scoped set wholesale.
    ///
    /// Used by hosting layers that assemble the expectation set elsewhere.
    /// The accumulated set picks up any interaction it has not seen yet, so
    /// the scoped set stays a subset of it by contract identity.
    pub fn register(&self, interactions: Vec<Arc<Interaction>>) {
        let mut accumulated = self.accumulated.write();
        for interaction in &interactions {
            if !accumulated.iter().any(|x| x.is_same_contract(interaction)) {
                accumulated.push(Arc::clone(interaction));
            }
        }
        drop(accumulated);

        info!(count = interactions.len(), "scoped interactions replaced");
        *self.scoped.write() = Some(interactions);
    }

    /// Match an inbound request to exactly one scoped interaction,
    /// incrementing its usage count.
    ///
    /// Ambiguity is never resolved by priority or registration order; more
    /// than one candidate is always an error, forcing test authors to keep
    /// registrations unambiguous by method and path.
    pub fn find_match(&self, method: HttpMethod, path: &str) -> Result<Arc<Interaction>, MatchError> {
        let scoped = self.scoped.read();
        let Some(entries) = scoped.as_ref() else {
            return Err(MatchError::NoInteractionsRegistered);
        };

        let candidates: Vec<&Arc<Interaction>> = entries
            .iter()
            .filter(|x| x.request.method == method && x.request.path == path)
            .collect();

        match candidates.as_slice() {
            [] => Err(MatchError::NoMatchingInteraction {
                method,
                path: path.to_string(),
            }),
            [winner] => {
                winner.record_usage();
                debug!(description = %winner.description, %method, path, "request matched");
                Ok(Arc::clone(winner))
            }
            many => Err(MatchError::AmbiguousInteraction {
                method,
                path: path.to_string(),
                count: many.len(),
            }),
        }
    }

    /// Check that every scoped interaction was used exactly once.
    ///
    /// Unused and overused interactions are reported together in one
    /// aggregate failure so a test author sees the full picture in one
    /// run. A scope that was never initialized has nothing to assert.
    pub fn verify(&self) -> Result<(), VerificationError> {
        let scoped = self.scoped.read();
        let Some(entries) = scoped.as_ref() else {
            return Ok(());
        };

        let unused: Vec<String> = entries
            .iter()
            .filter(|x| x.usage_count() < 1)
            .map(|x| x.summary())
            .collect();
        let overused: Vec<(String, u64)> = entries
            .iter()
            .filter(|x| x.usage_count() > 1)
            .map(|x| (x.summary(), x.usage_count()))
            .collect();

        if unused.is_empty() && overused.is_empty() {
            Ok(())
        } else {
            Err(VerificationError { unused, overused })
        }
    }

    /// Drop the scoped set, preserving the accumulated set.
    pub fn clear_scoped(&self) {
        info!("scoped interactions cleared");
        *self.scoped.write() = None;
    }

    /// Drop both the scoped and the accumulated sets.
    pub fn clear_all(&self) {
        info!("all interactions cleared");
        *self.scoped.write() = None;
        self.accumulated.write().clear();
    }

    /// Snapshot of the current scoped set, if one was initialized.
    pub fn scoped(&self) -> Option<Vec<Arc<Interaction>>> {
        self.scoped.read().clone()
    }

    /// Snapshot of every interaction accumulated this run, in first-seen
    /// order; this is what the contract document is assembled from.
    pub fn accumulated(&self) -> Vec<Arc<Interaction>> {
        self.accumulated.read().clone()
    }
}

impl Default for InteractionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
