//! Contract document assembly and the verified-backend seam.
//!
//! Once a run finishes, the interactions accumulated across all test
//! scopes are assembled into a [`ContractDocument`] between a consumer and
//! a provider. Persisting the document and replaying it against the real
//! provider is the job of an external backend (native engine or remote
//! service); the core only defines that seam and the shape of its failure.

use crate::interaction::{Interaction, InteractionRegistry};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A party to the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pacticipant {
    pub name: String,
}

/// The assembled contract between one consumer and one provider.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDocument {
    pub consumer: Pacticipant,
    pub provider: Pacticipant,
    pub interactions: Vec<Interaction>,
}

/// Error assembling a contract document.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error("please supply a non-empty consumer name")]
    EmptyConsumerName,
    #[error("please supply a non-empty provider name")]
    EmptyProviderName,
    #[error("consumer name has not been set, please supply one using service_consumer")]
    MissingConsumer,
    #[error("provider name has not been set, please supply one using has_pact_with")]
    MissingProvider,
}

/// Names the two parties and assembles the document from a registry's
/// accumulated interactions.
#[derive(Debug, Default)]
pub struct ContractBuilder {
    consumer: Option<String>,
    provider: Option<String>,
}

impl ContractBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn service_consumer(&mut self, name: &str) -> Result<&mut Self, ContractError> {
        if name.is_empty() {
            return Err(ContractError::EmptyConsumerName);
        }
        self.consumer = Some(name.to_string());
        Ok(self)
    }

    pub fn has_pact_with(&mut self, name: &str) -> Result<&mut Self, ContractError> {
        if name.is_empty() {
            return Err(ContractError::EmptyProviderName);
        }
        self.provider = Some(name.to_string());
        Ok(self)
    }

    /// Assemble the document from everything the registry accumulated this
    /// run, in first-seen order.
    pub fn document(&self, registry: &InteractionRegistry) -> Result<ContractDocument, ContractError> {
        let consumer = self
            .consumer
            .clone()
            .ok_or(ContractError::MissingConsumer)?;
        let provider = self
            .provider
            .clone()
            .ok_or(ContractError::MissingProvider)?;

        let interactions = registry
            .accumulated()
            .iter()
            .map(|interaction| Interaction::clone(interaction))
            .collect();

        Ok(ContractDocument {
            consumer: Pacticipant { name: consumer },
            provider: Pacticipant { name: provider },
            interactions,
        })
    }
}

/// One structural mismatch observed by the backend during real replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mismatch {
    /// Description of the interaction the mismatch belongs to.
    pub description: String,
    /// Backend-supplied detail of what differed.
    pub detail: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.description, self.detail)
    }
}

/// Failure surfaced by the verified backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("contract comparison failed: {}", format_mismatches(.0))]
    CompareFailed(Vec<Mismatch>),
    #[error("verified backend unavailable: {0}")]
    Unavailable(String),
}

fn format_mismatches(mismatches: &[Mismatch]) -> String {
    let entries: Vec<String> = mismatches.iter().map(Mismatch::to_string).collect();
    entries.join("; ")
}

/// The opaque external engine that persists the contract document and
/// replays it against real traffic. Its own protocol (process handles,
/// FFI, wire bytes) is none of the core's business; only the result
/// surfaces here.
pub trait VerifiedBackend {
    /// Hand the final document to the backend. A mismatch list comes back
    /// as [`BackendError::CompareFailed`].
    fn finalize(&self, document: &ContractDocument) -> Result<(), BackendError>;
}
