//! Covenant: consumer-driven contract testing core.
//!
//! A consumer test describes the interactions it expects from a provider
//! (request templates, response templates, flexible body shapes), registers
//! them with an in-memory registry, and lets the hosting mock layer route
//! inbound requests through the matching engine. At teardown, verification
//! asserts that every registered interaction was exercised exactly once
//! before the accumulated interactions are assembled into a contract
//! document for the external verified backend.
//!
//! Hosting (sockets, TLS, dispatch) and contract-file persistence live
//! outside this crate; the registry and the [`contract::VerifiedBackend`]
//! seam are the only integration points they need.

// ===== Core contract-matching modules =====
pub mod contract;
pub mod dsl;
pub mod interaction;
pub mod matcher;

pub use contract::{
    BackendError, ContractBuilder, ContractDocument, ContractError, Mismatch, Pacticipant,
    VerifiedBackend,
};
pub use dsl::{Body, BodyBuilder, BodyError};
pub use interaction::{
    HttpMethod, Interaction, InteractionBuilder, InteractionRegistry, InteractionRequest,
    InteractionResponse, MatchError, ProviderState, RegistrationError, VerificationError,
};
pub use matcher::{CheckFailureKind, CompiledRule, MatchOutcome, MatcherRule, RuleError};
