//! Interaction model, registry, matching engine and verification.
//!
//! # Module Structure
//!
//! - `types` - Interaction description and error enums
//! - `builder` - Fluent registration of one interaction at a time
//! - `registry` - Scoped/accumulated sets, matching and verification

mod builder;
mod registry;
mod types;


pub use builder::InteractionBuilder;
pub use registry::InteractionRegistry;
pub use types::{
    HttpMethod, Interaction, InteractionRequest, InteractionResponse, MatchError, ProviderState,
    RegistrationError, VerificationError,
};
