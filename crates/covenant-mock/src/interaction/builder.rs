//! Fluent assembly of one expected interaction.
//!
//! `given` / `upon_receiving` / `with_request` / `will_respond_with`
//! collect transient state; `will_respond_with` is the finalize step that
//! validates it, registers the interaction and resets the builder so the
//! same instance can describe the next expectation.

use super::registry::InteractionRegistry;
use super::types::{
    Interaction, InteractionRequest, InteractionResponse, ProviderState, RegistrationError,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Builder for registering expected interactions against a registry.
pub struct InteractionBuilder {
    registry: Arc<InteractionRegistry>,
    provider_states: Vec<ProviderState>,
    description: Option<String>,
    request: Option<InteractionRequest>,
}

impl InteractionBuilder {
    pub fn new(registry: Arc<InteractionRegistry>) -> Self {
        Self {
            registry,
            provider_states: Vec::new(),
            description: None,
            request: None,
        }
    }

    /// Add a provider-state precondition. May be called several times; the
    /// declaration order is kept and is significant for identity.
    pub fn given(&mut self, provider_state: &str) -> Result<&mut Self, RegistrationError> {
        if provider_state.is_empty() {
            return Err(RegistrationError::EmptyProviderState);
        }
        self.provider_states.push(ProviderState::new(provider_state));
        Ok(self)
    }

    /// Add a parameterized provider-state precondition.
    pub fn given_with_params(
        &mut self,
        provider_state: &str,
        params: BTreeMap<String, String>,
    ) -> Result<&mut Self, RegistrationError> {
        if provider_state.is_empty() {
            return Err(RegistrationError::EmptyProviderState);
        }
        self.provider_states
            .push(ProviderState::with_params(provider_state, params));
        Ok(self)
    }

    /// Set the description of the expectation being described.
    pub fn upon_receiving(&mut self, description: &str) -> Result<&mut Self, RegistrationError> {
        if description.is_empty() {
            return Err(RegistrationError::EmptyDescription);
        }
        self.description = Some(description.to_string());
        Ok(self)
    }

    /// Set the request template.
    pub fn with_request(&mut self, request: InteractionRequest) -> &mut Self {
        self.request = Some(request);
        self
    }

    /// Finalize and register the interaction.
    ///
    /// Validates that `upon_receiving` and `with_request` were called,
    /// rejects a duplicate (description, provider states) registration in
    /// the current scope, then clears the transient state regardless of
    /// what the next expectation will look like.
    pub fn will_respond_with(
        &mut self,
        response: InteractionResponse,
    ) -> Result<Arc<Interaction>, RegistrationError> {
        let Some(description) = self.description.take() else {
            return Err(RegistrationError::MissingDescription);
        };
        let Some(request) = self.request.take() else {
            self.description = Some(description);
            return Err(RegistrationError::MissingRequest);
        };
        let provider_states = std::mem::take(&mut self.provider_states);

        self.registry
            .add(Interaction::new(provider_states, description, request, response))
    }
}
