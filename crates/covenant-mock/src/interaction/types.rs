//! Type definitions for the interaction model.
//!
//! This module contains the interaction description (provider states,
//! request/response templates with matcher rules), plus the error enums
//! used across registration, matching and verification.

use crate::dsl::Body;
use crate::matcher::MatcherRule;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

// ============================================================================
// Request/Response Types
// ============================================================================

/// HTTP method of a request template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        };
        f.write_str(text)
    }
}

/// A named precondition the real provider must satisfy before replay,
/// optionally parameterized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderState {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<BTreeMap<String, String>>,
}

impl ProviderState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: None,
        }
    }

    pub fn with_params(name: impl Into<String>, params: BTreeMap<String, String>) -> Self {
        Self {
            name: name.into(),
            params: Some(params),
        }
    }
}

/// Request template of an expected interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRequest {
    pub method: HttpMethod,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub matching_rules: BTreeMap<String, Vec<MatcherRule>>,
}

impl InteractionRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            headers: HashMap::new(),
            body: None,
            matching_rules: BTreeMap::new(),
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Attach a folded DSL body: example value plus its matcher rules.
    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(body.example);
        self.matching_rules = body.matching_rules;
        self
    }

    /// Attach a literal JSON body with no matcher rules.
    pub fn with_json_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Response template of an expected interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionResponse {
    pub status: u16,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub matching_rules: BTreeMap<String, Vec<MatcherRule>>,
}

impl InteractionResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: None,
            matching_rules: BTreeMap::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(body.example);
        self.matching_rules = body.matching_rules;
        self
    }

    pub fn with_json_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

// ============================================================================
// Interaction
// ============================================================================

/// One expected request/response pair plus its provider-state
/// preconditions and description.
///
/// Immutable once registered, except for the usage counter which the
/// matching engine bumps each time this interaction wins a match.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub provider_states: Vec<ProviderState>,
    pub description: String,
    pub request: InteractionRequest,
    pub response: InteractionResponse,
    #[serde(skip)]
    usage_count: AtomicU64,
}

impl Interaction {
    pub fn new(
        provider_states: Vec<ProviderState>,
        description: impl Into<String>,
        request: InteractionRequest,
        response: InteractionResponse,
    ) -> Self {
        Self {
            provider_states,
            description: description.into(),
            request,
            response,
            usage_count: AtomicU64::new(0),
        }
    }

    /// Number of times this interaction won a match in its current scope.
    pub fn usage_count(&self) -> u64 {
        self.usage_count.load(Ordering::SeqCst)
    }

    /// Record one successful match. Called by the matching engine only.
    pub(crate) fn record_usage(&self) {
        self.usage_count.fetch_add(1, Ordering::SeqCst);
    }

    /// Identity for duplicate detection and cross-test deduplication:
    /// description plus provider states, ordering significant.
    pub fn is_same_contract(&self, other: &Interaction) -> bool {
        self.description == other.description && self.provider_states == other.provider_states
    }

    /// Human-readable one-liner used in verification failures.
    pub fn summary(&self) -> String {
        if self.provider_states.is_empty() {
            format!("\"{}\"", self.description)
        } else {
            let states: Vec<&str> = self
                .provider_states
                .iter()
                .map(|s| s.name.as_str())
                .collect();
            format!("\"{}\" given \"{}\"", self.description, states.join("\", \""))
        }
    }
}

impl Clone for Interaction {
    fn clone(&self) -> Self {
        Self {
            provider_states: self.provider_states.clone(),
            description: self.description.clone(),
            request: self.request.clone(),
            response: self.response.clone(),
            usage_count: AtomicU64::new(self.usage_count()),
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Error registering an interaction; always a caller bug, surfaced at the
/// offending builder call.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("please supply a non-empty provider state")]
    EmptyProviderState,
    #[error("please supply a non-empty description")]
    EmptyDescription,
    #[error("description has not been set, please supply one using upon_receiving")]
    MissingDescription,
    #[error("request has not been set, please supply one using with_request")]
    MissingRequest,
    #[error(
        "an interaction already exists with the description {description:?} and provider \
         state(s) {provider_states:?}; please supply a different description or provider state"
    )]
    DuplicateInteraction {
        description: String,
        provider_states: Vec<String>,
    },
}

/// Error matching an inbound request against the scoped registry; reported
/// per request and recoverable by the hosting layer.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MatchError {
    #[error("no mock interactions have been registered for the current test scope")]
    NoInteractionsRegistered,
    #[error("no matching mock interaction has been registered for {method} {path}")]
    NoMatchingInteraction { method: HttpMethod, path: String },
    #[error(
        "more than one matching mock interaction has been registered for {method} {path} \
         ({count} candidates)"
    )]
    AmbiguousInteraction {
        method: HttpMethod,
        path: String,
        count: usize,
    },
}

/// Aggregate verification failure listing every offending interaction.
#[derive(Debug, thiserror::Error)]
#[error("{}", verification_message(.unused, .overused))]
pub struct VerificationError {
    /// Summaries of interactions never used by the test.
    pub unused: Vec<String>,
    /// Summaries and usage counts of interactions used more than once.
    pub overused: Vec<(String, u64)>,
}

fn verification_message(unused: &[String], overused: &[(String, u64)]) -> String {
    let mut message = String::new();
    if !unused.is_empty() {
        message.push_str(&format!(
            "The following interactions were not used by the test: {}. ",
            unused.join(", ")
        ));
    }
    if !overused.is_empty() {
        let entries: Vec<String> = overused
            .iter()
            .map(|(summary, count)| format!("{summary} [{count} time/s]"))
            .collect();
        message.push_str(&format!(
            "The following interactions were called more than once by the test: {}. ",
            entries.join(", ")
        ));
    }
    message.trim_end().to_string()
}
