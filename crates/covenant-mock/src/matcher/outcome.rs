//! Match outcomes produced by rule evaluation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a matcher check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckFailureKind {
    /// Actual value has a different JSON kind than the expected value.
    TypeMismatch,
    /// Actual value does not fully match the declared regex pattern.
    PatternMismatch,
    /// Actual value does not parse exactly against the declared date format.
    ValueDoesNotMatchDateFormat,
}

impl fmt::Display for CheckFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CheckFailureKind::TypeMismatch => "type mismatch",
            CheckFailureKind::PatternMismatch => "pattern mismatch",
            CheckFailureKind::ValueDoesNotMatchDateFormat => {
                "value does not match the date format"
            }
        };
        f.write_str(text)
    }
}

/// Result of evaluating one matcher rule against one body path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "result")]
pub enum MatchOutcome {
    /// The actual value satisfied the rule at this path.
    Success { path: String },
    /// The actual value violated the rule at this path.
    Failure {
        path: String,
        kind: CheckFailureKind,
    },
}

impl MatchOutcome {
    pub fn success(path: impl Into<String>) -> Self {
        MatchOutcome::Success { path: path.into() }
    }

    pub fn failure(path: impl Into<String>, kind: CheckFailureKind) -> Self {
        MatchOutcome::Failure {
            path: path.into(),
            kind,
        }
    }

    /// Whether the check passed.
    pub fn matched(&self) -> bool {
        matches!(self, MatchOutcome::Success { .. })
    }

    /// Body path this outcome refers to.
    pub fn path(&self) -> &str {
        match self {
            MatchOutcome::Success { path } | MatchOutcome::Failure { path, .. } => path,
        }
    }
}
