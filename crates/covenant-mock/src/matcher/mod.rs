//! Pluggable matcher rules for flexible body matching.
//!
//! Instead of exact value equality, a contract can declare that a body
//! field only needs to have the right JSON kind, match a regex, or parse
//! against a date format. Each rule is a pure function over
//! `(path, expected, actual)` producing a [`MatchOutcome`]; malformed
//! *data* is always a failure outcome, never an error. Only malformed rule
//! *construction* (e.g. an invalid regex pattern) is a [`RuleError`].
//!
//! # Module Structure
//!
//! - `outcome` - Match outcomes and failure kinds
//! - `rule` - The rule set and its pre-compiled runtime form

mod outcome;
mod rule;

pub use outcome::{CheckFailureKind, MatchOutcome};
pub use rule::{CompiledRule, MatcherRule, RuleError};
