//! Matcher rule definitions and compilation.
//!
//! [`MatcherRule`] is the declarative, serializable form that ends up in
//! the contract document. [`CompiledRule`] is the pre-compiled runtime
//! form used for evaluation, so regex compilation happens once at
//! construction instead of on every check.

use super::outcome::{CheckFailureKind, MatchOutcome};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Structural/format predicate substituted for exact value equality at a
/// given body path.
///
/// The rule set is closed: adding a new kind means adding one variant here
/// and one evaluation arm in [`CompiledRule::check`], nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "match", rename_all = "camelCase")]
pub enum MatcherRule {
    /// Actual value must have the same JSON kind as the expected value;
    /// the expected value itself is illustrative only.
    Type,

    /// Textual form of the actual value must fully match the pattern.
    Regex { regex: String },

    /// Textual form of the actual value must parse exactly against the
    /// chrono format string (e.g. `%Y-%m-%d`), locale-invariant.
    #[serde(rename = "date")]
    DateFormat {
        #[serde(rename = "date")]
        format: String,
    },
}

/// Error constructing a rule.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("invalid regex pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
    #[error("date format must not be empty")]
    EmptyDateFormat,
}

/// Compiled rule for efficient runtime evaluation.
#[derive(Debug, Clone)]
pub enum CompiledRule {
    Type,
    Regex(Arc<Regex>),
    DateFormat(String),
}

impl CompiledRule {
    /// Compile a MatcherRule into its runtime form.
    ///
    /// Regex patterns are anchored (`^(?:pat)$`) so partial hits never
    /// count as a match.
    pub fn compile(rule: &MatcherRule) -> Result<Self, RuleError> {
        match rule {
            MatcherRule::Type => Ok(CompiledRule::Type),
            MatcherRule::Regex { regex } => {
                let anchored = format!("^(?:{regex})$");
                let compiled = Regex::new(&anchored).map_err(|source| RuleError::InvalidPattern {
                    pattern: regex.clone(),
                    source,
                })?;
                Ok(CompiledRule::Regex(Arc::new(compiled)))
            }
            MatcherRule::DateFormat { format } => {
                if format.is_empty() {
                    return Err(RuleError::EmptyDateFormat);
                }
                Ok(CompiledRule::DateFormat(format.clone()))
            }
        }
    }

    /// Evaluate the rule against one body path.
    ///
    /// Pure over its inputs: malformed actual data is a failure outcome,
    /// never an error or a panic.
    pub fn check(&self, path: &str, expected: &Value, actual: &Value) -> MatchOutcome {
        match self {
            CompiledRule::Type => {
                if json_kind(expected) == json_kind(actual) {
                    MatchOutcome::success(path)
                } else {
                    MatchOutcome::failure(path, CheckFailureKind::TypeMismatch)
                }
            }
            CompiledRule::Regex(regex) => match scalar_text(actual) {
                Some(text) if regex.is_match(&text) => MatchOutcome::success(path),
                _ => MatchOutcome::failure(path, CheckFailureKind::PatternMismatch),
            },
            CompiledRule::DateFormat(format) => match scalar_text(actual) {
                Some(text) if parses_exactly(&text, format) => MatchOutcome::success(path),
                _ => MatchOutcome::failure(path, CheckFailureKind::ValueDoesNotMatchDateFormat),
            },
        }
    }
}

/// JSON kind of a value, for Type matching.
fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Textual form of a scalar value. Null, arrays and objects have none.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Strict parse of `text` against a chrono format string.
///
/// Tries datetime, date-only and time-only interpretations; chrono rejects
/// trailing unparsed input, so a partial match never passes.
fn parses_exactly(text: &str, format: &str) -> bool {
    NaiveDateTime::parse_from_str(text, format).is_ok()
        || NaiveDate::parse_from_str(text, format).is_ok()
        || NaiveTime::parse_from_str(text, format).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(rule: &MatcherRule, expected: Value, actual: Value) -> MatchOutcome {
        CompiledRule::compile(rule)
            .unwrap()
            .check("$.body.field", &expected, &actual)
    }

    #[test]
    fn test_type_rule_matches_same_kind() {
        let rule = MatcherRule::Type;
        assert!(check(&rule, json!("DetailsView"), json!("SearchView")).matched());
        assert!(check(&rule, json!(1), json!(99.5)).matched());
        assert!(check(&rule, json!({"a": 1}), json!({"b": 2})).matched());
        assert!(check(&rule, json!([1]), json!([])).matched());
        assert!(check(&rule, json!(null), json!(null)).matched());
    }

    #[test]
    fn test_type_rule_rejects_different_kind() {
        let outcome = check(&MatcherRule::Type, json!("text"), json!(42));
        assert_eq!(
            outcome,
            MatchOutcome::failure("$.body.field", CheckFailureKind::TypeMismatch)
        );
        assert!(!check(&MatcherRule::Type, json!(true), json!(null)).matched());
    }

    #[test]
    fn test_regex_rule_is_anchored() {
        let rule = MatcherRule::Regex {
            regex: r"\d{4}".to_string(),
        };
        assert!(check(&rule, json!("1234"), json!("2024")).matched());
        // Partial hits do not count.
        assert!(!check(&rule, json!("1234"), json!("year 2024")).matched());
        assert!(!check(&rule, json!("1234"), json!("20245")).matched());
    }

    #[test]
    fn test_regex_rule_on_non_string_scalars() {
        let rule = MatcherRule::Regex {
            regex: r"\d+".to_string(),
        };
        // Numbers are matched on their textual form.
        assert!(check(&rule, json!(1), json!(12345)).matched());

        let outcome = check(&rule, json!(1), json!({"nested": true}));
        assert_eq!(
            outcome,
            MatchOutcome::failure("$.body.field", CheckFailureKind::PatternMismatch)
        );
        assert!(!check(&rule, json!(1), json!(null)).matched());
    }

    #[test]
    fn test_regex_rule_invalid_pattern_is_construction_error() {
        let rule = MatcherRule::Regex {
            regex: "(unclosed".to_string(),
        };
        assert!(matches!(
            CompiledRule::compile(&rule),
            Err(RuleError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_date_format_rule() {
        let rule = MatcherRule::DateFormat {
            format: "%Y-%m-%d".to_string(),
        };
        assert!(check(&rule, json!("2011-07-01"), json!("2014-02-11")).matched());

        let outcome = check(&rule, json!("2011-07-01"), json!("11/02/2014"));
        assert_eq!(
            outcome,
            MatchOutcome::failure(
                "$.body.field",
                CheckFailureKind::ValueDoesNotMatchDateFormat
            )
        );
    }

    #[test]
    fn test_date_format_rule_rejects_partial_parse() {
        let rule = MatcherRule::DateFormat {
            format: "%Y-%m-%d".to_string(),
        };
        // Trailing text after a valid date is not an exact parse.
        assert!(!check(&rule, json!("2011-07-01"), json!("2014-02-11T06:00:00")).matched());
        assert!(!check(&rule, json!("2011-07-01"), json!("2014-02-31")).matched());
    }

    #[test]
    fn test_date_format_rule_datetime_and_time_formats() {
        let datetime = MatcherRule::DateFormat {
            format: "%Y-%m-%dT%H:%M:%S".to_string(),
        };
        assert!(check(&datetime, json!("2011-07-01T01:41:03"), json!("2024-12-31T23:59:59")).matched());

        let time = MatcherRule::DateFormat {
            format: "%H:%M".to_string(),
        };
        assert!(check(&time, json!("01:41"), json!("23:59")).matched());
        assert!(!check(&time, json!("01:41"), json!("25:00")).matched());
    }

    #[test]
    fn test_date_format_rule_never_errors_on_bad_data() {
        let rule = MatcherRule::DateFormat {
            format: "%Y-%m-%d".to_string(),
        };
        // Non-scalar actuals are failures, not panics.
        assert!(!check(&rule, json!("2011-07-01"), json!(["2011-07-01"])).matched());
    }

    #[test]
    fn test_empty_date_format_is_construction_error() {
        let rule = MatcherRule::DateFormat {
            format: String::new(),
        };
        assert!(matches!(
            CompiledRule::compile(&rule),
            Err(RuleError::EmptyDateFormat)
        ));
    }

    #[test]
    fn test_rule_serde_contract_shapes() {
        let json = serde_json::to_value(&MatcherRule::Type).unwrap();
        assert_eq!(json, serde_json::json!({"match": "type"}));

        let json = serde_json::to_value(&MatcherRule::Regex {
            regex: "[0-9A-F]{8}".to_string(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"match": "regex", "regex": "[0-9A-F]{8}"}));

        let json = serde_json::to_value(&MatcherRule::DateFormat {
            format: "%Y-%m-%d".to_string(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"match": "date", "date": "%Y-%m-%d"}));

        let rule: MatcherRule =
            serde_json::from_value(serde_json::json!({"match": "date", "date": "%H:%M"})).unwrap();
        assert_eq!(
            rule,
            MatcherRule::DateFormat {
                format: "%H:%M".to_string()
            }
        );
    }
}
