//! Arena-backed body builder and its fold into example + matcher map.
//!
//! Nodes live in a flat arena and reference their parent by index, so the
//! in-progress tree has no owning back-references; the builder owns the
//! whole arena and discards it as a unit. Scope-changing calls return the
//! builder itself, which keeps fluent chaining available without a
//! return-self object graph.

use crate::matcher::{CompiledRule, MatcherRule, RuleError};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Regex for RFC 4122 textual UUIDs, used by [`BodyBuilder::guid`].
const GUID_PATTERN: &str = "[0-9a-fA-F]{8}(-[0-9a-fA-F]{4}){3}-[0-9a-fA-F]{12}";

/// Path prefix identifying the body of an interaction.
const BODY_ROOT: &str = "$.body";

/// Folded result of a completed body description.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Concrete example value emitted into the interaction template.
    pub example: Value,
    /// Matcher rules keyed by body-relative path. Paths under an array
    /// carry a `[*]` segment so one rule applies to every element.
    pub matching_rules: BTreeMap<String, Vec<MatcherRule>>,
}

/// Error while constructing a body description.
///
/// All of these are caller bugs and surface immediately at the offending
/// call; building never affects the matching engine.
#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error("close_object called without a matching open object scope")]
    UnbalancedCloseObject,
    #[error("close_array called without a matching open array scope")]
    UnbalancedCloseArray,
    #[error("item can only be declared inside an array scope")]
    ItemOutsideArray,
    #[error("field {name:?} cannot be declared directly inside an array scope, open an item first")]
    FieldInsideArray { name: String },
    #[error("body has an unclosed scope at {path}")]
    UnclosedScope { path: String },
    #[error("invalid rule for field {name:?}")]
    Rule {
        name: String,
        #[source]
        source: RuleError,
    },
    #[error("example {example:?} for field {name:?} does not satisfy its declared rule")]
    ExampleViolatesRule { name: String, example: String },
}

#[derive(Debug)]
enum NodeKind {
    Object { children: Vec<usize> },
    Array { items: Vec<usize>, size: usize },
    Primitive { example: Value },
}

#[derive(Debug)]
struct Node {
    /// Key in the parent object; empty for the root and for array items.
    name: String,
    /// Arena index of the parent; navigation only, never ownership.
    parent: Option<usize>,
    kind: NodeKind,
    rules: Vec<MatcherRule>,
}

/// Builder for a JSON-shaped body with per-path matcher rules.
///
/// The root scope is an object. Open/close calls must balance; a
/// mismatched close is a construction error, reported at the call itself
/// rather than at match time.
#[derive(Debug)]
pub struct BodyBuilder {
    nodes: Vec<Node>,
    current: usize,
}

const ROOT: usize = 0;

impl BodyBuilder {
    /// Start a new body description with an empty root object.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                name: String::new(),
                parent: None,
                kind: NodeKind::Object {
                    children: Vec::new(),
                },
                rules: Vec::new(),
            }],
            current: ROOT,
        }
    }

    /// Open a nested object scope under the current object.
    pub fn object(&mut self, name: &str) -> Result<&mut Self, BodyError> {
        self.ensure_named_scope(name)?;
        let idx = self.attach(Node {
            name: name.to_string(),
            parent: Some(self.current),
            kind: NodeKind::Object {
                children: Vec::new(),
            },
            rules: Vec::new(),
        });
        self.current = idx;
        Ok(self)
    }

    /// Close the current object scope, returning control to the scope that
    /// opened it. Also closes an array item opened with [`Self::item`].
    pub fn close_object(&mut self) -> Result<&mut Self, BodyError> {
        let node = &self.nodes[self.current];
        match (&node.kind, node.parent) {
            (NodeKind::Object { .. }, Some(parent)) => {
                self.current = parent;
                Ok(self)
            }
            _ => Err(BodyError::UnbalancedCloseObject),
        }
    }

    /// Open an array scope under the current object.
    ///
    /// `size` is the number of elements the folded example should carry;
    /// if fewer items are declared, the last one is repeated to pad.
    pub fn array(&mut self, name: &str, size: usize) -> Result<&mut Self, BodyError> {
        self.ensure_named_scope(name)?;
        let idx = self.attach(Node {
            name: name.to_string(),
            parent: Some(self.current),
            kind: NodeKind::Array {
                items: Vec::new(),
                size,
            },
            rules: Vec::new(),
        });
        self.current = idx;
        Ok(self)
    }

    /// Open an object scope for the next array element. All items share
    /// the array's `[*]` path, so one rule covers every element.
    pub fn item(&mut self) -> Result<&mut Self, BodyError> {
        if !matches!(self.nodes[self.current].kind, NodeKind::Array { .. }) {
            return Err(BodyError::ItemOutsideArray);
        }
        let idx = self.attach(Node {
            name: String::new(),
            parent: Some(self.current),
            kind: NodeKind::Object {
                children: Vec::new(),
            },
            rules: Vec::new(),
        });
        self.current = idx;
        Ok(self)
    }

    /// Close the current array scope.
    pub fn close_array(&mut self) -> Result<&mut Self, BodyError> {
        let node = &self.nodes[self.current];
        match (&node.kind, node.parent) {
            (NodeKind::Array { .. }, Some(parent)) => {
                self.current = parent;
                Ok(self)
            }
            _ => Err(BodyError::UnbalancedCloseArray),
        }
    }

    /// Declare a field matched by exact value, no rule attached.
    pub fn literal(&mut self, name: &str, example: impl Into<Value>) -> Result<&mut Self, BodyError> {
        self.primitive(name, example.into(), Vec::new())
    }

    /// Declare a string field matched by JSON kind only; the example is
    /// illustrative and not checked on replay.
    pub fn string_type(&mut self, name: &str, example: &str) -> Result<&mut Self, BodyError> {
        self.primitive(name, Value::from(example), vec![MatcherRule::Type])
    }

    /// Declare an integer field matched by JSON kind only.
    pub fn integer_type(&mut self, name: &str, example: i64) -> Result<&mut Self, BodyError> {
        self.primitive(name, Value::from(example), vec![MatcherRule::Type])
    }

    /// Declare a decimal field matched by JSON kind only.
    pub fn decimal_type(&mut self, name: &str, example: f64) -> Result<&mut Self, BodyError> {
        self.primitive(name, Value::from(example), vec![MatcherRule::Type])
    }

    /// Declare a boolean field matched by JSON kind only.
    pub fn boolean_type(&mut self, name: &str, example: bool) -> Result<&mut Self, BodyError> {
        self.primitive(name, Value::from(example), vec![MatcherRule::Type])
    }

    /// Declare a field matched by an anchored regex pattern.
    ///
    /// The example must itself satisfy the pattern; a self-inconsistent
    /// declaration is rejected here rather than producing a contract no
    /// provider could ever satisfy.
    pub fn regex(&mut self, name: &str, example: &str, pattern: &str) -> Result<&mut Self, BodyError> {
        let rule = MatcherRule::Regex {
            regex: pattern.to_string(),
        };
        self.checked_primitive(name, example, rule)
    }

    /// Declare a field matched by a strict chrono date/time format.
    ///
    /// The example must itself parse against the format.
    pub fn date_format(
        &mut self,
        name: &str,
        example: &str,
        format: &str,
    ) -> Result<&mut Self, BodyError> {
        let rule = MatcherRule::DateFormat {
            format: format.to_string(),
        };
        self.checked_primitive(name, example, rule)
    }

    /// Declare a field matched as a textual UUID.
    pub fn guid(&mut self, name: &str, example: &str) -> Result<&mut Self, BodyError> {
        let rule = MatcherRule::Regex {
            regex: GUID_PATTERN.to_string(),
        };
        self.checked_primitive(name, example, rule)
    }

    /// Fold the completed description into its example value and matcher
    /// map. Fails if any scope is still open.
    pub fn build(self) -> Result<Body, BodyError> {
        if self.current != ROOT {
            return Err(BodyError::UnclosedScope {
                path: self.path_of(self.current),
            });
        }

        let mut matching_rules = BTreeMap::new();
        let example = self.fold(ROOT, BODY_ROOT, &mut matching_rules);
        Ok(Body {
            example,
            matching_rules,
        })
    }

    // ------------------------------------------------------------------
    // internals
    // ------------------------------------------------------------------

    /// Named declarations are only legal inside an object scope.
    fn ensure_named_scope(&self, name: &str) -> Result<(), BodyError> {
        match self.nodes[self.current].kind {
            NodeKind::Object { .. } => Ok(()),
            _ => Err(BodyError::FieldInsideArray {
                name: name.to_string(),
            }),
        }
    }

    /// Push a node into the arena and link it under the current scope.
    fn attach(&mut self, node: Node) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(node);
        match &mut self.nodes[self.current].kind {
            NodeKind::Object { children } => children.push(idx),
            NodeKind::Array { items, .. } => items.push(idx),
            NodeKind::Primitive { .. } => unreachable!("primitives never become the current scope"),
        }
        idx
    }

    fn primitive(
        &mut self,
        name: &str,
        example: Value,
        rules: Vec<MatcherRule>,
    ) -> Result<&mut Self, BodyError> {
        self.ensure_named_scope(name)?;
        self.attach(Node {
            name: name.to_string(),
            parent: Some(self.current),
            kind: NodeKind::Primitive { example },
            rules,
        });
        Ok(self)
    }

    /// Primitive declaration with eager example-vs-rule validation.
    fn checked_primitive(
        &mut self,
        name: &str,
        example: &str,
        rule: MatcherRule,
    ) -> Result<&mut Self, BodyError> {
        let compiled = CompiledRule::compile(&rule).map_err(|source| BodyError::Rule {
            name: name.to_string(),
            source,
        })?;
        let example_value = Value::from(example);
        if !compiled.check("", &example_value, &example_value).matched() {
            return Err(BodyError::ExampleViolatesRule {
                name: name.to_string(),
                example: example.to_string(),
            });
        }
        self.primitive(name, example_value, vec![rule])
    }

    /// Body-relative path of a node. Array items contribute no segment of
    /// their own; the array already carries the `[*]` wildcard.
    fn path_of(&self, idx: usize) -> String {
        let node = &self.nodes[idx];
        let Some(parent) = node.parent else {
            return BODY_ROOT.to_string();
        };
        let parent_path = self.path_of(parent);
        match &node.kind {
            NodeKind::Array { .. } => format!("{parent_path}.{}[*]", node.name),
            _ if node.name.is_empty() => parent_path,
            _ => format!("{parent_path}.{}", node.name),
        }
    }

    fn fold(&self, idx: usize, path: &str, rules: &mut BTreeMap<String, Vec<MatcherRule>>) -> Value {
        let node = &self.nodes[idx];
        if !node.rules.is_empty() {
            rules
                .entry(path.to_string())
                .or_default()
                .extend(node.rules.iter().cloned());
        }

        match &node.kind {
            NodeKind::Primitive { example } => example.clone(),
            NodeKind::Object { children } => {
                let mut map = Map::new();
                for &child in children {
                    let child_node = &self.nodes[child];
                    let child_path = self.path_of(child);
                    map.insert(
                        child_node.name.clone(),
                        self.fold(child, &child_path, rules),
                    );
                }
                Value::Object(map)
            }
            NodeKind::Array { items, size } => {
                let mut values: Vec<Value> = items
                    .iter()
                    .map(|&item| self.fold(item, path, rules))
                    .collect();
                // Pad the example out to the declared size by repeating
                // the last item.
                if let Some(last) = values.last().cloned() {
                    while values.len() < *size {
                        values.push(last.clone());
                    }
                }
                Value::Array(values)
            }
        }
    }
}

impl Default for BodyBuilder {
    fn default() -> Self {
        Self::new()
    }
}
