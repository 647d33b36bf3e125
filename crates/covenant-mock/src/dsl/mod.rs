//! Recursive DSL for describing flexible JSON body shapes.
//!
//! A body is built as a tree of object/array/primitive declarations, each
//! optionally carrying a matcher rule instead of exact-value semantics.
//! Building folds the tree into a concrete example value plus a
//! path-addressed map of matcher rules (`$.body...`), which together form
//! the body half of an interaction template.

mod body;

pub use body::{Body, BodyBuilder, BodyError};
