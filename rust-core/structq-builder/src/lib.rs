// SPDX-License-Identifier: PMPL-1.0-or-later
//! Structured Query Builder
//!
//! Builds the nested JSON objects of a search platform's structured query
//! grammar from small, composable constructors. Each constructor returns a
//! [`QueryNode`] that serializes to a single-key object (`{"and-query": {...}}`)
//! and can be nested inside any constructor that takes a query.
//!
//! ```rust
//! use structq_builder::build::{and, query, term};
//!
//! let q = query([and([term("a", None), term("b", None)])]);
//! assert_eq!(
//!     q.to_json().unwrap(),
//!     r#"{"query":{"queries":[{"and-query":{"queries":[{"term-query":{"text":["a"],"weight":1.0}},{"term-query":{"text":["b"],"weight":1.0}}],"ordered":false}}]}}"#
//! );
//! ```
//!
//! The builder shapes input only. It does not check constraint names against
//! the platform's configuration and never talks to the platform.

pub mod build;
pub mod builder;
pub mod coerce;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod model;
pub mod options;
pub mod plan;
pub mod shape;

pub use build::{RangeArgs, DEFAULT_WEIGHT};
pub use builder::QueryBuilder;
pub use coerce::{coerce_args, coerce_value, IntoSequence};
pub use config::{BuilderConfig, ClassificationMode};
pub use dispatch::{constraint, constraint_for_label, ConstraintFn, ConstraintKind};
pub use error::{BuilderError, Result};
pub use model::{OneOrMany, QueryNode, RangeOperator, ValueTerms};
pub use options::{ConstraintDefinition, SearchOptions};
pub use plan::QueryPlan;
pub use shape::{
    classify, classify_shape, IntoShapes, Shape, ShapeClassification, ShapeInput, ShapeKind,
};
