// SPDX-License-Identifier: PMPL-1.0-or-later
//! Builder error types.
//!
//! The permissive constructors never fail. These errors only surface from the
//! strict entry points on [`crate::QueryBuilder`], from label parsing, and from
//! loading configuration, search options or query plans.

use serde_json::Value;
use thiserror::Error;

/// Errors reported by strict-mode building and by the JSON loaders.
#[derive(Error, Debug)]
pub enum BuilderError {
    /// A geospatial shape carried none of `latitude`, `south`, `radius` or `point`.
    #[error("shape {index} is not a point, box, circle or polygon: {shape}")]
    UnclassifiableShape { index: usize, shape: Value },

    #[error("unknown constraint kind: {0}")]
    UnknownConstraintKind(String),

    /// The first value of a value constraint has no output key (empty list, array or object).
    #[error("cannot tag value constraint terms: {0}")]
    UntaggableValue(String),

    #[error("unknown range operator: {0}")]
    UnknownRangeOperator(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid query plan: {0}")]
    Plan(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Crate-level result alias using [`BuilderError`].
pub type Result<T> = std::result::Result<T, BuilderError>;
