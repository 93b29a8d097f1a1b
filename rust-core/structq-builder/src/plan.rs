// SPDX-License-Identifier: PMPL-1.0-or-later
//! JSON query plans.
//!
//! A plan is a compact, hand-writable description of a query tree. Each object
//! names a constructor in its `op` field and supplies that constructor's
//! arguments by name; compiling the plan runs the constructors bottom-up.
//!
//! ```json
//! {"op": "and", "queries": [
//!     {"op": "term", "text": "whale"},
//!     {"op": "constraint", "kind": "value", "name": "status", "values": "published"},
//!     {"op": "geospatial", "name": "where", "shapes": {"latitude": 51.5, "longitude": -0.1}}
//! ]}
//! ```
//!
//! One-or-many arguments accept a scalar or a list, as the constructors do.
//! A missing optional list (`uri`, `options`, `shapes`) is empty.

use serde::Deserialize;
use serde_json::Value;

use crate::build::{
    and, boost, boost_default, collection, collection_constraint, custom_constraint, directory,
    document, document_fragment, locks_fragment, not, operator_state, or, properties_fragment,
    qtext, query, range_constraint, term, word_constraint, RangeArgs,
};
use crate::builder::QueryBuilder;
use crate::coerce::coerce_value;
use crate::error::{BuilderError, Result};
use crate::model::{OneOrMany, QueryNode, RangeOperator};

/// One node of a query plan.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum QueryPlan {
    Query {
        #[serde(default)]
        queries: Vec<QueryPlan>,
    },
    Qtext {
        text: OneOrMany<String>,
    },
    Term {
        text: Value,
        weight: Option<f64>,
    },
    And {
        #[serde(default)]
        queries: Vec<QueryPlan>,
    },
    Or {
        #[serde(default)]
        queries: Vec<QueryPlan>,
    },
    Not {
        query: Box<QueryPlan>,
    },
    /// Without `matching`, an empty `and` is used.
    Boost {
        matching: Option<Box<QueryPlan>>,
        boosting: Box<QueryPlan>,
    },
    PropertiesFragment {
        query: Box<QueryPlan>,
    },
    Directory {
        #[serde(default)]
        uri: Value,
    },
    Collection {
        #[serde(default)]
        uri: Value,
    },
    Document {
        #[serde(default)]
        uri: Value,
    },
    DocumentFragment {
        query: Box<QueryPlan>,
    },
    LocksFragment {
        query: Box<QueryPlan>,
    },
    Range {
        name: String,
        operator: Option<RangeOperator>,
        values: Value,
        #[serde(default)]
        options: Value,
    },
    /// `values` is required; an explicit `null` is a null term.
    Value {
        name: String,
        values: Value,
        weight: Option<f64>,
    },
    Word {
        name: String,
        text: Value,
        weight: Option<f64>,
    },
    CollectionConstraint {
        name: String,
        #[serde(default)]
        uri: Value,
    },
    Custom {
        name: String,
        text: Value,
    },
    CustomGeospatial {
        name: String,
        annotation: Option<Value>,
        #[serde(default)]
        shapes: Value,
    },
    Geospatial {
        name: String,
        #[serde(default)]
        shapes: Value,
    },
    /// Dispatch on a constraint kind label.
    Constraint {
        kind: Option<String>,
        name: String,
        #[serde(default)]
        values: Value,
    },
    OperatorState {
        operator: String,
        state: String,
    },
}

impl QueryPlan {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| BuilderError::Plan(e.to_string()))
    }

    /// Compile with the permissive defaults.
    pub fn compile(self) -> Result<QueryNode> {
        self.compile_with(&QueryBuilder::default())
    }

    /// Compile, letting `builder`'s configuration decide how fallbacks are handled.
    pub fn compile_with(self, builder: &QueryBuilder) -> Result<QueryNode> {
        let compile_all = |plans: Vec<QueryPlan>| -> Result<Vec<QueryNode>> {
            plans.into_iter().map(|p| p.compile_with(builder)).collect()
        };
        let node = match self {
            QueryPlan::Query { queries } => query(compile_all(queries)?),
            QueryPlan::Qtext { text } => qtext(text),
            QueryPlan::Term { text, weight } => term(strings("text", text)?, weight),
            QueryPlan::And { queries } => and(compile_all(queries)?),
            QueryPlan::Or { queries } => or(compile_all(queries)?),
            QueryPlan::Not { query } => not(query.compile_with(builder)?),
            QueryPlan::Boost { matching, boosting } => {
                let boosting = boosting.compile_with(builder)?;
                match matching {
                    Some(matching) => boost(matching.compile_with(builder)?, boosting),
                    None => boost_default(boosting),
                }
            }
            QueryPlan::PropertiesFragment { query } => {
                properties_fragment(query.compile_with(builder)?)
            }
            QueryPlan::Directory { uri } => directory(strings("uri", uri)?),
            QueryPlan::Collection { uri } => collection(strings("uri", uri)?),
            QueryPlan::Document { uri } => document(strings("uri", uri)?),
            QueryPlan::DocumentFragment { query } => {
                document_fragment(query.compile_with(builder)?)
            }
            QueryPlan::LocksFragment { query } => locks_fragment(query.compile_with(builder)?),
            QueryPlan::Range {
                name,
                operator,
                values,
                options,
            } => range_constraint(
                name,
                values,
                RangeArgs {
                    operator,
                    range_options: strings("options", options)?,
                },
            ),
            QueryPlan::Value {
                name,
                values,
                weight,
            } => builder.value_constraint_json(name, values, weight)?,
            QueryPlan::Word { name, text, weight } => {
                word_constraint(name, strings("text", text)?, weight)
            }
            QueryPlan::CollectionConstraint { name, uri } => {
                collection_constraint(name, strings("uri", uri)?)
            }
            QueryPlan::Custom { name, text } => custom_constraint(name, strings("text", text)?),
            QueryPlan::CustomGeospatial {
                name,
                annotation,
                shapes,
            } => builder.custom_geospatial_constraint(name, annotation, optional(shapes))?,
            QueryPlan::Geospatial { name, shapes } => {
                builder.geospatial_constraint(name, optional(shapes))?
            }
            QueryPlan::Constraint { kind, name, values } => {
                let kind = builder.constraint_kind(kind.as_deref())?;
                builder.build_constraint(kind, &name, optional(values))?
            }
            QueryPlan::OperatorState { operator, state } => operator_state(operator, state),
        };
        Ok(node)
    }
}

/// A defaulted (absent) argument is an empty list rather than `[null]`.
fn optional(value: Value) -> Vec<Value> {
    if value.is_null() {
        Vec::new()
    } else {
        coerce_value(value)
    }
}

fn strings(field: &str, value: Value) -> Result<Vec<String>> {
    optional(value)
        .into_iter()
        .map(|v| match v {
            Value::String(s) => Ok(s),
            other => Err(BuilderError::Plan(format!(
                "`{field}` expects strings, got {other}"
            ))),
        })
        .collect()
}
