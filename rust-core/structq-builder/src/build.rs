// SPDX-License-Identifier: PMPL-1.0-or-later
//! Query node constructors.
//!
//! One function per grammar production, listed in the order of the structured
//! query syntax reference. Each returns a fresh [`QueryNode`]; none of them
//! validate names or values, and none can fail.
//!
//! Defaults applied here:
//! - weights that are absent, zero or NaN become `1.0`
//! - `and-query` is never ordered, `directory-query` is always infinite
//! - a range constraint without an operator uses `EQ`
//! - one-or-many arguments are coerced to lists via [`IntoSequence`]

use serde_json::Value;

use crate::coerce::IntoSequence;
use crate::error::{BuilderError, Result};
use crate::model::{
    AndQuery, BoostQuery, CollectionConstraintQuery, CustomConstraintQuery, CustomGeospatialQuery,
    CustomTermsQuery, DirectoryQuery, GeospatialConstraintQuery, OneOrMany, OperatorState,
    QueryList, QueryNode, RangeConstraintQuery, RangeOperator, ShapeBuckets, TermQuery, UriQuery,
    ValueConstraintQuery, ValueTerms, WordConstraintQuery,
};
use crate::shape::{classify, IntoShapes};

/// Weight used when the caller gives none.
pub const DEFAULT_WEIGHT: f64 = 1.0;

fn weight_or_default(weight: Option<f64>) -> f64 {
    match weight {
        Some(w) if w != 0.0 && !w.is_nan() => w,
        _ => DEFAULT_WEIGHT,
    }
}

// ---------------------------------------------------------------------------
// Combinators
// ---------------------------------------------------------------------------

/// Top-level `query` wrapper around any number of child queries.
pub fn query(queries: impl IntoIterator<Item = QueryNode>) -> QueryNode {
    QueryNode::Query(QueryList {
        queries: queries.into_iter().collect(),
    })
}

/// Free text, passed through exactly as given.
pub fn qtext(text: impl Into<OneOrMany<String>>) -> QueryNode {
    QueryNode::Qtext(text.into())
}

pub fn term(text: impl IntoSequence<String>, weight: Option<f64>) -> QueryNode {
    QueryNode::Term(TermQuery {
        text: text.into_sequence(),
        weight: weight_or_default(weight),
    })
}

pub fn and(queries: impl IntoIterator<Item = QueryNode>) -> QueryNode {
    QueryNode::And(AndQuery {
        queries: queries.into_iter().collect(),
        ordered: false,
    })
}

pub fn or(queries: impl IntoIterator<Item = QueryNode>) -> QueryNode {
    QueryNode::Or(QueryList {
        queries: queries.into_iter().collect(),
    })
}

pub fn not(query: QueryNode) -> QueryNode {
    QueryNode::Not(Box::new(query))
}

pub fn boost(matching: QueryNode, boosting: QueryNode) -> QueryNode {
    QueryNode::Boost(BoostQuery {
        matching_query: Box::new(matching),
        boosting_query: Box::new(boosting),
    })
}

/// Boost with an empty `and-query` as the matching query.
pub fn boost_default(boosting: QueryNode) -> QueryNode {
    boost(and([]), boosting)
}

// ---------------------------------------------------------------------------
// Scoping
// ---------------------------------------------------------------------------

pub fn properties_fragment(query: QueryNode) -> QueryNode {
    QueryNode::PropertiesFragment(Box::new(query))
}

/// Documents in the given directories, at any depth.
pub fn directory(uris: impl IntoSequence<String>) -> QueryNode {
    QueryNode::Directory(DirectoryQuery {
        uri: uris.into_sequence(),
        infinite: true,
    })
}

pub fn collection(uris: impl IntoSequence<String>) -> QueryNode {
    QueryNode::Collection(UriQuery {
        uri: uris.into_sequence(),
    })
}

pub fn document(uris: impl IntoSequence<String>) -> QueryNode {
    QueryNode::Document(UriQuery {
        uri: uris.into_sequence(),
    })
}

pub fn document_fragment(query: QueryNode) -> QueryNode {
    QueryNode::DocumentFragment(Box::new(query))
}

pub fn locks_fragment(query: QueryNode) -> QueryNode {
    QueryNode::LocksFragment(Box::new(query))
}

// ---------------------------------------------------------------------------
// Constraints
// ---------------------------------------------------------------------------

/// Optional parts of a range constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeArgs {
    /// Defaults to [`RangeOperator::Eq`].
    pub operator: Option<RangeOperator>,
    /// Platform range options such as `"min=10"`; empty by default.
    pub range_options: Vec<String>,
}

impl RangeArgs {
    pub fn operator(mut self, operator: RangeOperator) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn option(mut self, option: impl Into<String>) -> Self {
        self.range_options.push(option.into());
        self
    }
}

pub fn range_constraint(
    name: impl Into<String>,
    values: impl IntoSequence<Value>,
    args: RangeArgs,
) -> QueryNode {
    QueryNode::RangeConstraint(RangeConstraintQuery {
        constraint_name: name.into(),
        range_operator: args.operator.unwrap_or_default(),
        value: values.into_sequence(),
        range_option: args.range_options,
    })
}

impl ValueTerms {
    pub fn text(values: impl IntoSequence<String>) -> Self {
        ValueTerms::Text(values.into_sequence().into_iter().map(Value::String).collect())
    }

    /// Numeric terms; integers stay integers on the wire.
    pub fn number(values: impl IntoSequence<Value>) -> Self {
        ValueTerms::Number(values.into_sequence())
    }

    pub fn boolean(values: impl IntoIterator<Item = bool>) -> Self {
        ValueTerms::Boolean(values.into_iter().map(Value::Bool).collect())
    }

    /// A single `null` term.
    pub fn null() -> Self {
        ValueTerms::Null(vec![Value::Null])
    }

    /// Tag untyped terms by their first element.
    ///
    /// Strings tag as text, numbers as number, booleans as boolean and null
    /// as null. An empty list, or one led by an array or object, has no
    /// matching key and is tagged as text.
    pub fn from_json(values: impl IntoSequence<Value>) -> Self {
        let values = values.into_sequence();
        match values.first() {
            Some(Value::Number(_)) => ValueTerms::Number(values),
            Some(Value::Bool(_)) => ValueTerms::Boolean(values),
            Some(Value::Null) => ValueTerms::Null(values),
            _ => ValueTerms::Text(values),
        }
    }

    /// Like [`ValueTerms::from_json`], but refuses lists with no natural tag.
    pub fn from_json_strict(values: impl IntoSequence<Value>) -> Result<Self> {
        let values = values.into_sequence();
        match values.first() {
            None => Err(BuilderError::UntaggableValue("no terms given".to_string())),
            Some(first @ (Value::Array(_) | Value::Object(_))) => Err(
                BuilderError::UntaggableValue(format!("first term is not a scalar: {first}")),
            ),
            _ => Ok(Self::from_json(values)),
        }
    }
}

impl From<&str> for ValueTerms {
    fn from(value: &str) -> Self {
        ValueTerms::text(value)
    }
}

impl From<String> for ValueTerms {
    fn from(value: String) -> Self {
        ValueTerms::text(value)
    }
}

impl From<Vec<&str>> for ValueTerms {
    fn from(values: Vec<&str>) -> Self {
        ValueTerms::text(values)
    }
}

impl From<i32> for ValueTerms {
    fn from(value: i32) -> Self {
        ValueTerms::number(value)
    }
}

impl From<i64> for ValueTerms {
    fn from(value: i64) -> Self {
        ValueTerms::number(value)
    }
}

/// JSON has no NaN or infinity; a non-finite number is a `null` term.
impl From<f64> for ValueTerms {
    fn from(value: f64) -> Self {
        if value.is_finite() {
            ValueTerms::number(value)
        } else {
            ValueTerms::null()
        }
    }
}

impl From<bool> for ValueTerms {
    fn from(value: bool) -> Self {
        ValueTerms::boolean([value])
    }
}

impl From<Value> for ValueTerms {
    fn from(value: Value) -> Self {
        ValueTerms::from_json(value)
    }
}

pub fn value_constraint(
    name: impl Into<String>,
    terms: impl Into<ValueTerms>,
    weight: Option<f64>,
) -> QueryNode {
    QueryNode::ValueConstraint(ValueConstraintQuery {
        constraint_name: name.into(),
        weight: weight_or_default(weight),
        terms: terms.into(),
    })
}

pub fn word_constraint(
    name: impl Into<String>,
    text: impl IntoSequence<String>,
    weight: Option<f64>,
) -> QueryNode {
    QueryNode::WordConstraint(WordConstraintQuery {
        constraint_name: name.into(),
        text: text.into_sequence(),
        weight: weight_or_default(weight),
    })
}

pub fn collection_constraint(name: impl Into<String>, uris: impl IntoSequence<String>) -> QueryNode {
    QueryNode::CollectionConstraint(CollectionConstraintQuery {
        constraint_name: name.into(),
        uri: uris.into_sequence(),
    })
}

pub fn custom_constraint(name: impl Into<String>, terms: impl IntoSequence<String>) -> QueryNode {
    QueryNode::CustomConstraint(CustomConstraintQuery::Terms(CustomTermsQuery {
        constraint_name: name.into(),
        text: terms.into_sequence(),
    }))
}

/// Custom constraint over shapes; untyped shapes that fit no bucket are dropped.
///
/// Use [`crate::QueryBuilder`] in strict mode to have them reported instead.
pub fn custom_geospatial_constraint(
    name: impl Into<String>,
    annotation: Option<Value>,
    shapes: impl IntoShapes,
) -> QueryNode {
    custom_geospatial_node(name.into(), annotation, classify(shapes).into())
}

/// Geospatial constraint over shapes; untyped shapes that fit no bucket are dropped.
pub fn geospatial_constraint(name: impl Into<String>, shapes: impl IntoShapes) -> QueryNode {
    geospatial_node(name.into(), classify(shapes).into())
}

pub(crate) fn custom_geospatial_node(
    name: String,
    annotation: Option<Value>,
    shapes: ShapeBuckets,
) -> QueryNode {
    QueryNode::CustomConstraint(CustomConstraintQuery::Geospatial(CustomGeospatialQuery {
        constraint_name: name,
        annotation,
        shapes,
    }))
}

pub(crate) fn geospatial_node(name: String, shapes: ShapeBuckets) -> QueryNode {
    QueryNode::GeospatialConstraint(GeospatialConstraintQuery {
        constraint_name: name,
        shapes,
    })
}

// ---------------------------------------------------------------------------
// Operator state
// ---------------------------------------------------------------------------

pub fn operator_state(operator_name: impl Into<String>, state_name: impl Into<String>) -> QueryNode {
    QueryNode::OperatorState(OperatorState {
        operator_name: operator_name.into(),
        state_name: state_name.into(),
    })
}

// ---------------------------------------------------------------------------
// Deprecated names
// ---------------------------------------------------------------------------

#[deprecated(note = "use `qtext`")]
pub fn text(text: impl Into<OneOrMany<String>>) -> QueryNode {
    qtext(text)
}

#[deprecated(note = "use `range_constraint`")]
pub fn range(name: impl Into<String>, values: impl IntoSequence<Value>, args: RangeArgs) -> QueryNode {
    range_constraint(name, values, args)
}

// No `collection` alias for `collection_constraint`: that name is taken by `collection-query`.

#[deprecated(note = "use `custom_constraint`")]
pub fn custom(name: impl Into<String>, terms: impl IntoSequence<String>) -> QueryNode {
    custom_constraint(name, terms)
}

#[deprecated(note = "use `properties_fragment`")]
pub fn properties(query: QueryNode) -> QueryNode {
    properties_fragment(query)
}

#[deprecated(note = "use `operator_state`")]
pub fn operator(operator_name: impl Into<String>, state_name: impl Into<String>) -> QueryNode {
    operator_state(operator_name, state_name)
}
