// SPDX-License-Identifier: PMPL-1.0-or-later
//! Query node types.
//!
//! A [`QueryNode`] is one production of the structured query grammar. Every
//! variant serializes to a JSON object with exactly one key, the grammar tag,
//! whose value is the node's parameter object. Trees are built by nesting
//! nodes; nothing is ever mutated in place.
//!
//! ```text
//! {"and-query": {"queries": [{"term-query": {"text": ["a"], "weight": 1.0}}], "ordered": false}}
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BuilderError;
use crate::shape::ShapeClassification;

/// One production of the structured query grammar.
///
/// Serde's externally tagged representation gives the single-key wire shape;
/// the `rename` on each variant is the exact grammar tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryNode {
    #[serde(rename = "query")]
    Query(QueryList),
    /// Free text, emitted as given (string or list) without coercion.
    #[serde(rename = "qtext")]
    Qtext(OneOrMany<String>),
    #[serde(rename = "term-query")]
    Term(TermQuery),
    #[serde(rename = "and-query")]
    And(AndQuery),
    #[serde(rename = "or-query")]
    Or(QueryList),
    #[serde(rename = "not-query")]
    Not(Box<QueryNode>),
    #[serde(rename = "boost-query")]
    Boost(BoostQuery),
    #[serde(rename = "properties-fragment-query")]
    PropertiesFragment(Box<QueryNode>),
    #[serde(rename = "directory-query")]
    Directory(DirectoryQuery),
    #[serde(rename = "collection-query")]
    Collection(UriQuery),
    #[serde(rename = "document-query")]
    Document(UriQuery),
    #[serde(rename = "document-fragment-query")]
    DocumentFragment(Box<QueryNode>),
    #[serde(rename = "locks-fragment-query")]
    LocksFragment(Box<QueryNode>),
    #[serde(rename = "range-constraint-query")]
    RangeConstraint(RangeConstraintQuery),
    #[serde(rename = "value-constraint-query")]
    ValueConstraint(ValueConstraintQuery),
    #[serde(rename = "word-constraint-query")]
    WordConstraint(WordConstraintQuery),
    #[serde(rename = "collection-constraint-query")]
    CollectionConstraint(CollectionConstraintQuery),
    /// Shared by plain custom constraints and custom geospatial constraints.
    #[serde(rename = "custom-constraint-query")]
    CustomConstraint(CustomConstraintQuery),
    #[serde(rename = "geospatial-constraint-query")]
    GeospatialConstraint(GeospatialConstraintQuery),
    #[serde(rename = "operator-state")]
    OperatorState(OperatorState),
}

impl QueryNode {
    /// The grammar tag this node serializes under.
    pub fn tag(&self) -> &'static str {
        match self {
            QueryNode::Query(_) => "query",
            QueryNode::Qtext(_) => "qtext",
            QueryNode::Term(_) => "term-query",
            QueryNode::And(_) => "and-query",
            QueryNode::Or(_) => "or-query",
            QueryNode::Not(_) => "not-query",
            QueryNode::Boost(_) => "boost-query",
            QueryNode::PropertiesFragment(_) => "properties-fragment-query",
            QueryNode::Directory(_) => "directory-query",
            QueryNode::Collection(_) => "collection-query",
            QueryNode::Document(_) => "document-query",
            QueryNode::DocumentFragment(_) => "document-fragment-query",
            QueryNode::LocksFragment(_) => "locks-fragment-query",
            QueryNode::RangeConstraint(_) => "range-constraint-query",
            QueryNode::ValueConstraint(_) => "value-constraint-query",
            QueryNode::WordConstraint(_) => "word-constraint-query",
            QueryNode::CollectionConstraint(_) => "collection-constraint-query",
            QueryNode::CustomConstraint(_) => "custom-constraint-query",
            QueryNode::GeospatialConstraint(_) => "geospatial-constraint-query",
            QueryNode::OperatorState(_) => "operator-state",
        }
    }

    /// Compact wire JSON.
    pub fn to_json(&self) -> Result<String, BuilderError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Indented wire JSON, for humans.
    pub fn to_json_pretty(&self) -> Result<String, BuilderError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a node back from wire JSON.
    pub fn from_json(json: &str) -> Result<Self, BuilderError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl fmt::Display for QueryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

/// A string or a list of strings, kept exactly as the caller gave it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl From<&str> for OneOrMany<String> {
    fn from(value: &str) -> Self {
        OneOrMany::One(value.to_string())
    }
}

impl From<String> for OneOrMany<String> {
    fn from(value: String) -> Self {
        OneOrMany::One(value)
    }
}

impl<S: Into<String>> From<Vec<S>> for OneOrMany<String> {
    fn from(values: Vec<S>) -> Self {
        OneOrMany::Many(values.into_iter().map(Into::into).collect())
    }
}

/// `{queries}` body shared by `query` and `or-query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryList {
    pub queries: Vec<QueryNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermQuery {
    pub text: Vec<String>,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AndQuery {
    pub queries: Vec<QueryNode>,
    /// Always `false` when built through [`crate::build::and`].
    pub ordered: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BoostQuery {
    pub matching_query: Box<QueryNode>,
    pub boosting_query: Box<QueryNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryQuery {
    pub uri: Vec<String>,
    /// Always `true` when built through [`crate::build::directory`].
    pub infinite: bool,
}

/// `{uri}` body shared by `collection-query` and `document-query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UriQuery {
    pub uri: Vec<String>,
}

/// Comparison applied by a range constraint.
///
/// Serialized upper case; parsed in any case, as [`FromStr`] does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum RangeOperator {
    Lt,
    Le,
    Gt,
    Ge,
    #[default]
    Eq,
    Ne,
}

impl RangeOperator {
    pub const ALL: [RangeOperator; 6] = [
        RangeOperator::Lt,
        RangeOperator::Le,
        RangeOperator::Gt,
        RangeOperator::Ge,
        RangeOperator::Eq,
        RangeOperator::Ne,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RangeOperator::Lt => "LT",
            RangeOperator::Le => "LE",
            RangeOperator::Gt => "GT",
            RangeOperator::Ge => "GE",
            RangeOperator::Eq => "EQ",
            RangeOperator::Ne => "NE",
        }
    }
}

impl fmt::Display for RangeOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RangeOperator {
    type Err = BuilderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LT" => Ok(RangeOperator::Lt),
            "LE" => Ok(RangeOperator::Le),
            "GT" => Ok(RangeOperator::Gt),
            "GE" => Ok(RangeOperator::Ge),
            "EQ" => Ok(RangeOperator::Eq),
            "NE" => Ok(RangeOperator::Ne),
            _ => Err(BuilderError::UnknownRangeOperator(s.to_string())),
        }
    }
}

impl TryFrom<String> for RangeOperator {
    type Error = BuilderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RangeConstraintQuery {
    pub constraint_name: String,
    pub range_operator: RangeOperator,
    pub value: Vec<Value>,
    pub range_option: Vec<String>,
}

/// Terms of a value constraint, tagged by the kind of the first term.
///
/// The tag becomes the JSON key next to `constraint-name` and `weight`:
/// `text`, `number`, `boolean` or `null`. Later terms are carried as given,
/// so a mixed list keeps the tag of its first element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueTerms {
    #[serde(rename = "text")]
    Text(Vec<Value>),
    #[serde(rename = "number")]
    Number(Vec<Value>),
    #[serde(rename = "boolean")]
    Boolean(Vec<Value>),
    #[serde(rename = "null")]
    Null(Vec<Value>),
}

impl ValueTerms {
    /// Output key for this tag.
    pub fn key(&self) -> &'static str {
        match self {
            ValueTerms::Text(_) => "text",
            ValueTerms::Number(_) => "number",
            ValueTerms::Boolean(_) => "boolean",
            ValueTerms::Null(_) => "null",
        }
    }

    pub fn values(&self) -> &[Value] {
        match self {
            ValueTerms::Text(v)
            | ValueTerms::Number(v)
            | ValueTerms::Boolean(v)
            | ValueTerms::Null(v) => v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ValueConstraintQuery {
    pub constraint_name: String,
    pub weight: f64,
    #[serde(flatten)]
    pub terms: ValueTerms,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WordConstraintQuery {
    pub constraint_name: String,
    pub text: Vec<String>,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CollectionConstraintQuery {
    pub constraint_name: String,
    pub uri: Vec<String>,
}

/// Body of `custom-constraint-query`: geospatial shapes or plain terms.
///
/// Geospatial is tried first when deserializing since the term form has no
/// shape buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CustomConstraintQuery {
    Geospatial(CustomGeospatialQuery),
    Terms(CustomTermsQuery),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CustomTermsQuery {
    pub constraint_name: String,
    pub text: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CustomGeospatialQuery {
    pub constraint_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Value>,
    #[serde(flatten)]
    pub shapes: ShapeBuckets,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GeospatialConstraintQuery {
    pub constraint_name: String,
    #[serde(flatten)]
    pub shapes: ShapeBuckets,
}

/// The four shape lists embedded in both geospatial constraint bodies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeBuckets {
    pub point: Vec<Value>,
    #[serde(rename = "box")]
    pub bounding_box: Vec<Value>,
    pub circle: Vec<Value>,
    pub polygon: Vec<Value>,
}

impl From<ShapeClassification> for ShapeBuckets {
    /// Unclassified shapes are not part of the wire format and are discarded here.
    fn from(classified: ShapeClassification) -> Self {
        Self {
            point: classified.points,
            bounding_box: classified.boxes,
            circle: classified.circles,
            polygon: classified.polygons,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OperatorState {
    pub operator_name: String,
    pub state_name: String,
}
