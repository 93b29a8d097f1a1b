// SPDX-License-Identifier: PMPL-1.0-or-later
//! Constraint dispatch.
//!
//! Maps a constraint kind to a constructor so callers can pick the kind from
//! data (a label in a request, or a constraint definition from a search
//! options document) instead of naming a function in code.
//!
//! All kinds share one dynamic entry signature, [`ConstraintFn`]: a constraint
//! name and the already-coerced values. Each entry applies the same defaults
//! as its static constructor, so
//! `constraint(ConstraintKind::Word)("w", vec![json!("a")])` equals
//! `word_constraint("w", "a", None)`.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use tracing::{debug, warn};

use crate::build::{
    collection_constraint, custom_constraint, custom_geospatial_constraint, geospatial_constraint,
    range_constraint, value_constraint, word_constraint, RangeArgs,
};
use crate::error::BuilderError;
use crate::model::{QueryNode, ValueTerms};

/// Dynamic constraint constructor: `(constraint name, values) -> node`.
pub type ConstraintFn = fn(&str, Vec<Value>) -> QueryNode;

/// The constraint kinds that can be dispatched on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    Range,
    Value,
    Word,
    Collection,
    Custom,
    CustomGeospatial,
    Geospatial,
    /// No kind given, or one that was not recognised. Builds a range constraint.
    #[default]
    Unspecified,
}

impl ConstraintKind {
    /// Every kind with a label, in dispatch order.
    pub const LABELLED: [ConstraintKind; 7] = [
        ConstraintKind::Range,
        ConstraintKind::Value,
        ConstraintKind::Word,
        ConstraintKind::Collection,
        ConstraintKind::Custom,
        ConstraintKind::CustomGeospatial,
        ConstraintKind::Geospatial,
    ];

    /// The label this kind is selected by; `None` for [`ConstraintKind::Unspecified`].
    pub fn label(self) -> Option<&'static str> {
        match self {
            ConstraintKind::Range => Some("range"),
            ConstraintKind::Value => Some("value"),
            ConstraintKind::Word => Some("word"),
            ConstraintKind::Collection => Some("collection"),
            ConstraintKind::Custom => Some("custom"),
            ConstraintKind::CustomGeospatial => Some("custom-geospatial"),
            ConstraintKind::Geospatial => Some("geospatial"),
            ConstraintKind::Unspecified => None,
        }
    }

    /// Total label lookup: anything unrecognised, or no label, is `Unspecified`.
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            None => ConstraintKind::Unspecified,
            Some(label) => label.parse().unwrap_or_else(|_| {
                if !label.is_empty() {
                    warn!(label, "Unknown constraint kind, falling back to range");
                }
                ConstraintKind::Unspecified
            }),
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label().unwrap_or("unspecified"))
    }
}

/// Strict label parse. Labels are matched exactly, as the search options use them.
impl FromStr for ConstraintKind {
    type Err = BuilderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::LABELLED
            .into_iter()
            .find(|kind| kind.label() == Some(s))
            .ok_or_else(|| BuilderError::UnknownConstraintKind(s.to_string()))
    }
}

/// Constructor for a kind. `Unspecified` gets the range constructor.
pub fn constraint(kind: ConstraintKind) -> ConstraintFn {
    match kind {
        ConstraintKind::Range => range_entry,
        ConstraintKind::Value => value_entry,
        ConstraintKind::Word => word_entry,
        ConstraintKind::Collection => collection_entry,
        ConstraintKind::Custom => custom_entry,
        ConstraintKind::CustomGeospatial => custom_geospatial_entry,
        ConstraintKind::Geospatial => geospatial_entry,
        ConstraintKind::Unspecified => {
            debug!("No constraint kind given, using range");
            range_entry
        }
    }
}

/// Constructor for a label, with the permissive range fallback.
pub fn constraint_for_label(label: Option<&str>) -> ConstraintFn {
    constraint(ConstraintKind::from_label(label))
}

/// Strings pass through; other JSON values are written out as JSON text.
fn as_strings(values: Vec<Value>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| match v {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .collect()
}

fn range_entry(name: &str, values: Vec<Value>) -> QueryNode {
    range_constraint(name, values, RangeArgs::default())
}

fn value_entry(name: &str, values: Vec<Value>) -> QueryNode {
    value_constraint(name, ValueTerms::from_json(values), None)
}

fn word_entry(name: &str, values: Vec<Value>) -> QueryNode {
    word_constraint(name, as_strings(values), None)
}

fn collection_entry(name: &str, values: Vec<Value>) -> QueryNode {
    collection_constraint(name, as_strings(values))
}

fn custom_entry(name: &str, values: Vec<Value>) -> QueryNode {
    custom_constraint(name, as_strings(values))
}

fn custom_geospatial_entry(name: &str, values: Vec<Value>) -> QueryNode {
    custom_geospatial_constraint(name, None, values)
}

fn geospatial_entry(name: &str, values: Vec<Value>) -> QueryNode {
    geospatial_constraint(name, values)
}
