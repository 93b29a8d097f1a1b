// SPDX-License-Identifier: PMPL-1.0-or-later
//! Constraint definitions from a search options document.
//!
//! Search options declare constraints as `{"name": ..., <kind>: {...}}`
//! entries. Reading the kind from the definition lets a caller build the
//! right constraint query for a name without knowing its kind up front:
//!
//! ```json
//! {"options": {"constraint": [
//!     {"name": "decade", "range": {"type": "xs:gYear", "element": {"name": "year"}}},
//!     {"name": "tag", "word": {"element": {"name": "tag"}}}
//! ]}}
//! ```

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::builder::QueryBuilder;
use crate::coerce::{coerce_value, IntoSequence};
use crate::dispatch::{constraint, ConstraintKind};
use crate::error::{BuilderError, Result};
use crate::model::QueryNode;

/// Definition keys that mark a geospatial constraint.
const GEOSPATIAL_KEYS: [&str; 7] = [
    "geo-elem",
    "geo-elem-pair",
    "geo-attr-pair",
    "geo-path",
    "geo-json-property",
    "geo-json-property-pair",
    "geo-region-path",
];

/// One entry of the `constraint` list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConstraintDefinition {
    pub name: String,
    /// The kind key and its platform-specific body, plus anything else present.
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl ConstraintDefinition {
    /// Kind implied by the definition's keys; `Unspecified` if none is known.
    ///
    /// Custom geospatial constraints look like any other custom constraint
    /// here, so `custom` always maps to [`ConstraintKind::Custom`].
    pub fn kind(&self) -> ConstraintKind {
        let has = |key: &str| self.body.contains_key(key);
        if has("range") {
            ConstraintKind::Range
        } else if has("value") {
            ConstraintKind::Value
        } else if has("word") {
            ConstraintKind::Word
        } else if has("collection") {
            ConstraintKind::Collection
        } else if has("custom") {
            ConstraintKind::Custom
        } else if GEOSPATIAL_KEYS.iter().any(|&key| has(key)) {
            ConstraintKind::Geospatial
        } else {
            ConstraintKind::Unspecified
        }
    }
}

/// The constraint definitions of one search options document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOptions {
    pub constraints: Vec<ConstraintDefinition>,
}

impl SearchOptions {
    /// Parse `{"options": {"constraint": ...}}` or a bare `{"constraint": ...}`.
    ///
    /// `constraint` may be a single definition or a list of them.
    pub fn from_json(json: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(json)?;
        Self::from_value(root)
    }

    pub fn from_value(mut root: Value) -> Result<Self> {
        if let Some(options) = root.get_mut("options").map(Value::take) {
            root = options;
        }
        let Value::Object(mut fields) = root else {
            return Err(BuilderError::InvalidConfig(
                "search options must be a JSON object".to_string(),
            ));
        };
        let constraints = match fields.remove("constraint") {
            None | Some(Value::Null) => Vec::new(),
            Some(raw) => coerce_value(raw)
                .into_iter()
                .map(serde_json::from_value)
                .collect::<std::result::Result<Vec<ConstraintDefinition>, _>>()?,
        };
        debug!(count = constraints.len(), "Loaded constraint definitions");
        Ok(Self { constraints })
    }

    pub fn find(&self, name: &str) -> Option<&ConstraintDefinition> {
        self.constraints.iter().find(|c| c.name == name)
    }

    /// Kind of the named constraint; `Unspecified` when it is not defined.
    pub fn kind_of(&self, name: &str) -> ConstraintKind {
        self.find(name)
            .map(ConstraintDefinition::kind)
            .unwrap_or_default()
    }

    /// Build a constraint query for `name`, choosing the constructor from its definition.
    pub fn build(&self, name: &str, values: impl IntoSequence<Value>) -> QueryNode {
        constraint(self.kind_of(name))(name, values.into_sequence())
    }

    /// Like [`SearchOptions::build`], with `builder`'s checks applied to shapes and terms.
    pub fn build_with(
        &self,
        builder: &QueryBuilder,
        name: &str,
        values: impl IntoSequence<Value>,
    ) -> Result<QueryNode> {
        builder.build_constraint(self.kind_of(name), name, values.into_sequence())
    }
}
