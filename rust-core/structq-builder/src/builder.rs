// SPDX-License-Identifier: PMPL-1.0-or-later
//! Configured query builder.
//!
//! [`QueryBuilder`] wraps the entry points that have a silent fallback and
//! lets [`BuilderConfig`] decide whether the fallback applies or is reported.
//! With the default (permissive) configuration every method returns `Ok` with
//! exactly what the free function would have built.

use serde_json::Value;
use tracing::debug;

use crate::build::{custom_geospatial_node, geospatial_node, value_constraint};
use crate::coerce::IntoSequence;
use crate::config::BuilderConfig;
use crate::dispatch::{constraint, ConstraintKind};
use crate::error::Result;
use crate::model::{QueryNode, ValueTerms};
use crate::shape::{classify_with, IntoShapes};

/// Builds the fallible constraint kinds under a [`BuilderConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryBuilder {
    config: BuilderConfig,
}

impl QueryBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        Self { config }
    }

    /// Both modes strict.
    pub fn strict() -> Self {
        Self::new(BuilderConfig::strict())
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: BuilderConfig) {
        self.config = config;
    }

    pub fn geospatial_constraint(
        &self,
        name: impl Into<String>,
        shapes: impl IntoShapes,
    ) -> Result<QueryNode> {
        let classified = classify_with(shapes, self.config.shape_mode)?;
        Ok(geospatial_node(name.into(), classified.into()))
    }

    pub fn custom_geospatial_constraint(
        &self,
        name: impl Into<String>,
        annotation: Option<Value>,
        shapes: impl IntoShapes,
    ) -> Result<QueryNode> {
        let classified = classify_with(shapes, self.config.shape_mode)?;
        Ok(custom_geospatial_node(name.into(), annotation, classified.into()))
    }

    /// Resolve a constraint label to its kind.
    ///
    /// A missing label always means range. An unrecognised label means range
    /// when permissive and [`crate::BuilderError::UnknownConstraintKind`] when strict.
    pub fn constraint_kind(&self, label: Option<&str>) -> Result<ConstraintKind> {
        let kind = match label {
            Some(label) if self.config.label_mode.is_strict() => label.parse()?,
            _ => ConstraintKind::from_label(label),
        };
        debug!(%kind, "Resolved constraint kind");
        Ok(kind)
    }

    /// Resolve a constraint label to a constructor that honours this configuration.
    pub fn constraint(
        &self,
        label: Option<&str>,
    ) -> Result<impl Fn(&str, Vec<Value>) -> Result<QueryNode>> {
        let kind = self.constraint_kind(label)?;
        let builder = *self;
        Ok(move |name: &str, values: Vec<Value>| builder.build_constraint(kind, name, values))
    }

    /// Build a constraint of `kind`.
    ///
    /// Shape and value kinds go through the configured checks; the others
    /// cannot fail and match [`crate::constraint`].
    pub fn build_constraint(
        &self,
        kind: ConstraintKind,
        name: &str,
        values: Vec<Value>,
    ) -> Result<QueryNode> {
        match kind {
            ConstraintKind::Value => self.value_constraint_json(name, values, None),
            ConstraintKind::Geospatial => self.geospatial_constraint(name, values),
            ConstraintKind::CustomGeospatial => {
                self.custom_geospatial_constraint(name, None, values)
            }
            _ => Ok(constraint(kind)(name, values)),
        }
    }

    /// Value constraint over untyped terms, tagged by the first term.
    pub fn value_constraint_json(
        &self,
        name: impl Into<String>,
        values: impl IntoSequence<Value>,
        weight: Option<f64>,
    ) -> Result<QueryNode> {
        let terms = if self.config.label_mode.is_strict() {
            ValueTerms::from_json_strict(values)?
        } else {
            ValueTerms::from_json(values)
        };
        Ok(value_constraint(name, terms, weight))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{
        custom_geospatial_constraint, geospatial_constraint, range_constraint, word_constraint,
        RangeArgs,
    };
    use crate::error::BuilderError;
    use serde_json::json;

    fn shapes() -> Vec<Value> {
        vec![json!({"latitude": 1.5, "longitude": 2.5}), json!("not a shape")]
    }

    #[test]
    fn test_permissive_matches_free_functions() {
        let qb = QueryBuilder::default();
        assert_eq!(
            qb.geospatial_constraint("geo", shapes()).unwrap(),
            geospatial_constraint("geo", shapes())
        );
        assert_eq!(
            qb.custom_geospatial_constraint("geo", Some(json!("a")), shapes()).unwrap(),
            custom_geospatial_constraint("geo", Some(json!("a")), shapes())
        );
        let f = qb.constraint(Some("nope")).unwrap();
        assert_eq!(
            f("n", vec![json!("v")]).unwrap(),
            range_constraint("n", "v", RangeArgs::default())
        );
        for kind in ConstraintKind::LABELLED {
            assert_eq!(
                qb.build_constraint(kind, "n", shapes()).unwrap(),
                constraint(kind)("n", shapes())
            );
        }
    }

    #[test]
    fn test_strict_reports_dropped_shapes() {
        let qb = QueryBuilder::strict();
        let err = qb.geospatial_constraint("geo", shapes()).unwrap_err();
        assert!(matches!(err, BuilderError::UnclassifiableShape { index: 1, .. }));
        assert!(qb
            .custom_geospatial_constraint("geo", None, json!({"latitude": 3}))
            .is_ok());
    }

    #[test]
    fn test_strict_reports_unknown_labels() {
        let qb = QueryBuilder::strict();
        assert!(matches!(
            qb.constraint(Some("nope")),
            Err(BuilderError::UnknownConstraintKind(_))
        ));
        // No label at all is still the documented range default.
        assert!(qb.constraint(None).is_ok());
        assert!(qb.constraint(Some("word")).is_ok());
    }

    #[test]
    fn test_strict_dispatch_runs_configured_checks() {
        let qb = QueryBuilder::strict();
        let geo = qb.constraint(Some("geospatial")).unwrap();
        assert!(matches!(
            geo("g", vec![json!("not a shape")]),
            Err(BuilderError::UnclassifiableShape { index: 0, .. })
        ));
        let custom = qb.constraint(Some("custom-geospatial")).unwrap();
        assert!(matches!(
            custom("g", shapes()),
            Err(BuilderError::UnclassifiableShape { index: 1, .. })
        ));
        let value = qb.constraint(Some("value")).unwrap();
        assert!(matches!(value("n", vec![]), Err(BuilderError::UntaggableValue(_))));
        assert!(value("n", vec![json!(3)]).is_ok());

        let word = qb.constraint(Some("word")).unwrap();
        assert_eq!(word("w", vec![json!("a")]).unwrap(), word_constraint("w", "a", None));
    }

    #[test]
    fn test_shape_mode_alone_is_honoured() {
        let qb = QueryBuilder::new(BuilderConfig {
            shape_mode: crate::ClassificationMode::Strict,
            ..BuilderConfig::default()
        });
        assert!(qb.constraint(Some("nope")).is_ok());
        assert!(qb
            .build_constraint(ConstraintKind::Geospatial, "g", vec![json!({"south": 0})])
            .is_err());
        assert!(qb
            .build_constraint(ConstraintKind::Value, "n", vec![])
            .is_ok());
    }

    #[test]
    fn test_value_constraint_json_modes() {
        let permissive = QueryBuilder::default();
        let node = permissive.value_constraint_json("n", json!([]), None).unwrap();
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({"value-constraint-query": {"constraint-name": "n", "weight": 1.0, "text": []}})
        );

        let strict = QueryBuilder::strict();
        assert!(matches!(
            strict.value_constraint_json("n", json!([]), None),
            Err(BuilderError::UntaggableValue(_))
        ));
        assert!(strict.value_constraint_json("n", json!(4.5), Some(2.0)).is_ok());
    }
}
