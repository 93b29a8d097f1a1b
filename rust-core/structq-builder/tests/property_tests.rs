// SPDX-License-Identifier: PMPL-1.0-or-later
//! Property-based tests for the structured query builder

use proptest::prelude::*;
use serde_json::{json, Value};
use structq_builder::build::{and, boost, boost_default, not, or, qtext, range_constraint, term};
use structq_builder::{
    classify, coerce_args, coerce_value, constraint, ConstraintKind, QueryBuilder, RangeArgs, Shape,
    ShapeKind,
};

/// Generate arbitrary words
fn arb_word() -> impl Strategy<Value = String> {
    "[a-z]{1,12}"
}

/// Generate arbitrary leaf queries
fn arb_leaf() -> impl Strategy<Value = structq_builder::QueryNode> {
    prop_oneof![
        arb_word().prop_map(|w| qtext(w.as_str())),
        (arb_word(), 0.1f64..10.0).prop_map(|(w, weight)| term(w, Some(weight))),
    ]
}

/// Generate arbitrary scalar JSON values
fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        arb_word().prop_map(Value::from),
    ]
}

/// Generate shape-like JSON objects, some of which fit no bucket
fn arb_shape() -> impl Strategy<Value = Value> {
    prop_oneof![
        (1i64..90, 1i64..180).prop_map(|(lat, lon)| json!({"latitude": lat, "longitude": lon})),
        (1i64..90).prop_map(|s| json!({"south": s, "west": 1, "north": 2, "east": 3})),
        (1i64..100).prop_map(|r| json!({"radius": r, "point": {"latitude": 1, "longitude": 1}})),
        Just(json!({"point": [{"latitude": 1, "longitude": 2}]})),
        Just(json!({"latitude": 0, "longitude": 5})),
        arb_word().prop_map(Value::from),
    ]
}

/// Generate coordinates, with zero well represented
fn arb_coordinate() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), -90.0f64..90.0]
}

/// Generate typed shapes of every kind
fn arb_typed_shape() -> impl Strategy<Value = Shape> {
    prop_oneof![
        (arb_coordinate(), arb_coordinate()).prop_map(|(lat, lon)| Shape::point(lat, lon)),
        (arb_coordinate(), arb_coordinate(), arb_coordinate(), arb_coordinate())
            .prop_map(|(s, w, n, e)| Shape::bounding_box(s, w, n, e)),
        (arb_coordinate(), arb_coordinate(), arb_coordinate())
            .prop_map(|(r, lat, lon)| Shape::circle(r, lat, lon)),
        prop::collection::vec((arb_coordinate(), arb_coordinate()), 0..5).prop_map(|v| Shape::polygon(v)),
    ]
}

fn values_of_kind(shapes: &[Shape], kind: ShapeKind) -> Vec<Value> {
    shapes
        .iter()
        .filter(|s| s.kind() == kind)
        .cloned()
        .map(Value::from)
        .collect()
}

proptest! {
    #[test]
    fn test_and_preserves_children_in_order(children in prop::collection::vec(arb_leaf(), 0..8)) {
        let node = serde_json::to_value(and(children.clone())).unwrap();
        let expected: Vec<Value> = children.iter().map(|c| serde_json::to_value(c).unwrap()).collect();
        prop_assert_eq!(&node["and-query"]["queries"], &Value::Array(expected));
        prop_assert_eq!(&node["and-query"]["ordered"], &json!(false));
    }

    #[test]
    fn test_or_preserves_children_in_order(children in prop::collection::vec(arb_leaf(), 0..8)) {
        let node = serde_json::to_value(or(children.clone())).unwrap();
        let expected: Vec<Value> = children.iter().map(|c| serde_json::to_value(c).unwrap()).collect();
        prop_assert_eq!(node, json!({"or-query": {"queries": expected}}));
    }

    #[test]
    fn test_coercion_is_idempotent_on_sequences(values in prop::collection::vec(arb_scalar(), 0..10)) {
        let once = coerce_value(Value::Array(values.clone()));
        prop_assert_eq!(&once, &values);
        let twice = coerce_value(Value::Array(once));
        prop_assert_eq!(twice, values);
    }

    #[test]
    fn test_variadic_coercion_keeps_call_order(values in prop::collection::vec(arb_scalar(), 2..10)) {
        prop_assert_eq!(coerce_args(values.clone()), values);
    }

    #[test]
    fn test_classification_partitions_input(shapes in prop::collection::vec(arb_shape(), 0..20)) {
        let out = classify(shapes.clone());
        prop_assert_eq!(out.classified_len() + out.unclassified.len(), shapes.len());
        // Every unclassified index points back at the original shape.
        for (index, shape) in &out.unclassified {
            prop_assert_eq!(&shapes[*index], shape);
        }
    }

    #[test]
    fn test_negation_wraps_exactly(leaf in arb_leaf()) {
        let inner = serde_json::to_value(&leaf).unwrap();
        prop_assert_eq!(serde_json::to_value(not(leaf)).unwrap(), json!({"not-query": inner}));
    }

    #[test]
    fn test_boost_default_is_boost_of_empty_and(leaf in arb_leaf()) {
        prop_assert_eq!(boost_default(leaf.clone()), boost(and([]), leaf));
    }

    #[test]
    fn test_unspecified_dispatch_is_range(name in arb_word(), value in arb_word()) {
        let dynamic = constraint(ConstraintKind::Unspecified)(&name, vec![Value::from(value.as_str())]);
        prop_assert_eq!(dynamic, range_constraint(name.as_str(), value.as_str(), RangeArgs::default()));
    }

    #[test]
    fn test_typed_shapes_land_in_their_own_bucket(shapes in prop::collection::vec(arb_typed_shape(), 0..12)) {
        let out = classify(shapes.clone());
        prop_assert!(out.unclassified.is_empty());
        prop_assert_eq!(out.points, values_of_kind(&shapes, ShapeKind::Point));
        prop_assert_eq!(out.boxes, values_of_kind(&shapes, ShapeKind::Box));
        prop_assert_eq!(out.circles, values_of_kind(&shapes, ShapeKind::Circle));
        prop_assert_eq!(out.polygons, values_of_kind(&shapes, ShapeKind::Polygon));
        prop_assert!(QueryBuilder::strict().geospatial_constraint("g", shapes).is_ok());
    }

    #[test]
    fn test_strict_dispatch_fails_exactly_on_unclassified(shapes in prop::collection::vec(arb_shape(), 0..12)) {
        let unclassified = classify(shapes.clone()).unclassified.len();
        let geo = QueryBuilder::strict().constraint(Some("geospatial")).unwrap();
        prop_assert_eq!(geo("g", shapes.clone()).is_err(), unclassified > 0);
        let permissive = QueryBuilder::default().constraint(Some("geospatial")).unwrap();
        prop_assert_eq!(
            permissive("g", shapes.clone()).unwrap(),
            constraint(ConstraintKind::Geospatial)("g", shapes)
        );
    }
}
