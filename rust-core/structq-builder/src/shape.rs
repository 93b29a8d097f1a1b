// SPDX-License-Identifier: PMPL-1.0-or-later
//! Geospatial shapes and shape classification.
//!
//! Geospatial constraint queries carry four shape lists: `point`, `box`,
//! `circle` and `polygon`. Callers either build typed [`Shape`] values or hand
//! over untyped JSON objects. A typed shape goes straight into the list its
//! variant names. An untyped object is sorted by [`classify_shape`], which
//! tests, in order, for a truthy `latitude`, `south`, `radius` or `point`
//! field. A circle has both `radius` and `point`, so the order matters.
//!
//! # Unclassified shapes
//!
//! An untyped value that passes none of the four tests (a bare string, an
//! object with only zero coordinates, ...) is collected in
//! [`ShapeClassification::unclassified`]. In permissive mode it is left out of
//! the query node; in strict mode it is reported as an error. Typed shapes
//! are never unclassified.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::coerce::coerce_value;
use crate::config::ClassificationMode;
use crate::error::{BuilderError, Result};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// A box bounded by its south and north latitudes and west and east longitudes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

/// A circle of `radius` (in miles, as the search platform interprets it) around `point`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCircle {
    pub radius: f64,
    pub point: GeoPoint,
}

/// A polygon given by its vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPolygon {
    pub point: Vec<GeoPoint>,
}

/// A typed geospatial shape.
///
/// Serializes to the same JSON objects the classifier recognises, so typed
/// and untyped shapes can be mixed in one constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Shape {
    Point(GeoPoint),
    Box(GeoBox),
    Circle(GeoCircle),
    Polygon(GeoPolygon),
}

impl Shape {
    pub fn point(latitude: f64, longitude: f64) -> Self {
        Shape::Point(GeoPoint { latitude, longitude })
    }

    pub fn bounding_box(south: f64, west: f64, north: f64, east: f64) -> Self {
        Shape::Box(GeoBox {
            south,
            west,
            north,
            east,
        })
    }

    pub fn circle(radius: f64, latitude: f64, longitude: f64) -> Self {
        Shape::Circle(GeoCircle {
            radius,
            point: GeoPoint { latitude, longitude },
        })
    }

    /// Build a polygon from `(latitude, longitude)` vertices.
    pub fn polygon(vertices: impl IntoIterator<Item = (f64, f64)>) -> Self {
        Shape::Polygon(GeoPolygon {
            point: vertices
                .into_iter()
                .map(|(latitude, longitude)| GeoPoint { latitude, longitude })
                .collect(),
        })
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Point(_) => ShapeKind::Point,
            Shape::Box(_) => ShapeKind::Box,
            Shape::Circle(_) => ShapeKind::Circle,
            Shape::Polygon(_) => ShapeKind::Polygon,
        }
    }
}

fn point_value(p: &GeoPoint) -> Value {
    json!({"latitude": p.latitude, "longitude": p.longitude})
}

impl From<Shape> for Value {
    fn from(shape: Shape) -> Self {
        match shape {
            Shape::Point(p) => point_value(&p),
            Shape::Box(b) => json!({
                "south": b.south,
                "west": b.west,
                "north": b.north,
                "east": b.east,
            }),
            Shape::Circle(c) => json!({"radius": c.radius, "point": point_value(&c.point)}),
            Shape::Polygon(p) => {
                let vertices: Vec<Value> = p.point.iter().map(point_value).collect();
                json!({ "point": vertices })
            }
        }
    }
}

/// One shape handed to a geospatial constructor.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeInput {
    /// Built by the caller; its kind is known.
    Typed(Shape),
    /// Untyped JSON, sorted by field tests.
    Raw(Value),
}

impl ShapeInput {
    /// Kind of this shape; typed shapes always have one.
    pub fn kind(&self) -> Option<ShapeKind> {
        match self {
            ShapeInput::Typed(shape) => Some(shape.kind()),
            ShapeInput::Raw(value) => classify_shape(value),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            ShapeInput::Typed(shape) => shape.into(),
            ShapeInput::Raw(value) => value,
        }
    }
}

impl From<Shape> for ShapeInput {
    fn from(shape: Shape) -> Self {
        ShapeInput::Typed(shape)
    }
}

impl From<Value> for ShapeInput {
    fn from(value: Value) -> Self {
        ShapeInput::Raw(value)
    }
}

impl From<&str> for ShapeInput {
    fn from(value: &str) -> Self {
        ShapeInput::Raw(Value::from(value))
    }
}

/// A single shape or a list of shapes, typed or untyped, in order.
pub trait IntoShapes {
    fn into_shapes(self) -> Vec<ShapeInput>;
}

impl IntoShapes for Shape {
    fn into_shapes(self) -> Vec<ShapeInput> {
        vec![ShapeInput::Typed(self)]
    }
}

impl IntoShapes for ShapeInput {
    fn into_shapes(self) -> Vec<ShapeInput> {
        vec![self]
    }
}

/// A JSON array is a list of untyped shapes; anything else is one.
impl IntoShapes for Value {
    fn into_shapes(self) -> Vec<ShapeInput> {
        coerce_value(self).into_iter().map(ShapeInput::Raw).collect()
    }
}

impl IntoShapes for &str {
    fn into_shapes(self) -> Vec<ShapeInput> {
        vec![self.into()]
    }
}

impl<S: Into<ShapeInput>> IntoShapes for Vec<S> {
    fn into_shapes(self) -> Vec<ShapeInput> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<S: Into<ShapeInput>, const N: usize> IntoShapes for [S; N] {
    fn into_shapes(self) -> Vec<ShapeInput> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<S: IntoShapes> IntoShapes for Option<S> {
    fn into_shapes(self) -> Vec<ShapeInput> {
        self.map(IntoShapes::into_shapes).unwrap_or_default()
    }
}

/// Which bucket a shape falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Point,
    Box,
    Circle,
    Polygon,
}

/// Shapes partitioned by kind, each list in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeClassification {
    pub points: Vec<Value>,
    pub boxes: Vec<Value>,
    pub circles: Vec<Value>,
    pub polygons: Vec<Value>,
    /// Shapes that matched no test, with their position in the input.
    pub unclassified: Vec<(usize, Value)>,
}

impl ShapeClassification {
    /// Number of shapes that made it into one of the four buckets.
    pub fn classified_len(&self) -> usize {
        self.points.len() + self.boxes.len() + self.circles.len() + self.polygons.len()
    }
}

/// Loose truthiness: missing, null, false, zero and the empty string are false.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Decide the bucket for one untyped shape, or `None` if it fits none.
pub fn classify_shape(shape: &Value) -> Option<ShapeKind> {
    if is_truthy(shape.get("latitude")) {
        Some(ShapeKind::Point)
    } else if is_truthy(shape.get("south")) {
        Some(ShapeKind::Box)
    } else if is_truthy(shape.get("radius")) {
        Some(ShapeKind::Circle)
    } else if is_truthy(shape.get("point")) {
        Some(ShapeKind::Polygon)
    } else {
        None
    }
}

/// Partition shapes into the four buckets, keeping relative order.
pub fn classify(shapes: impl IntoShapes) -> ShapeClassification {
    let mut out = ShapeClassification::default();
    for (index, shape) in shapes.into_shapes().into_iter().enumerate() {
        let kind = shape.kind();
        let shape = shape.into_value();
        match kind {
            Some(ShapeKind::Point) => out.points.push(shape),
            Some(ShapeKind::Box) => out.boxes.push(shape),
            Some(ShapeKind::Circle) => out.circles.push(shape),
            Some(ShapeKind::Polygon) => out.polygons.push(shape),
            None => out.unclassified.push((index, shape)),
        }
    }
    out
}

/// Classify under a mode: permissive drops unclassified shapes, strict rejects them.
pub fn classify_with(shapes: impl IntoShapes, mode: ClassificationMode) -> Result<ShapeClassification> {
    let classified = classify(shapes);
    match (mode, classified.unclassified.first()) {
        (ClassificationMode::Strict, Some((index, shape))) => {
            Err(BuilderError::UnclassifiableShape {
                index: *index,
                shape: shape.clone(),
            })
        }
        (_, Some(_)) => {
            for (index, shape) in &classified.unclassified {
                debug!(index, %shape, "Dropping unclassifiable geospatial shape");
            }
            Ok(classified)
        }
        (_, None) => Ok(classified),
    }
}
