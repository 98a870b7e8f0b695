use itertools::Itertools;
use log::debug;
use nalgebra::{Point2, Rotation2, Vector2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::containment::{polygon_contains, AABB};
use crate::error::{RefraxError, Result};
use crate::medium::{validate_index, Medium};
use crate::settings::VEC_LENGTH_THRESHOLD;

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn clockwise_input_is_rewound() {
        let prism = Prism::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(0.0, 1.0),
                Point2::new(1.0, 1.0),
                Point2::new(1.0, 0.0),
            ],
            Medium::glass(),
        )
        .unwrap();
        assert!(signed_area(&prism.vertices) > 0.0);
        assert_eq!(prism.vertices[0], Point2::new(1.0, 0.0));
    }

    #[test]
    fn rejects_bad_polygons() {
        let bowtie = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(2.0, 0.0),
            Point2::new(0.0, 1.0),
        ];
        assert!(matches!(
            Prism::new(bowtie, Medium::glass()),
            Err(RefraxError::SelfIntersectingPrism(..))
        ));

        let line = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
        ];
        assert!(matches!(
            Prism::new(line, Medium::glass()),
            Err(RefraxError::DegeneratePrism)
        ));

        assert!(matches!(
            Prism::new(vec![Point2::origin(); 2], Medium::glass()),
            Err(RefraxError::TooFewVertices(2))
        ));
    }

    #[test]
    fn outward_normals_point_away_from_centroid() {
        let prism = Prism::triangle(Point2::new(1.0, -2.0), 2.0, Medium::glass()).unwrap();
        let centroid = prism.centroid();
        for (a, b) in prism.edges() {
            let normal = outward_normal(&a, &b).unwrap();
            let mid = Point2::from((a.coords + b.coords) / 2.0);
            assert!((mid - centroid).dot(&normal) > 0.0);
        }
    }

    #[test]
    fn rotation_preserves_order_and_shape() {
        let mut prism =
            Prism::rectangle(Point2::new(0.0, 0.0), 2.0, 1.0, Medium::glass()).unwrap();
        let before = prism.vertices.clone();
        let area = signed_area(&prism.vertices);
        prism.rotate(PI / 3.0);
        prism.translate(Vector2::new(3.0, 4.0));
        assert_eq!(prism.vertices.len(), before.len());
        assert!((signed_area(&prism.vertices) - area).abs() < 1e-12);
        let original_side = (before[1] - before[0]).norm();
        let moved_side = (prism.vertices[1] - prism.vertices[0]).norm();
        assert!((original_side - moved_side).abs() < 1e-12);
        assert!((prism.centroid() - Point2::new(3.0, 4.0)).norm() < 1e-12);
    }

    #[test]
    fn medium_at_prefers_last_prism() {
        let mut geom = Geom::new(Medium::air());
        geom.add_prism(Prism::rectangle(Point2::origin(), 4.0, 4.0, Medium::glass()).unwrap());
        geom.add_prism(Prism::rectangle(Point2::origin(), 1.0, 1.0, Medium::diamond()).unwrap());
        assert_eq!(geom.medium_at(&Point2::new(0.0, 0.0)).name, "diamond");
        assert_eq!(geom.medium_at(&Point2::new(1.5, 0.0)).name, "glass");
        assert_eq!(geom.medium_at(&Point2::new(5.0, 0.0)).name, "air");
    }
}

/// A closed polygon of a single medium, wound counter-clockwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prism {
    pub vertices: Vec<Point2<f64>>,
    pub medium: Medium,
}

/// Prism outlines that can be described in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrismShape {
    Triangle { center: [f64; 2], side: f64 },
    Rectangle { center: [f64; 2], width: f64, height: f64 },
    Trapezoid { center: [f64; 2], bottom: f64, top: f64, height: f64 },
    Regular { center: [f64; 2], radius: f64, sides: usize },
    Polygon { vertices: Vec<[f64; 2]> },
}

impl PrismShape {
    pub fn build(&self, medium: Medium) -> Result<Prism> {
        let p = |c: &[f64; 2]| Point2::new(c[0], c[1]);
        match self {
            PrismShape::Triangle { center, side } => Prism::triangle(p(center), *side, medium),
            PrismShape::Rectangle { center, width, height } => {
                Prism::rectangle(p(center), *width, *height, medium)
            }
            PrismShape::Trapezoid { center, bottom, top, height } => {
                Prism::trapezoid(p(center), *bottom, *top, *height, medium)
            }
            PrismShape::Regular { center, radius, sides } => {
                Prism::regular(p(center), *radius, *sides, medium)
            }
            PrismShape::Polygon { vertices } => {
                Prism::new(vertices.iter().map(p).collect(), medium)
            }
        }
    }
}

impl Prism {
    /// Creates a prism, normalising the winding to counter-clockwise.
    /// Rejects polygons that are degenerate or self-intersecting.
    pub fn new(mut vertices: Vec<Point2<f64>>, medium: Medium) -> Result<Self> {
        validate_index(medium.index())?;
        if vertices.len() < 3 {
            return Err(RefraxError::TooFewVertices(vertices.len()));
        }
        if vertices.iter().any(|v| !v.x.is_finite() || !v.y.is_finite()) {
            return Err(RefraxError::NonFiniteGeometry);
        }
        let area = signed_area(&vertices);
        if area.abs() < VEC_LENGTH_THRESHOLD {
            return Err(RefraxError::DegeneratePrism);
        }
        if area < 0.0 {
            vertices.reverse();
        }
        check_simple(&vertices)?;
        Ok(Self { vertices, medium })
    }

    /// Equilateral triangle with a horizontal base, centred on its centroid.
    pub fn triangle(center: Point2<f64>, side: f64, medium: Medium) -> Result<Self> {
        let h = side * 3f64.sqrt() / 2.0;
        let vertices = vec![
            Point2::new(center.x - side / 2.0, center.y - h / 3.0),
            Point2::new(center.x + side / 2.0, center.y - h / 3.0),
            Point2::new(center.x, center.y + 2.0 * h / 3.0),
        ];
        Self::new(vertices, medium)
    }

    pub fn rectangle(center: Point2<f64>, width: f64, height: f64, medium: Medium) -> Result<Self> {
        let (w, h) = (width / 2.0, height / 2.0);
        let vertices = vec![
            Point2::new(center.x - w, center.y - h),
            Point2::new(center.x + w, center.y - h),
            Point2::new(center.x + w, center.y + h),
            Point2::new(center.x - w, center.y + h),
        ];
        Self::new(vertices, medium)
    }

    pub fn trapezoid(
        center: Point2<f64>,
        bottom: f64,
        top: f64,
        height: f64,
        medium: Medium,
    ) -> Result<Self> {
        let h = height / 2.0;
        let vertices = vec![
            Point2::new(center.x - bottom / 2.0, center.y - h),
            Point2::new(center.x + bottom / 2.0, center.y - h),
            Point2::new(center.x + top / 2.0, center.y + h),
            Point2::new(center.x - top / 2.0, center.y + h),
        ];
        Self::new(vertices, medium)
    }

    /// Regular polygon. Large side counts approximate a disc.
    pub fn regular(center: Point2<f64>, radius: f64, sides: usize, medium: Medium) -> Result<Self> {
        let vertices = (0..sides)
            .map(|i| {
                let angle = 2.0 * PI * i as f64 / sides as f64;
                center + radius * Vector2::new(angle.cos(), angle.sin())
            })
            .collect();
        Self::new(vertices, medium)
    }

    /// Iterates over edges `(start, end)`, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point2<f64>, Point2<f64>)> + '_ {
        self.vertices.iter().copied().circular_tuple_windows()
    }

    /// Area centroid of the polygon.
    pub fn centroid(&self) -> Point2<f64> {
        let area = signed_area(&self.vertices);
        let sum = self.edges().fold(Vector2::zeros(), |acc, (a, b)| {
            let cross = a.x * b.y - b.x * a.y;
            acc + (a.coords + b.coords) * cross
        });
        Point2::from(sum / (6.0 * area))
    }

    pub fn contains(&self, point: &Point2<f64>) -> bool {
        self.bounds().contains(point) && polygon_contains(&self.vertices, point)
    }

    pub fn bounds(&self) -> AABB {
        // non-empty by construction
        AABB::from_points(&self.vertices).unwrap_or(AABB {
            min: Point2::origin(),
            max: Point2::origin(),
        })
    }

    pub fn translate(&mut self, delta: Vector2<f64>) {
        for v in self.vertices.iter_mut() {
            *v += delta;
        }
    }

    /// Rotates counter-clockwise by `angle` radians about the centroid.
    pub fn rotate(&mut self, angle: f64) {
        let pivot = self.centroid();
        self.rotate_about(angle, pivot);
    }

    pub fn rotate_about(&mut self, angle: f64, pivot: Point2<f64>) {
        let rotation = Rotation2::new(angle);
        for v in self.vertices.iter_mut() {
            *v = pivot + rotation * (*v - pivot);
        }
    }
}

/// Unit outward normal of a counter-clockwise edge, or `None` if the edge is degenerate.
pub fn outward_normal(a: &Point2<f64>, b: &Point2<f64>) -> Option<Vector2<f64>> {
    let edge = b - a;
    let length = edge.norm();
    if length < VEC_LENGTH_THRESHOLD {
        return None;
    }
    Some(Vector2::new(edge.y, -edge.x) / length)
}

/// Shoelace area, positive for counter-clockwise winding.
pub fn signed_area(vertices: &[Point2<f64>]) -> f64 {
    vertices
        .iter()
        .circular_tuple_windows()
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum::<f64>()
        / 2.0
}

/// Checks that no two non-adjacent edges cross.
fn check_simple(vertices: &[Point2<f64>]) -> Result<()> {
    let n = vertices.len();
    let edge = |i: usize| (vertices[i], vertices[(i + 1) % n]);
    for i in 0..n {
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue; // closing edge shares vertex 0
            }
            let (a, b) = edge(i);
            let (c, d) = edge(j);
            if segments_cross(&a, &b, &c, &d) {
                return Err(RefraxError::SelfIntersectingPrism(i, j));
            }
        }
    }
    Ok(())
}

fn segments_cross(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>, d: &Point2<f64>) -> bool {
    let orient = |p: &Point2<f64>, q: &Point2<f64>, r: &Point2<f64>| {
        let v = (q - p).perp(&(r - p));
        if v.abs() < VEC_LENGTH_THRESHOLD {
            0.0
        } else {
            v.signum()
        }
    };
    let (o1, o2) = (orient(a, b, c), orient(a, b, d));
    let (o3, o4) = (orient(c, d, a), orient(c, d, b));
    o1 * o2 < 0.0 && o3 * o4 < 0.0
}

/// The scene the tracer works in: prisms laid over an environment medium.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Geom {
    pub prisms: Vec<Prism>,
    pub environment: Medium,
}

impl Geom {
    pub fn new(environment: Medium) -> Self {
        Self {
            prisms: Vec::new(),
            environment,
        }
    }

    pub fn add_prism(&mut self, prism: Prism) -> usize {
        self.prisms.push(prism);
        debug!("added prism #{}", self.prisms.len() - 1);
        self.prisms.len() - 1
    }

    /// The medium at `point`. Where prisms overlap, the last one added wins.
    pub fn medium_at(&self, point: &Point2<f64>) -> &Medium {
        self.prisms
            .iter()
            .rev()
            .find(|prism| prism.contains(point))
            .map_or(&self.environment, |prism| &prism.medium)
    }
}
