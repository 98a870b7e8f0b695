//! Point containment and axis-aligned bounds for prism polygons.
//!
//! Deciding which medium a point sits in is the only spatial query the tracer
//! needs beyond edge intersection. Bounding boxes give a cheap rejection test
//! before the exact point-in-polygon check.

use geo::{Contains, Coord, LineString, Polygon};
use nalgebra::Point2;
use serde::Serialize;

#[cfg(test)]
mod tests {

    use super::*;

    fn square() -> Vec<Point2<f64>> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
        ]
    }

    #[test]
    fn contains_interior_point() {
        assert!(polygon_contains(&square(), &Point2::new(1.0, 1.0)));
        assert!(!polygon_contains(&square(), &Point2::new(3.0, 1.0)));
    }

    #[test]
    fn concave_notch_is_outside() {
        let vertices = vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 4.0),
            Point2::new(2.0, 1.0),
            Point2::new(0.0, 4.0),
        ];
        assert!(!polygon_contains(&vertices, &Point2::new(2.0, 3.0)));
        assert!(polygon_contains(&vertices, &Point2::new(2.0, 0.5)));
    }

    #[test]
    fn aabb_bounds() {
        let aabb = AABB::from_points(&square()).unwrap();
        assert_eq!(aabb.min, Point2::new(0.0, 0.0));
        assert_eq!(aabb.max, Point2::new(2.0, 2.0));
        assert!(aabb.contains(&Point2::new(0.5, 1.5)));
        assert!(!aabb.contains(&Point2::new(-0.5, 1.5)));
        assert!(AABB::from_points(&[]).is_none());
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AABB {
    pub min: Point2<f64>,
    pub max: Point2<f64>,
}

impl AABB {
    /// Smallest box containing all points, or `None` for an empty slice.
    pub fn from_points(points: &[Point2<f64>]) -> Option<Self> {
        let first = points.first()?;
        let (min, max) = points.iter().fold((*first, *first), |(min, max), p| {
            (
                Point2::new(min.x.min(p.x), min.y.min(p.y)),
                Point2::new(max.x.max(p.x), max.y.max(p.y)),
            )
        });
        Some(Self { min, max })
    }

    pub fn contains(&self, point: &Point2<f64>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

/// Returns true if `point` lies strictly inside the closed polygon traced by `vertices`.
pub fn polygon_contains(vertices: &[Point2<f64>], point: &Point2<f64>) -> bool {
    let exterior: Vec<Coord<f64>> = vertices.iter().map(|v| Coord { x: v.x, y: v.y }).collect();
    let polygon = Polygon::new(LineString::new(exterior), vec![]);
    polygon.contains(&geo::Point::new(point.x, point.y))
}
