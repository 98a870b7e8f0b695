//! Nearest ray/edge intersection against the prisms of a scene.
//!
//! Every prism edge is tested against the ray as a segment. The closest hit
//! strictly ahead of the ray origin, and within the escape distance, wins.
//! When several edges are hit at the same distance (a shared vertex), the
//! edge met most head-on is preferred so that seams do not produce grazing
//! artifacts. Degenerate edges and rays parallel to an edge never produce a
//! hit.

use log::{trace, warn};
use nalgebra::{Point2, Vector2};
use serde::Serialize;

use crate::geom::{outward_normal, Geom};
use crate::ray::Ray;
use crate::settings::{
    COLINEAR_THRESHOLD, PROBE_OFFSET, RAYCAST_MINIMUM_DISTANCE, TIE_DISTANCE, VEC_LENGTH_THRESHOLD,
};


/// A hit between a ray and a prism edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Intersection {
    pub point: Point2<f64>,
    /// Unit normal oriented against the incoming ray.
    pub normal: Vector2<f64>,
    pub distance: f64,
    /// Index on the incoming side.
    pub n1: f64,
    /// Index on the far side.
    pub n2: f64,
}

/// Candidate hit before the media on either side are resolved.
struct EdgeHit {
    distance: f64,
    normal: Vector2<f64>,
}

/// Finds the nearest intersection of `ray` with any prism edge, strictly ahead
/// of its origin and no further than `escape_distance`.
pub fn nearest_intersection(ray: &Ray, geom: &Geom, escape_distance: f64) -> Option<Intersection> {
    let mut best: Option<EdgeHit> = None;

    for (prism_id, prism) in geom.prisms.iter().enumerate() {
        for (edge_id, (a, b)) in prism.edges().enumerate() {
            let Some(distance) = intersect_edge(ray, &a, &b) else {
                continue;
            };
            if distance > escape_distance {
                continue;
            }
            let Some(outward) = outward_normal(&a, &b) else {
                warn!("skipping degenerate edge #{} of prism #{}", edge_id, prism_id);
                continue;
            };
            let normal = if outward.dot(&ray.prop) > 0.0 { -outward } else { outward };
            let candidate = EdgeHit { distance, normal };

            best = match best {
                None => Some(candidate),
                Some(current) => {
                    if candidate.distance < current.distance - TIE_DISTANCE {
                        Some(candidate)
                    } else if (candidate.distance - current.distance).abs() <= TIE_DISTANCE
                        && candidate.normal.dot(&ray.prop) < current.normal.dot(&ray.prop)
                    {
                        trace!("vertex tie resolved to prism #{} edge #{}", prism_id, edge_id);
                        Some(candidate)
                    } else {
                        Some(current)
                    }
                }
            };
        }
    }

    best.map(|hit| {
        let point = ray.at(hit.distance);
        // step along the ray, not the normal: at a vertex the normal of one
        // edge can run along the other edge and land on the boundary
        let beyond = point + ray.prop * PROBE_OFFSET;
        Intersection {
            point,
            normal: hit.normal,
            distance: hit.distance,
            n1: ray.refr_index,
            n2: geom.medium_at(&beyond).index_at(ray.wavelength),
        }
    })
}

/// Parametric distance along `ray` to the segment `a`-`b`, if it is hit.
fn intersect_edge(ray: &Ray, a: &Point2<f64>, b: &Point2<f64>) -> Option<f64> {
    let edge = b - a;
    let denom = ray.prop.perp(&edge);
    if denom.abs() < COLINEAR_THRESHOLD || edge.norm() < VEC_LENGTH_THRESHOLD {
        return None;
    }
    let offset = a - ray.origin;
    let t = offset.perp(&edge) / denom;
    let s = offset.perp(&ray.prop) / denom;
    if t > RAYCAST_MINIMUM_DISTANCE && (0.0..=1.0).contains(&s) {
        Some(t)
    } else {
        None
    }
}
