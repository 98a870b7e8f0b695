use nalgebra::{Point2, Vector2};
use serde::Serialize;

use crate::fresnel;
use crate::intersect::Intersection;
use crate::snell::{self, get_reflection_vector, get_refraction_vector};


/// The optical role of a ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RayRole {
    Incident,            // emitted by the laser
    Reflected,           // partial reflection at an interface
    Refracted,           // transmitted through an interface
    InternallyReflected, // total internal reflection
}

/// A ray awaiting propagation. Rays are never mutated once created; each
/// interface produces new child rays.
#[derive(Debug, Clone, PartialEq)]
pub struct Ray {
    pub origin: Point2<f64>,
    pub prop: Vector2<f64>,
    pub wavelength: f64,
    pub power: f64,
    pub refr_index: f64,
    pub role: RayRole,
    pub depth: usize, // number of interfaces crossed to reach this ray
}

impl Ray {
    /// Makes a ray leaving the laser.
    pub fn new_initial(
        origin: Point2<f64>,
        prop: Vector2<f64>,
        wavelength: f64,
        power: f64,
        refr_index: f64,
    ) -> Self {
        Self {
            origin,
            prop: prop.normalize(),
            wavelength,
            power,
            refr_index,
            role: RayRole::Incident,
            depth: 0,
        }
    }

    fn child(
        &self,
        origin: Point2<f64>,
        prop: Vector2<f64>,
        power: f64,
        refr_index: f64,
        role: RayRole,
    ) -> Self {
        Self {
            origin,
            prop,
            wavelength: self.wavelength,
            power,
            refr_index,
            role,
            depth: self.depth + 1,
        }
    }

    /// The point reached after travelling `distance` along the ray.
    pub fn at(&self, distance: f64) -> Point2<f64> {
        self.origin + self.prop * distance
    }

    /// Splits the ray at an interface into reflected and refracted children.
    pub fn split(&self, intersection: &Intersection) -> Split {
        let normal = intersection.normal;
        let (n1, n2) = (intersection.n1, intersection.n2);
        let theta_i = snell::get_theta_i(&normal, &self.prop);
        let reflected_prop = get_reflection_vector(&normal, &self.prop);

        match snell::get_theta_t(theta_i, n1, n2) {
            Err(_) => Split {
                reflected: Some(self.child(
                    intersection.point,
                    reflected_prop,
                    self.power,
                    n1,
                    RayRole::InternallyReflected,
                )),
                refracted: None,
            },
            Ok(theta_t) => {
                let r = fresnel::reflectance(n1, n2, theta_i, theta_t);
                let refracted_prop = get_refraction_vector(&normal, &self.prop, theta_t.sin());
                let reflected_power = self.power * r;
                Split {
                    reflected: Some(self.child(
                        intersection.point,
                        reflected_prop,
                        reflected_power,
                        n1,
                        RayRole::Reflected,
                    )),
                    refracted: Some(self.child(
                        intersection.point,
                        refracted_prop,
                        self.power - reflected_power,
                        n2,
                        RayRole::Refracted,
                    )),
                }
            }
        }
    }

    /// Finalises the ray as a segment ending at `end`.
    pub fn to_segment(&self, end: Point2<f64>, escaped: bool) -> RaySegment {
        RaySegment {
            start: self.origin,
            end,
            prop: self.prop,
            wavelength: self.wavelength,
            power: self.power,
            refr_index: self.refr_index,
            role: self.role,
            escaped,
        }
    }
}

/// The children produced by one interface.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub reflected: Option<Ray>,
    pub refracted: Option<Ray>,
}

impl Split {
    pub fn is_tir(&self) -> bool {
        self.refracted.is_none()
    }

    pub fn into_rays(self) -> impl Iterator<Item = Ray> {
        self.reflected.into_iter().chain(self.refracted)
    }
}

/// A finished piece of a ray path, as handed to renderers and probes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaySegment {
    pub start: Point2<f64>,
    pub end: Point2<f64>,
    pub prop: Vector2<f64>,
    pub wavelength: f64,
    pub power: f64,
    pub refr_index: f64,
    pub role: RayRole,
    pub escaped: bool, // true if the segment leaves the scene
}

impl RaySegment {
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// Shortest distance from `point` to the segment.
    pub fn distance_to(&self, point: &Point2<f64>) -> f64 {
        let along = (point - self.start).dot(&self.prop).clamp(0.0, self.length());
        (point - (self.start + self.prop * along)).norm()
    }
}
