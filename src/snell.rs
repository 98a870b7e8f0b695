//! Snell's law for real refractive indices in the plane.
//!
//! This module computes incidence and transmission angles at an interface and
//! the reflected and refracted propagation directions. Normals passed in are
//! always oriented to face the incoming ray, so `prop.dot(normal) <= 0`.
//!
//! The implementation provides:
//! - Incidence angle from the ray direction and the interface normal
//! - Total internal reflection classification with a fixed tie-break epsilon
//! - Transmission angle from Snell's law
//! - Mirror reflection and refraction direction vectors

use anyhow::Result;
use nalgebra::Vector2;

use crate::settings::{NORMAL_INCIDENCE_THRESHOLD, TIR_EPSILON};


/// Incidence angle between `prop` and a normal facing the incoming ray.
pub fn get_theta_i(normal: &Vector2<f64>, prop: &Vector2<f64>) -> f64 {
    let cos_theta_i = (-prop.dot(normal)).clamp(0.0, 1.0);
    let sin_theta_i = prop.perp(normal).abs().clamp(0.0, 1.0);
    sin_theta_i.atan2(cos_theta_i)
}

/// Critical angle for light travelling from `n1` into `n2`, if one exists.
pub fn critical_angle(n1: f64, n2: f64) -> Option<f64> {
    (n1 > n2).then(|| (n2 / n1).asin())
}

/// Returns true if light from `n1` into `n2` at the given `sin(theta_i)` is totally
/// internally reflected. Hits at the critical angle, within `TIR_EPSILON`, count as TIR.
pub fn is_tir(sin_theta_i: f64, n1: f64, n2: f64) -> bool {
    n1 > n2 && sin_theta_i >= n2 / n1 - TIR_EPSILON
}

/// Computes the transmitted angle from Snell's law, `n1 sin(theta_i) = n2 sin(theta_t)`.
/// Returns an error if there is no transmitted ray.
pub fn get_theta_t(theta_i: f64, n1: f64, n2: f64) -> Result<f64> {
    if n1 == n2 || theta_i < NORMAL_INCIDENCE_THRESHOLD {
        return Ok(theta_i * (n1 / n2));
    }

    let sin_theta_i = theta_i.sin();
    if is_tir(sin_theta_i, n1, n2) {
        return Err(anyhow::anyhow!(
            "total internal reflection at theta_i = {} ({} -> {})",
            theta_i,
            n1,
            n2
        ));
    }

    let theta_t = (n1 / n2 * sin_theta_i).clamp(-1.0, 1.0).asin();

    if theta_t.is_nan() {
        Err(anyhow::anyhow!("theta_t is NaN"))
    } else {
        Ok(theta_t)
    }
}

/// Returns a transmitted propagation vector, where `stt` is the sine of the angle of transmission.
pub fn get_refraction_vector(norm: &Vector2<f64>, prop: &Vector2<f64>, stt: f64) -> Vector2<f64> {
    // tangential part of the incoming direction
    let w = prop.dot(norm); // -cos theta_i
    let tangent = prop - w * norm;
    let length = tangent.norm();
    if stt < NORMAL_INCIDENCE_THRESHOLD || length < NORMAL_INCIDENCE_THRESHOLD {
        return *prop;
    }

    let ctt = (1.0 - stt.powi(2)).max(0.0).sqrt();
    let mut result = stt * tangent / length - ctt * norm;

    result.normalize_mut();

    result
}

pub fn get_reflection_vector(norm: &Vector2<f64>, prop: &Vector2<f64>) -> Vector2<f64> {
    let w = norm.dot(prop); // -cos theta_i
    let mut result = prop - 2.0 * w * norm;
    result.normalize_mut();
    result
}
