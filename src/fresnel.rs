//! Fresnel equations for splitting power at an interface.
//!
//! This module computes the fraction of incident power reflected at a boundary
//! between two non-absorbing media. Rays carry no polarization state, so the
//! reflectance used for the power split is the unpolarized average of the s-
//! and p-polarized reflectances.
//!
//! The Fresnel calculations provide:
//! - Amplitude reflection coefficients for s and p polarizations
//! - Unpolarized reflectance and transmittance
//! - The simplified normal-incidence form, free of divisions by zero

use crate::settings::NORMAL_INCIDENCE_THRESHOLD;


/// Amplitude reflection coefficient for s-polarized light.
pub fn refl_s(n1: f64, n2: f64, theta_i: f64, theta_t: f64) -> f64 {
    let cti = theta_i.cos();
    let ctt = theta_t.cos();
    let denom = n1 * cti + n2 * ctt;
    if denom <= f64::EPSILON {
        return 1.0;
    }
    (n1 * cti - n2 * ctt) / denom
}

/// Amplitude reflection coefficient for p-polarized light.
pub fn refl_p(n1: f64, n2: f64, theta_i: f64, theta_t: f64) -> f64 {
    let cti = theta_i.cos();
    let ctt = theta_t.cos();
    let denom = n2 * cti + n1 * ctt;
    if denom <= f64::EPSILON {
        return 1.0;
    }
    (n2 * cti - n1 * ctt) / denom
}

/// Unpolarized power reflectance `R = (rs^2 + rp^2) / 2`.
/// Near normal incidence this reduces to `((n1 - n2) / (n1 + n2))^2`.
pub fn reflectance(n1: f64, n2: f64, theta_i: f64, theta_t: f64) -> f64 {
    if n1 == n2 {
        return 0.0;
    }
    if theta_i < NORMAL_INCIDENCE_THRESHOLD {
        return ((n1 - n2) / (n1 + n2)).powi(2);
    }
    let rs = refl_s(n1, n2, theta_i, theta_t);
    let rp = refl_p(n1, n2, theta_i, theta_t);
    (0.5 * (rs * rs + rp * rp)).clamp(0.0, 1.0)
}

/// Unpolarized power transmittance, `1 - R`.
pub fn transmittance(n1: f64, n2: f64, theta_i: f64, theta_t: f64) -> f64 {
    1.0 - reflectance(n1, n2, theta_i, theta_t)
}
