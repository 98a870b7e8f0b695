//! Optical media and wavelength-dependent refractive index.
//!
//! A [`Medium`] pairs a display name with a [`Dispersion`] law. The law is a
//! Cauchy fit calibrated so that the medium takes exactly its nominal index at
//! a reference wavelength, with dispersion strength growing with how far the
//! nominal index sits above vacuum. A medium of index 1 therefore does not
//! disperse, and every lookup is clamped to at least 1.
//!
//! Media are immutable. Changing the medium of a prism or the environment
//! swaps the whole value.

use serde::{Deserialize, Serialize};

use crate::error::{RefraxError, Result};


/// Wavelength (nm) at which media take their nominal index.
pub const DEFAULT_REFERENCE_WAVELENGTH: f64 = 650.0;
/// Shortest wavelength (nm) accepted by the dispersion law.
const MIN_WAVELENGTH: f64 = 100.0;
/// Nominal index of the crown glass the Cauchy coefficients were fitted to.
const CROWN_GLASS_INDEX: f64 = 1.5168;
/// Crown glass Cauchy B coefficient, nm^2.
const CROWN_GLASS_B: f64 = 4.2e3;
/// Crown glass Cauchy C coefficient, nm^4.
const CROWN_GLASS_C: f64 = 1.1e7;

/// Calibrated Cauchy dispersion law,
/// `n(l) = n_ref + b (1/l^2 - 1/l_ref^2) + c (1/l^4 - 1/l_ref^4)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dispersion {
    pub reference_index: f64,
    pub reference_wavelength: f64,
    pub b: f64,
    pub c: f64,
}

impl Dispersion {
    /// Builds the dispersion law for a nominal index at the default reference
    /// wavelength, scaling the crown glass coefficients by `(n - 1)`.
    pub fn new(reference_index: f64) -> Self {
        Self::with_reference(reference_index, DEFAULT_REFERENCE_WAVELENGTH)
    }

    pub fn with_reference(reference_index: f64, reference_wavelength: f64) -> Self {
        let strength = (reference_index - 1.0).max(0.0) / (CROWN_GLASS_INDEX - 1.0);
        Self {
            reference_index,
            reference_wavelength,
            b: CROWN_GLASS_B * strength,
            c: CROWN_GLASS_C * strength,
        }
    }

    /// Refractive index at `wavelength` (nm). Always finite and at least 1.
    pub fn index_at(&self, wavelength: f64) -> f64 {
        let inv2 = |l: f64| 1.0 / (l * l);
        let wavelength = wavelength.max(MIN_WAVELENGTH);
        let d2 = inv2(wavelength) - inv2(self.reference_wavelength);
        let d4 = inv2(wavelength).powi(2) - inv2(self.reference_wavelength).powi(2);
        (self.reference_index + self.b * d2 + self.c * d4).max(1.0)
    }
}

/// An optical medium.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medium {
    pub name: String,
    pub dispersion: Dispersion,
}

impl Medium {
    /// Creates a medium with the given nominal index, rejecting indices below 1.
    pub fn new(name: impl Into<String>, index: f64) -> Result<Self> {
        validate_index(index)?;
        Ok(Self::from_parts(name.into(), Dispersion::new(index)))
    }

    /// Creates a medium calibrated at a non-default reference wavelength.
    pub fn with_reference(
        name: impl Into<String>,
        index: f64,
        reference_wavelength: f64,
    ) -> Result<Self> {
        validate_index(index)?;
        Ok(Self::from_parts(
            name.into(),
            Dispersion::with_reference(index, reference_wavelength),
        ))
    }

    fn from_parts(name: String, dispersion: Dispersion) -> Self {
        Self { name, dispersion }
    }

    pub fn air() -> Self {
        Self::from_parts("air".to_string(), Dispersion::new(1.0))
    }

    pub fn water() -> Self {
        Self::from_parts("water".to_string(), Dispersion::new(1.33))
    }

    pub fn glass() -> Self {
        Self::from_parts("glass".to_string(), Dispersion::new(1.5))
    }

    pub fn diamond() -> Self {
        Self::from_parts("diamond".to_string(), Dispersion::new(2.419))
    }

    pub fn mystery_a() -> Self {
        Self::from_parts("mystery A".to_string(), Dispersion::new(2.1))
    }

    pub fn mystery_b() -> Self {
        Self::from_parts("mystery B".to_string(), Dispersion::new(1.4))
    }

    /// Nominal index at the reference wavelength.
    pub fn index(&self) -> f64 {
        self.dispersion.reference_index
    }

    pub fn index_at(&self, wavelength: f64) -> f64 {
        self.dispersion.index_at(wavelength)
    }
}

/// Rejects refractive indices that are not finite or fall below 1.
pub fn validate_index(index: f64) -> Result<()> {
    if !index.is_finite() || index < 1.0 {
        return Err(RefraxError::InvalidRefractiveIndex(index));
    }
    Ok(())
}
