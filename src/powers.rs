//! Power bookkeeping for a ray trace.
//!
//! Every ray ends in exactly one of three ways: it leaves the scene, it is
//! dropped for carrying too little power, or it is cut off at the maximum
//! depth. Summing those against the emitted power shows how much of the
//! source the trace actually accounts for.
//!
//! # Power Budget Components
//!
//! - Input power: total power emitted by the laser
//! - Output power: power carried by rays that escape the scene
//! - Truncation categories: power dropped by the power threshold or the depth limit
//! - Missing power: unaccounted power, zero up to rounding for a correct trace

use serde::Serialize;
use std::{fmt, ops::*};


/// Power accounting for one trace.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize)]
pub struct Powers {
    pub input: f64,       // power emitted by the laser
    pub output: f64,      // power carried out of the scene
    pub trnc_energy: f64, // truncated power due to threshold ray power
    pub trnc_rec: f64,    // truncated power due to max recursions
}

impl Add for Powers {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            input: self.input + other.input,
            output: self.output + other.output,
            trnc_energy: self.trnc_energy + other.trnc_energy,
            trnc_rec: self.trnc_rec + other.trnc_rec,
        }
    }
}

impl AddAssign for Powers {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Powers {
    /// Creates a new power tracking structure with zero initial values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total power removed by either truncation mechanism.
    pub fn truncated(&self) -> f64 {
        self.trnc_energy + self.trnc_rec
    }

    /// Computes power missing from the conservation budget.
    pub fn missing(&self) -> f64 {
        self.input - (self.output + self.truncated())
    }
}

impl fmt::Display for Powers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Powers:")?;
        writeln!(f, "  Input:            {:.6}", self.input)?;
        writeln!(f, "  Output:           {:.6}", self.output)?;
        writeln!(f, "  Trunc. Energy:    {:.6}", self.trnc_energy)?;
        writeln!(f, "  Trunc. Rec:       {:.6}", self.trnc_rec)?;
        writeln!(f, "  Other:            {:.6}", self.missing())
    }
}
