use serde::Serialize;

use crate::powers::Powers;
use crate::ray::{RayRole, RaySegment};

/// The outcome of one full trace: every segment, in emission order, plus the
/// power budget. Snapshots are replaced wholesale, never edited.
#[derive(Debug, PartialEq, Clone, Default, Serialize)]
pub struct Results {
    pub segments: Vec<RaySegment>,
    pub powers: Powers,
}

impl Results {
    /// Creates an empty `Results`, as produced by a laser that is switched off.
    pub fn new_empty() -> Self {
        Self::default()
    }

    /// Appends another trace, keeping segment order.
    pub fn extend(&mut self, other: Results) {
        self.segments.extend(other.segments);
        self.powers += other.powers;
    }

    pub fn with_role(&self, role: RayRole) -> impl Iterator<Item = &RaySegment> {
        self.segments.iter().filter(move |s| s.role == role)
    }

    pub fn with_wavelength(&self, wavelength: f64) -> impl Iterator<Item = &RaySegment> {
        self.segments.iter().filter(move |s| s.wavelength == wavelength)
    }

    pub fn print(&self) {
        println!("Segments: {}", self.segments.len());
        println!("{}", self.powers);
    }
}
