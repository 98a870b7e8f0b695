use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::settings::{LaserConfig, SPEED_OF_LIGHT};


/// Whether the laser emits a single wavelength or a white-light palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorMode {
    Monochromatic,
    White,
}

/// How the laser output is presented. Only the wave view records wave samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaserView {
    Ray,
    Wave,
}

/// Laser pose and emission state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Laser {
    pub emission_point: Point2<f64>,
    /// Radians, counter-clockwise from +x.
    pub angle: f64,
    /// Nanometres.
    pub wavelength: f64,
    pub on: bool,
    pub color_mode: ColorMode,
    pub view: LaserView,
}

impl Laser {
    pub fn new(emission_point: Point2<f64>, angle: f64, wavelength: f64) -> Self {
        Self {
            emission_point,
            angle,
            wavelength,
            on: true,
            color_mode: ColorMode::Monochromatic,
            view: LaserView::Ray,
        }
    }

    pub fn from_config(config: &LaserConfig) -> Self {
        Self {
            emission_point: Point2::new(config.position[0], config.position[1]),
            angle: config.angle.to_radians(),
            wavelength: config.wavelength,
            on: config.on,
            color_mode: if config.white {
                ColorMode::White
            } else {
                ColorMode::Monochromatic
            },
            view: if config.wave_view {
                LaserView::Wave
            } else {
                LaserView::Ray
            },
        }
    }

    /// Unit emission direction.
    pub fn direction(&self) -> Vector2<f64> {
        Vector2::new(self.angle.cos(), self.angle.sin())
    }

    /// Wavelengths to trace: none when off, the palette in white mode.
    pub fn wavelengths(&self, palette: &[f64]) -> Vec<f64> {
        match (self.on, self.color_mode) {
            (false, _) => Vec::new(),
            (true, ColorMode::Monochromatic) => vec![self.wavelength],
            (true, ColorMode::White) => palette.to_vec(),
        }
    }

    /// Vacuum frequency in Hz of the selected wavelength.
    pub fn frequency(&self) -> f64 {
        frequency(self.wavelength)
    }
}

/// Vacuum frequency in Hz for a wavelength in nm.
pub fn frequency(wavelength: f64) -> f64 {
    SPEED_OF_LIGHT / (wavelength * 1e-9)
}
