use nalgebra::Point2;
use serde::Serialize;

use crate::geom::Geom;
use crate::ray::RaySegment;
use crate::settings::SPEED_OF_LIGHT;

#[cfg(test)]
mod tests {

    use super::*;
    use crate::geom::Prism;
    use crate::medium::{Medium, DEFAULT_REFERENCE_WAVELENGTH};
    use crate::ray::RayRole;
    use nalgebra::Vector2;

    #[test]
    fn velocity_is_c_over_n() {
        let mut geom = Geom::new(Medium::air());
        geom.add_prism(Prism::rectangle(Point2::origin(), 2.0, 2.0, Medium::glass()).unwrap());

        let inside = VelocitySensor::new(Point2::new(0.2, -0.3));
        let speed = inside.read(&geom, DEFAULT_REFERENCE_WAVELENGTH);
        assert_eq!(speed, SPEED_OF_LIGHT / 1.5);
        // no drift across repeated reads
        assert_eq!(speed, inside.read(&geom, DEFAULT_REFERENCE_WAVELENGTH));

        let outside = VelocitySensor::new(Point2::new(3.0, 0.0));
        assert_eq!(outside.read(&geom, 400.0), SPEED_OF_LIGHT);

        // violet travels slower than red in glass
        assert!(inside.read(&geom, 400.0) < inside.read(&geom, 700.0));
    }

    #[test]
    fn intensity_sums_covering_segments() {
        let segment = |y: f64, power: f64| RaySegment {
            start: Point2::new(-1.0, y),
            end: Point2::new(1.0, y),
            prop: Vector2::new(1.0, 0.0),
            wavelength: 650.0,
            power,
            refr_index: 1.0,
            role: RayRole::Incident,
            escaped: false,
        };
        let segments = vec![segment(0.0, 0.6), segment(0.01, 0.3), segment(2.0, 0.1)];
        let meter = IntensityMeter::new(Point2::origin());
        assert!((meter.read(&segments, 0.05) - 0.9).abs() < 1e-12);
        assert_eq!(IntensityMeter::new(Point2::new(0.0, -1.0)).read(&segments, 0.05), 0.0);
    }
}

/// Reports the phase velocity of light at a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VelocitySensor {
    pub position: Point2<f64>,
}

impl VelocitySensor {
    pub fn new(position: Point2<f64>) -> Self {
        Self { position }
    }

    /// Phase velocity in m/s of light of `wavelength` nm at the sensor.
    pub fn read(&self, geom: &Geom, wavelength: f64) -> f64 {
        SPEED_OF_LIGHT / geom.medium_at(&self.position).index_at(wavelength)
    }
}

/// Reports the total power of the rays passing through a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IntensityMeter {
    pub position: Point2<f64>,
}

impl IntensityMeter {
    pub fn new(position: Point2<f64>) -> Self {
        Self { position }
    }

    pub fn read(&self, segments: &[RaySegment], radius: f64) -> f64 {
        segments
            .iter()
            .filter(|s| s.distance_to(&self.position) <= radius)
            .map(|s| s.power)
            .sum()
    }
}
