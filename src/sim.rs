//! The simulation context.
//!
//! [`Simulation`] owns everything the engine reads and writes: scene
//! geometry, the laser, runtime settings, the latest trace snapshot, the
//! wave sampler and the point sensors. The host loop drives it explicitly.
//! Every scene mutation validates its input, applies it and marks the trace
//! dirty. The next [`Simulation::recompute`] or [`Simulation::step`] replaces
//! the snapshot wholesale. Consumers hold the snapshot through an `Rc` and
//! never see a partially built trace.

use log::{debug, info};
use nalgebra::{Point2, Vector2};
use std::rc::Rc;

use crate::error::{RefraxError, Result};
use crate::geom::{Geom, Prism};
use crate::laser::{ColorMode, Laser, LaserView};
use crate::medium::{validate_index, Medium};
use crate::multiproblem::trace;
use crate::ray::RaySegment;
use crate::result::Results;
use crate::sensor::{IntensityMeter, VelocitySensor};
use crate::settings::{validate_config, MediumConfig, Settings};
use crate::wave::WaveSampler;

#[cfg(test)]
mod tests {

    use super::*;
    use crate::settings::load_default_config;

    fn simulation() -> Simulation {
        Simulation::from_settings(load_default_config().unwrap()).unwrap()
    }

    #[test]
    fn builds_scene_from_settings() {
        let sim = simulation();
        assert_eq!(sim.geom().prisms.len(), sim.settings().prisms.len());
        assert!(!sim.is_dirty());
        assert!(!sim.segments().is_empty());
        assert!(sim.snapshot().powers.missing().abs() < 1e-9);
    }

    #[test]
    fn mutations_mark_dirty() {
        let mut sim = simulation();
        sim.set_laser_angle(0.1);
        assert!(sim.is_dirty());
        sim.recompute();
        assert!(!sim.is_dirty());

        sim.translate_prism(0, Vector2::new(0.1, 0.0)).unwrap();
        assert!(sim.is_dirty());
        sim.step(0.01);
        assert!(!sim.is_dirty());

        sim.set_color_mode(ColorMode::White);
        assert!(sim.is_dirty());
    }

    #[test]
    fn snapshot_is_replaced_not_edited() {
        let mut sim = simulation();
        let before = sim.snapshot();
        sim.move_laser(Point2::new(-4.0, 1.0));
        sim.recompute();
        let after = sim.snapshot();
        assert!(!Rc::ptr_eq(&before, &after));
        // the old snapshot is still intact for anyone holding it
        assert!(!before.segments.is_empty());
    }

    #[test]
    fn recompute_is_idempotent() {
        let mut sim = simulation();
        sim.set_color_mode(ColorMode::White);
        let first = sim.recompute();
        let second = sim.recompute();
        assert_eq!(*first, *second);
    }

    #[test]
    fn laser_off_clears_segments() {
        let mut sim = simulation();
        sim.set_laser_on(false);
        sim.recompute();
        assert!(sim.segments().is_empty());
    }

    #[test]
    fn rejects_invalid_input_at_the_boundary() {
        let mut sim = simulation();
        let bad = Medium {
            name: "bad".to_string(),
            dispersion: crate::medium::Dispersion::new(0.5),
        };
        assert!(matches!(
            sim.set_prism_medium(0, bad.clone()),
            Err(RefraxError::InvalidRefractiveIndex(_))
        ));
        assert!(sim.set_environment(bad).is_err());
        assert!(matches!(
            sim.rotate_prism(99, 0.1),
            Err(RefraxError::UnknownPrism(99))
        ));
        assert!(sim.set_wavelength(-1.0).is_err());
        assert!(!sim.is_dirty());
    }

    #[test]
    fn wave_samples_follow_view() {
        let mut sim = simulation();
        let probe = sim.add_probe(Point2::origin());

        sim.step(0.05);
        assert!(sim.sampler().samples(probe).unwrap().is_empty());

        sim.set_wave_view(true);
        for _ in 0..10 {
            sim.step(0.05);
        }
        assert_eq!(sim.sampler().samples(probe).unwrap().len(), 10);

        sim.set_wave_view(false);
        assert!(sim.sampler().samples(probe).unwrap().is_empty());

        sim.set_wave_view(true);
        sim.step(0.05);
        sim.reset();
        assert!(sim.sampler().samples(probe).unwrap().is_empty());
        assert_eq!(sim.time(), 0.0);
    }

    #[test]
    fn removing_prisms_shifts_ids() {
        let mut sim = simulation();
        let prism = Prism::triangle(Point2::new(5.0, 5.0), 1.0, Medium::water()).unwrap();
        let id = sim.add_prism(prism);
        assert_eq!(id, sim.geom().prisms.len() - 1);
        let removed = sim.remove_prism(id).unwrap();
        assert_eq!(removed.medium.name, "water");
        assert!(sim.remove_prism(id).is_err());
    }
}

/// Owns the scene and drives tracing, wave sampling and sensors.
#[derive(Debug, Clone)]
pub struct Simulation {
    settings: Settings,
    geom: Geom,
    laser: Laser,
    snapshot: Rc<Results>,
    dirty: bool,
    time: f64,
    sampler: WaveSampler,
    velocity_sensors: Vec<VelocitySensor>,
    intensity_meters: Vec<IntensityMeter>,
}

impl Simulation {
    /// Builds the scene described by `settings` and traces it once.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        validate_config(&settings).map_err(|e| RefraxError::Configuration(e.to_string()))?;

        let environment = medium_from_config(&settings.environment, &settings)?;
        let mut geom = Geom::new(environment);
        for config in settings.prisms.iter() {
            let medium = medium_from_config(&config.medium, &settings)?;
            let mut prism = config.shape.build(medium)?;
            prism.rotate(config.rotation.to_radians());
            geom.add_prism(prism);
        }

        let mut sampler = WaveSampler::new(settings.wave_capacity);
        for p in settings.probes.iter() {
            sampler.add_probe(Point2::new(p[0], p[1]));
        }
        let velocity_sensors = settings
            .velocity_sensors
            .iter()
            .map(|p| VelocitySensor::new(Point2::new(p[0], p[1])))
            .collect();
        let intensity_meters = settings
            .intensity_meters
            .iter()
            .map(|p| IntensityMeter::new(Point2::new(p[0], p[1])))
            .collect();

        info!(
            "scene: {} prisms in {}, {} probes",
            geom.prisms.len(),
            geom.environment.name,
            settings.probes.len()
        );

        let mut simulation = Self {
            laser: Laser::from_config(&settings.laser),
            settings,
            geom,
            snapshot: Rc::new(Results::new_empty()),
            dirty: true,
            time: 0.0,
            sampler,
            velocity_sensors,
            intensity_meters,
        };
        simulation.recompute();
        Ok(simulation)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn geom(&self) -> &Geom {
        &self.geom
    }

    pub fn laser(&self) -> &Laser {
        &self.laser
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn sampler(&self) -> &WaveSampler {
        &self.sampler
    }

    /// True when the scene changed since the last trace.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The latest trace. May be stale if the scene is dirty.
    pub fn snapshot(&self) -> Rc<Results> {
        Rc::clone(&self.snapshot)
    }

    pub fn segments(&self) -> &[RaySegment] {
        &self.snapshot.segments
    }

    /// Retraces the scene from scratch and publishes the new snapshot.
    pub fn recompute(&mut self) -> Rc<Results> {
        self.snapshot = Rc::new(trace(&self.geom, &self.laser, &self.settings));
        self.dirty = false;
        debug!("recomputed {} segments", self.snapshot.segments.len());
        self.snapshot()
    }

    /// Advances simulation time by `dt`, retracing first if the scene changed.
    /// Wave samples are only recorded while the wave view is shown.
    pub fn step(&mut self, dt: f64) {
        if self.dirty {
            self.recompute();
        }
        self.time += dt;
        if self.laser.view == LaserView::Wave {
            self.sampler.sample(
                self.time,
                dt,
                self.laser.wavelength,
                &self.snapshot.segments,
                &self.settings,
            );
        }
    }

    /// Rewinds time and drops every wave sample. The scene is untouched.
    pub fn reset(&mut self) {
        self.time = 0.0;
        self.sampler.clear();
    }

    pub fn set_laser_angle(&mut self, angle: f64) {
        self.laser.angle = angle;
        self.dirty = true;
    }

    pub fn move_laser(&mut self, emission_point: Point2<f64>) {
        self.laser.emission_point = emission_point;
        self.dirty = true;
    }

    pub fn set_wavelength(&mut self, wavelength: f64) -> Result<()> {
        if !(wavelength.is_finite() && wavelength > 0.0) {
            return Err(RefraxError::Configuration(format!(
                "wavelength must be positive, got {}",
                wavelength
            )));
        }
        self.laser.wavelength = wavelength;
        self.dirty = true;
        Ok(())
    }

    pub fn set_color_mode(&mut self, color_mode: ColorMode) {
        self.laser.color_mode = color_mode;
        self.dirty = true;
    }

    pub fn set_laser_on(&mut self, on: bool) {
        self.laser.on = on;
        self.dirty = true;
    }

    /// Shows or hides the wave view. Hiding it discards the recorded samples.
    pub fn set_wave_view(&mut self, visible: bool) {
        self.laser.view = if visible {
            LaserView::Wave
        } else {
            self.sampler.clear();
            LaserView::Ray
        };
    }

    pub fn add_prism(&mut self, prism: Prism) -> usize {
        self.dirty = true;
        self.geom.add_prism(prism)
    }

    /// Removes a prism. Later prisms shift down by one id.
    pub fn remove_prism(&mut self, id: usize) -> Result<Prism> {
        if id >= self.geom.prisms.len() {
            return Err(RefraxError::UnknownPrism(id));
        }
        self.dirty = true;
        Ok(self.geom.prisms.remove(id))
    }

    pub fn translate_prism(&mut self, id: usize, delta: Vector2<f64>) -> Result<()> {
        if !(delta.x.is_finite() && delta.y.is_finite()) {
            return Err(RefraxError::NonFiniteGeometry);
        }
        self.prism_mut(id)?.translate(delta);
        self.dirty = true;
        Ok(())
    }

    /// Rotates a prism about its centroid by `angle` radians.
    pub fn rotate_prism(&mut self, id: usize, angle: f64) -> Result<()> {
        if !angle.is_finite() {
            return Err(RefraxError::NonFiniteGeometry);
        }
        self.prism_mut(id)?.rotate(angle);
        self.dirty = true;
        Ok(())
    }

    pub fn set_prism_medium(&mut self, id: usize, medium: Medium) -> Result<()> {
        validate_index(medium.index())?;
        self.prism_mut(id)?.medium = medium;
        self.dirty = true;
        Ok(())
    }

    pub fn set_environment(&mut self, medium: Medium) -> Result<()> {
        validate_index(medium.index())?;
        self.geom.environment = medium;
        self.dirty = true;
        Ok(())
    }

    fn prism_mut(&mut self, id: usize) -> Result<&mut Prism> {
        self.geom
            .prisms
            .get_mut(id)
            .ok_or(RefraxError::UnknownPrism(id))
    }

    pub fn add_probe(&mut self, position: Point2<f64>) -> usize {
        self.sampler.add_probe(position)
    }

    pub fn remove_probe(&mut self, id: usize) -> Result<()> {
        self.sampler.remove_probe(id).map(|_| ())
    }

    pub fn add_velocity_sensor(&mut self, position: Point2<f64>) {
        self.velocity_sensors.push(VelocitySensor::new(position));
    }

    /// Phase velocity at `position` for the laser's selected wavelength.
    pub fn velocity_at(&self, position: Point2<f64>) -> f64 {
        VelocitySensor::new(position).read(&self.geom, self.laser.wavelength)
    }

    pub fn velocity_sensors(&self) -> &[VelocitySensor] {
        &self.velocity_sensors
    }

    pub fn velocity_readings(&self) -> Vec<f64> {
        self.velocity_sensors
            .iter()
            .map(|s| s.read(&self.geom, self.laser.wavelength))
            .collect()
    }

    pub fn intensity_meters(&self) -> &[IntensityMeter] {
        &self.intensity_meters
    }

    /// Meter readings against the latest snapshot.
    pub fn intensity_readings(&self) -> Vec<f64> {
        self.intensity_meters
            .iter()
            .map(|m| m.read(&self.snapshot.segments, self.settings.probe_radius))
            .collect()
    }
}

fn medium_from_config(config: &MediumConfig, settings: &Settings) -> Result<Medium> {
    Medium::with_reference(config.name.as_str(), config.index, settings.reference_wavelength)
}
