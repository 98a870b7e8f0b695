//! Time-domain wave samples at probe points.
//!
//! Each probe keeps a phase counter that advances every step by the optical
//! frequency of the light it sees, slowed by a fixed time scale so the
//! oscillation is visible. The recorded amplitude is `sin(phase)` weighted by
//! the power of the ray segment covering the probe, or zero when no segment
//! does. Every probe keeps only its most recent samples.

use log::debug;
use nalgebra::Point2;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::f64::consts::PI;

use crate::error::{RefraxError, Result};
use crate::laser::frequency;
use crate::ray::RaySegment;
use crate::settings::Settings;

#[cfg(test)]
mod tests {

    use super::*;
    use crate::ray::RayRole;
    use crate::settings::load_default_config;
    use nalgebra::Vector2;

    fn beam(power: f64) -> RaySegment {
        RaySegment {
            start: Point2::new(-1.0, 0.0),
            end: Point2::new(1.0, 0.0),
            prop: Vector2::new(1.0, 0.0),
            wavelength: 650.0,
            power,
            refr_index: 1.0,
            role: RayRole::Incident,
            escaped: false,
        }
    }

    #[test]
    fn window_never_exceeds_capacity() {
        let mut settings = load_default_config().unwrap();
        settings.wave_capacity = 16;
        let mut sampler = WaveSampler::new(settings.wave_capacity);
        let id = sampler.add_probe(Point2::new(0.0, 0.0));
        let segments = vec![beam(1.0)];

        for i in 0..100 {
            sampler.sample(i as f64 * 0.1, 0.1, 650.0, &segments, &settings);
            assert!(sampler.samples(id).unwrap().len() <= 16);
        }
        let samples = sampler.samples(id).unwrap();
        assert_eq!(samples.len(), 16);
        // oldest samples are evicted first
        assert!((samples.front().unwrap().time - 8.4).abs() < 1e-9);
        assert!((samples.back().unwrap().time - 9.9).abs() < 1e-9);
    }

    #[test]
    fn amplitude_is_zero_off_the_beam() {
        let settings = load_default_config().unwrap();
        let mut sampler = WaveSampler::new(settings.wave_capacity);
        let off = sampler.add_probe(Point2::new(0.0, 5.0));
        let on = sampler.add_probe(Point2::new(0.0, 0.0));
        let segments = vec![beam(0.5)];

        for i in 0..20 {
            sampler.sample(i as f64, 1.0, 650.0, &segments, &settings);
        }
        assert!(sampler.samples(off).unwrap().iter().all(|s| s.amplitude == 0.0));
        assert!(sampler.samples(on).unwrap().iter().all(|s| s.amplitude.abs() <= 0.5));
        assert!(sampler.samples(on).unwrap().iter().any(|s| s.amplitude != 0.0));
    }

    #[test]
    fn covering_segment_prefers_highest_power() {
        let segments = vec![beam(0.2), beam(0.7), beam(0.7)];
        let covering = covering_segment(&segments, &Point2::new(0.0, 0.01), 0.05).unwrap();
        assert_eq!(covering.power, 0.7);
        assert!(covering_segment(&segments, &Point2::new(0.0, 1.0), 0.05).is_none());
    }

    #[test]
    fn clear_and_remove() {
        let settings = load_default_config().unwrap();
        let mut sampler = WaveSampler::new(4);
        let a = sampler.add_probe(Point2::origin());
        let b = sampler.add_probe(Point2::new(1.0, 1.0));
        sampler.sample(0.0, 1.0, 650.0, &[], &settings);
        sampler.clear();
        assert!(sampler.samples(a).unwrap().is_empty());

        sampler.remove_probe(a).unwrap();
        assert!(sampler.samples(a).is_none());
        assert!(matches!(sampler.remove_probe(a), Err(RefraxError::UnknownProbe(_))));
        // ids are not reused
        assert!(sampler.add_probe(Point2::origin()) > b);
    }
}

/// One point of a wave chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WaveSample {
    pub time: f64,
    pub amplitude: f64,
}

/// A point at which the wave is sampled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Probe {
    pub position: Point2<f64>,
    phase: f64,
    samples: VecDeque<WaveSample>,
    capacity: usize,
}

impl Probe {
    pub fn new(position: Point2<f64>, capacity: usize) -> Self {
        Self {
            position,
            phase: 0.0,
            samples: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn samples(&self) -> &VecDeque<WaveSample> {
        &self.samples
    }

    fn record(&mut self, sample: WaveSample) {
        while self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    fn clear(&mut self) {
        self.phase = 0.0;
        self.samples.clear();
    }
}

/// All active probes, keyed by a stable id.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveSampler {
    probes: BTreeMap<usize, Probe>,
    next_id: usize,
    capacity: usize,
}

impl WaveSampler {
    pub fn new(capacity: usize) -> Self {
        Self {
            probes: BTreeMap::new(),
            next_id: 0,
            capacity: capacity.max(1),
        }
    }

    pub fn add_probe(&mut self, position: Point2<f64>) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        self.probes.insert(id, Probe::new(position, self.capacity));
        id
    }

    pub fn remove_probe(&mut self, id: usize) -> Result<Probe> {
        self.probes.remove(&id).ok_or(RefraxError::UnknownProbe(id))
    }

    pub fn move_probe(&mut self, id: usize, position: Point2<f64>) -> Result<()> {
        let probe = self.probes.get_mut(&id).ok_or(RefraxError::UnknownProbe(id))?;
        probe.position = position;
        Ok(())
    }

    pub fn probes(&self) -> impl Iterator<Item = (usize, &Probe)> {
        self.probes.iter().map(|(id, probe)| (*id, probe))
    }

    pub fn samples(&self, id: usize) -> Option<&VecDeque<WaveSample>> {
        self.probes.get(&id).map(Probe::samples)
    }

    /// Advances every probe by `dt` and records one sample at `time`.
    ///
    /// `wavelength` drives the phase of probes that no segment covers, so
    /// they keep oscillating in step with the laser while reading zero.
    pub fn sample(
        &mut self,
        time: f64,
        dt: f64,
        wavelength: f64,
        segments: &[RaySegment],
        settings: &Settings,
    ) {
        for probe in self.probes.values_mut() {
            let covering = covering_segment(segments, &probe.position, settings.probe_radius);
            let (wavelength, power) =
                covering.map_or((wavelength, 0.0), |s| (s.wavelength, s.power));

            let step = 2.0 * PI * frequency(wavelength) * settings.time_scale * dt;
            probe.phase = (probe.phase + step) % (2.0 * PI);
            probe.record(WaveSample {
                time,
                amplitude: probe.phase.sin() * power,
            });
        }
    }

    /// Drops every recorded sample and resets the phases. Probes stay in place.
    pub fn clear(&mut self) {
        debug!("clearing {} wave probes", self.probes.len());
        self.probes.values_mut().for_each(Probe::clear);
    }
}

/// The segment covering `point`: the most powerful one within `radius`,
/// first in list order on ties.
pub fn covering_segment<'a>(
    segments: &'a [RaySegment],
    point: &Point2<f64>,
    radius: f64,
) -> Option<&'a RaySegment> {
    segments
        .iter()
        .filter(|s| s.distance_to(point) <= radius)
        .fold(None, |best: Option<&RaySegment>, s| match best {
            Some(b) if b.power >= s.power => Some(b),
            _ => Some(s),
        })
}
