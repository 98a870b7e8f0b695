use log::debug;
use std::time::Instant;

use crate::{
    geom::Geom,
    laser::{ColorMode, Laser},
    problem::Problem,
    result::Results,
    settings::Settings,
};


/// A trace over every wavelength the laser emits.
#[derive(Debug)]
pub struct MultiProblem<'a> {
    pub geom: &'a Geom,
    pub laser: &'a Laser,
    pub settings: &'a Settings, // runtime settings
    pub result: Results,        // combined result of the problems
}

impl<'a> MultiProblem<'a> {
    pub fn new(geom: &'a Geom, laser: &'a Laser, settings: &'a Settings) -> Self {
        Self {
            geom,
            laser,
            settings,
            result: Results::new_empty(),
        }
    }

    /// Traces each wavelength independently and appends the results in
    /// wavelength order. The source power is shared equally between them.
    pub fn solve(&mut self) {
        let start = Instant::now();

        let wavelengths = self.laser.wavelengths(&self.settings.white_light_wavelengths);
        if wavelengths.is_empty() {
            self.result = Results::new_empty();
            return;
        }
        let power = 1.0 / wavelengths.len() as f64;

        let mut result = Results::new_empty();
        for wavelength in wavelengths {
            let mut problem = Problem::new(self.geom, self.settings);
            problem.illuminate(self.laser, wavelength, power);
            problem.solve();
            result.extend(problem.result);
        }
        self.result = result;

        debug!(
            "{} trace: {} segments in {:.2?}",
            match self.laser.color_mode {
                ColorMode::Monochromatic => "monochromatic",
                ColorMode::White => "white light",
            },
            self.result.segments.len(),
            start.elapsed()
        );
    }
}

/// Recomputes the full segment list for a scene and laser from scratch.
pub fn trace(geom: &Geom, laser: &Laser, settings: &Settings) -> Results {
    let mut multiproblem = MultiProblem::new(geom, laser, settings);
    multiproblem.solve();
    multiproblem.result
}
