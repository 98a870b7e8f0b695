use log::{debug, trace};

use crate::{
    geom::Geom,
    intersect::nearest_intersection,
    laser::Laser,
    ray::{Ray, RaySegment},
    result::Results,
    settings::Settings,
};

#[cfg(test)]
mod tests {

    use super::*;
    use crate::geom::Prism;
    use crate::medium::Medium;
    use crate::ray::RayRole;
    use crate::settings::load_default_config;
    use nalgebra::Point2;

    fn glass_block() -> Geom {
        let mut geom = Geom::new(Medium::air());
        let slab = Prism::rectangle(Point2::new(0.0, -1.0), 4.0, 2.0, Medium::glass()).unwrap();
        geom.add_prism(slab);
        geom
    }

    #[test]
    fn empty_scene_escapes() {
        let settings = load_default_config().unwrap();
        let geom = Geom::new(Medium::air());
        let laser = Laser::new(Point2::origin(), 0.3, 650.0);

        let mut problem = Problem::new(&geom, &settings);
        problem.illuminate(&laser, laser.wavelength, 1.0);
        problem.solve();

        assert_eq!(problem.result.segments.len(), 1);
        let segment = &problem.result.segments[0];
        assert!(segment.escaped);
        assert_eq!(segment.role, RayRole::Incident);
        assert!((segment.length() - settings.escape_distance).abs() < 1e-9);
        assert_eq!(problem.result.powers.output, 1.0);
    }

    #[test]
    fn block_trace_conserves_power() {
        let settings = load_default_config().unwrap();
        let geom = glass_block();
        let laser = Laser::new(Point2::new(-1.0, 1.0), (-60f64).to_radians(), 650.0);

        let mut problem = Problem::new(&geom, &settings);
        problem.illuminate(&laser, laser.wavelength, 1.0);
        problem.solve();

        let powers = problem.result.powers;
        assert_eq!(powers.input, 1.0);
        assert!(powers.missing().abs() < 1e-9, "{}", powers);
        assert_eq!(problem.result.segments[0].role, RayRole::Incident);
        assert!(problem.result.segments.iter().all(|s| s.power <= 1.0 && s.power >= 0.0));
        assert!(problem.ray_queue.is_empty());
    }

    #[test]
    fn propagation_reports_children() {
        let settings = load_default_config().unwrap();
        let geom = glass_block();
        let laser = Laser::new(Point2::new(0.0, 1.0), (-90f64).to_radians(), 650.0);

        let mut problem = Problem::new(&geom, &settings);
        problem.illuminate(&laser, laser.wavelength, 1.0);
        let first = problem.propagate_next().unwrap();
        assert_eq!(first.outputs.len(), 2);
        assert!(!first.segment.escaped);
        // the strongest child is dequeued next
        let next = problem.ray_queue.last().unwrap();
        assert_eq!(next.role, RayRole::Refracted);
        assert!((next.power - 0.96).abs() < 1e-12);
    }

    #[test]
    fn laser_inside_prism_starts_in_its_medium() {
        let settings = load_default_config().unwrap();
        let geom = glass_block();
        let laser = Laser::new(Point2::new(0.0, -1.0), 0.0, 650.0);

        let mut problem = Problem::new(&geom, &settings);
        problem.illuminate(&laser, laser.wavelength, 1.0);
        assert_eq!(problem.ray_queue[0].refr_index, 1.5);
    }
}

/// The outcome of propagating a single ray one step.
#[derive(Debug, Clone, PartialEq)]
pub struct RayPropagation {
    pub input: Ray,
    pub segment: RaySegment,
    pub outputs: Vec<Ray>,
}

/// Traces one wavelength through a scene.
#[derive(Debug, Clone)]
pub struct Problem<'a> {
    pub geom: &'a Geom,          // geometry to trace rays in
    pub settings: &'a Settings,  // runtime settings
    pub ray_queue: Vec<Ray>,     // rays awaiting propagation
    pub result: Results,         // results of the problem
}

impl<'a> Problem<'a> {
    pub fn new(geom: &'a Geom, settings: &'a Settings) -> Self {
        Self {
            geom,
            settings,
            ray_queue: Vec::new(),
            result: Results::new_empty(),
        }
    }

    /// Seeds the queue with the ray leaving the laser at `wavelength`, carrying `power`.
    pub fn illuminate(&mut self, laser: &Laser, wavelength: f64, power: f64) {
        let refr_index = self
            .geom
            .medium_at(&laser.emission_point)
            .index_at(wavelength);
        let ray = Ray::new_initial(
            laser.emission_point,
            laser.direction(),
            wavelength,
            power,
            refr_index,
        );
        self.result.powers.input += power;
        self.insert_ray(ray);
    }

    /// Trace rays until the queue is empty.
    pub fn solve(&mut self) {
        while self.propagate_next().is_some() {}
        debug!(
            "traced {} segments, missing power {:.3e}",
            self.result.segments.len(),
            self.result.powers.missing()
        );
    }

    /// Propagates the next ray in the queue.
    pub fn propagate_next(&mut self) -> Option<RayPropagation> {
        let ray = self.ray_queue.pop()?;
        let escape_distance = self.settings.escape_distance;

        let Some(intersection) = nearest_intersection(&ray, self.geom, escape_distance) else {
            trace!("{:?} ray escaped with power {:.4}", ray.role, ray.power);
            let segment = ray.to_segment(ray.at(escape_distance), true);
            self.result.powers.output += ray.power;
            self.result.segments.push(segment.clone());
            return Some(RayPropagation {
                input: ray,
                segment,
                outputs: Vec::new(),
            });
        };

        let segment = ray.to_segment(intersection.point, false);
        self.result.segments.push(segment.clone());

        let outputs: Vec<Ray> = ray.split(&intersection).into_rays().collect();
        for output in outputs.iter() {
            if output.power < self.settings.power_threshold {
                self.result.powers.trnc_energy += output.power;
                continue;
            }
            if output.depth > self.settings.max_rec {
                trace!("ray truncated at depth {}", output.depth);
                self.result.powers.trnc_rec += output.power;
                continue;
            }
            self.insert_ray(output.clone());
        }

        Some(RayPropagation {
            input: ray,
            segment,
            outputs,
        })
    }

    /// Inserts a ray into the ray queue such that rays with greatest power
    /// are prioritised for dequeueing. Order is ascending because rays are
    /// processed by popping.
    pub fn insert_ray(&mut self, ray: Ray) {
        let pos = get_position_by_power(ray.power, &self.ray_queue);
        self.ray_queue.insert(pos, ray);
    }
}

/// Find the position to insert the ray using binary search.
fn get_position_by_power(value: f64, queue: &[Ray]) -> usize {
    queue
        .binary_search_by(|x| {
            x.power
                .partial_cmp(&value)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or_else(|e| e)
}
