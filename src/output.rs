use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::result::Results;
use crate::settings::Settings;
use crate::sim::Simulation;

#[cfg(test)]
mod tests {

    use super::*;
    use crate::settings::load_default_config;
    use nalgebra::Point2;

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("refrax-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn writes_all_files() {
        let mut settings = load_default_config().unwrap();
        settings.directory = scratch_dir("writeup");
        let mut sim = Simulation::from_settings(settings).unwrap();
        let probe = sim.add_probe(Point2::new(0.0, 0.0));
        sim.set_wave_view(true);
        for _ in 0..5 {
            sim.step(0.05);
        }
        writeup(&sim).unwrap();

        let dir = &sim.settings().directory;
        let segments = fs::read_to_string(dir.join("segments.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&segments).unwrap();
        assert_eq!(
            parsed["segments"].as_array().unwrap().len(),
            sim.segments().len()
        );

        let waves = fs::read_to_string(dir.join(format!("waves_{}.dat", probe))).unwrap();
        assert_eq!(waves.lines().count(), 5);

        let written = fs::read_to_string(dir.join("settings.toml")).unwrap();
        let reloaded: Settings = toml::from_str(&written).unwrap();
        assert_eq!(&reloaded, sim.settings());

        fs::remove_dir_all(dir).unwrap();
    }
}

/// Writes the latest snapshot, wave samples, sensor readings and the
/// effective settings into the configured output directory.
pub fn writeup(simulation: &Simulation) -> Result<()> {
    let directory = &simulation.settings().directory;
    fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create output directory {:?}", directory))?;

    write_result(&simulation.snapshot(), directory)?;
    write_waves(simulation, directory)?;
    write_sensors(simulation, directory)?;
    write_settings(simulation.settings(), directory)?;

    info!("results written to {:?}", directory);
    Ok(())
}

/// Writes the segment list and power budget as JSON.
pub fn write_result(result: &Results, directory: &Path) -> Result<()> {
    let file = File::create(directory.join("segments.json"))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, result)?;
    Ok(())
}

/// Writes one `time amplitude` file per probe.
pub fn write_waves(simulation: &Simulation, directory: &Path) -> Result<()> {
    for (id, probe) in simulation.sampler().probes() {
        let file = File::create(directory.join(format!("waves_{}.dat", id)))?;
        let mut writer = BufWriter::new(file);
        for sample in probe.samples() {
            writeln!(writer, "{} {}", sample.time, sample.amplitude)?;
        }
    }
    Ok(())
}

/// Writes velocity sensor and intensity meter readings, one per line.
pub fn write_sensors(simulation: &Simulation, directory: &Path) -> Result<()> {
    let file = File::create(directory.join("sensors.dat"))?;
    let mut writer = BufWriter::new(file);

    let velocities = simulation.velocity_readings();
    for (sensor, speed) in simulation.velocity_sensors().iter().zip(velocities) {
        writeln!(
            writer,
            "velocity {} {} {}",
            sensor.position.x, sensor.position.y, speed
        )?;
    }
    let intensities = simulation.intensity_readings();
    for (meter, power) in simulation.intensity_meters().iter().zip(intensities) {
        writeln!(
            writer,
            "intensity {} {} {}",
            meter.position.x, meter.position.y, power
        )?;
    }
    Ok(())
}

pub fn write_settings(settings: &Settings, directory: &Path) -> Result<()> {
    let contents = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
    fs::write(directory.join("settings.toml"), contents)?;
    Ok(())
}
