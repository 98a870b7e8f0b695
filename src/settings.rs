use anyhow::{anyhow, Context, Result};
use clap::Parser;
use config::{Config, Environment, File};
use log::info;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::geom::PrismShape;

/// Minimum distance traversed by ray to intersection. Intersections closer than this are ignored.
pub const RAYCAST_MINIMUM_DISTANCE: f64 = 1e-6;
/// Two intersection distances closer than this are treated as the same hit (shared vertex).
pub const TIE_DISTANCE: f64 = 1e-9;
/// Distance stepped along the ray past an interface to find the medium beyond it.
pub const PROBE_OFFSET: f64 = 1e-6;
/// Tolerance on `sin(theta_i) >= n2 / n1`. Hits within it are classified as total internal
/// reflection.
pub const TIR_EPSILON: f64 = 1e-9;
/// Minimum edge length (in scene units) to be considered non-degenerate.
pub const VEC_LENGTH_THRESHOLD: f64 = 1e-9;
/// Minimum absolute cross product of ray and edge directions to be considered non-parallel.
pub const COLINEAR_THRESHOLD: f64 = 1e-12;
/// Incidence angles (radians) below this use the normal-incidence Fresnel formula.
pub const NORMAL_INCIDENCE_THRESHOLD: f64 = 1e-6;
/// Speed of light in vacuum, metres per second.
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Runtime configuration for the application.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Settings {
    /// Rays carrying less than this fraction of the source power are dropped.
    pub power_threshold: f64,
    /// Maximum number of interface interactions along one ray path.
    pub max_rec: usize,
    /// Length of a segment that leaves the scene.
    pub escape_distance: f64,
    /// Wavelength (nm) at which every medium takes its nominal index.
    pub reference_wavelength: f64,
    /// Representative wavelengths (nm) traced in white-light mode.
    pub white_light_wavelengths: Vec<f64>,
    /// Number of samples retained per wave probe.
    pub wave_capacity: usize,
    /// Scales optical frequency down to a visible oscillation rate.
    pub time_scale: f64,
    /// Distance within which a ray segment counts as covering a probe or meter.
    pub probe_radius: f64,
    pub environment: MediumConfig,
    pub laser: LaserConfig,
    #[serde(default)]
    pub prisms: Vec<PrismConfig>,
    #[serde(default)]
    pub probes: Vec<[f64; 2]>,
    #[serde(default)]
    pub velocity_sensors: Vec<[f64; 2]>,
    #[serde(default)]
    pub intensity_meters: Vec<[f64; 2]>,
    pub steps: usize,
    pub dt: f64,
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
}

fn default_directory() -> PathBuf {
    PathBuf::from("output")
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MediumConfig {
    pub name: String,
    pub index: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LaserConfig {
    pub position: [f64; 2],
    /// Emission angle in degrees, counter-clockwise from +x.
    pub angle: f64,
    /// Wavelength in nm.
    pub wavelength: f64,
    #[serde(default = "default_true")]
    pub on: bool,
    #[serde(default)]
    pub white: bool,
    #[serde(default)]
    pub wave_view: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PrismConfig {
    pub shape: PrismShape,
    /// Rotation about the centroid in degrees.
    #[serde(default)]
    pub rotation: f64,
    pub medium: MediumConfig,
}

pub fn load_default_config() -> Result<Settings> {
    let root = retrieve_project_root()?;
    let default_config_file = root.join("config/default.toml");

    let settings = Config::builder()
        .add_source(File::from(default_config_file).required(true))
        .build()
        .context("Error loading configuration")?;

    let config: Settings = settings
        .try_deserialize()
        .context("Error deserializing configuration")?;

    validate_config(&config)?;

    Ok(config)
}

pub fn load_config() -> Result<Settings> {
    let root = retrieve_project_root()?;

    let default_config_file = root.join("config/default.toml");
    let local_config = root.join("config/local.toml");

    // Check if local config exists, if not use default
    let config_file = if local_config.exists() {
        info!("Using local configuration: {:?}", local_config);
        local_config
    } else {
        info!("Using default configuration: {:?}", default_config_file);
        default_config_file
    };

    let settings = Config::builder()
        .add_source(File::from(config_file).required(true))
        .add_source(Environment::with_prefix("refrax"))
        .build()
        .context("Error loading configuration")?;

    let mut config: Settings = settings
        .try_deserialize()
        .context("Error deserializing configuration")?;

    // Parse command-line arguments and override values
    let args = CliArgs::parse();

    if let Some(w) = args.w {
        config.laser.wavelength = w;
    }
    if let Some(angle) = args.angle {
        config.laser.angle = angle;
    }
    if args.white {
        config.laser.white = true;
    }
    if args.wave {
        config.laser.wave_view = true;
    }
    if let Some(ri0) = args.ri0 {
        config.environment.index = ri0;
    }
    if let Some(bp) = args.bp {
        config.power_threshold = bp;
    }
    if let Some(rec) = args.rec {
        config.max_rec = rec;
    }
    if let Some(steps) = args.steps {
        config.steps = steps;
    }
    if let Some(dt) = args.dt {
        config.dt = dt;
    }
    if let Some(dir) = args.dir {
        config.directory = dir;
    }

    validate_config(&config)?;

    info!("{}", config);

    Ok(config)
}

/// Retrieve the project root directory.
/// This function tries to find the project root directory in different ways:
/// 1. If the CARGO_MANIFEST_DIR environment variable is set, use it.
/// 2. If the REFRAX_ROOT_DIR environment variable is set, use it.
/// 3. If the "config" subdirectory is found in the executable directory or any of its
///    parents, use it.
fn retrieve_project_root() -> Result<PathBuf> {
    if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        return Ok(PathBuf::from(manifest_dir));
    }
    if let Ok(path) = env::var("REFRAX_ROOT_DIR") {
        return Ok(PathBuf::from(path));
    }

    let exe_path = env::current_exe().context("Failed to get current executable path")?;
    exe_path
        .ancestors()
        .skip(1)
        .find(|dir| dir.join("config").is_dir())
        .map(|dir| dir.to_path_buf())
        .ok_or_else(|| anyhow!("Could not find project root directory"))
}

pub fn validate_config(config: &Settings) -> Result<()> {
    if !(config.power_threshold > 0.0 && config.power_threshold < 1.0) {
        return Err(anyhow!(
            "Power threshold must lie in (0, 1), got {}",
            config.power_threshold
        ));
    }
    if config.reference_wavelength <= 0.0 || config.laser.wavelength <= 0.0 {
        return Err(anyhow!("Wavelengths must be greater than 0"));
    }
    if config.white_light_wavelengths.iter().any(|&w| w <= 0.0) {
        return Err(anyhow!("White light wavelengths must be greater than 0"));
    }
    if config.wave_capacity == 0 {
        return Err(anyhow!("Wave capacity must be at least 1"));
    }
    if config.escape_distance <= 0.0 {
        return Err(anyhow!("Escape distance must be greater than 0"));
    }
    if config.dt <= 0.0 {
        return Err(anyhow!("Time step must be greater than 0"));
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(version, about = "refrax - light through prisms and media in 2D")]
pub struct CliArgs {
    /// Laser wavelength in nanometres.
    #[arg(short, long)]
    w: Option<f64>,

    /// Laser emission angle in degrees, counter-clockwise from +x.
    #[arg(short, long)]
    angle: Option<f64>,

    /// Emit white light instead of a single wavelength.
    #[arg(long)]
    white: bool,

    /// Enable the wave view, which records wave samples at each probe.
    #[arg(long)]
    wave: bool,

    /// The refractive index of the surrounding medium.
    #[arg(long)]
    ri0: Option<f64>,

    /// Minimum ray power, as a fraction of the source power, for new rays to propagate.
    #[arg(long)]
    bp: Option<f64>,

    /// The maximum number of interface interactions before a ray is truncated.
    #[arg(long)]
    rec: Option<usize>,

    /// Number of simulation steps to run.
    #[arg(long)]
    steps: Option<usize>,

    /// Simulation time advanced per step.
    #[arg(long)]
    dt: Option<f64>,

    /// Directory the results are written to.
    #[arg(short, long)]
    dir: Option<PathBuf>,
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Settings:
  - Power Threshold: {:.6}
  - Max Rec: {}
  - Escape Distance: {:.3}
  - Reference Wavelength: {:.1} nm
  - Environment: {} ({:.4})
  - Laser: {:.1} nm at {:.2} deg, white: {}
  - Prisms: {}
  - Steps: {} x {:.4}
  ",
            self.power_threshold,
            self.max_rec,
            self.escape_distance,
            self.reference_wavelength,
            self.environment.name,
            self.environment.index,
            self.laser.wavelength,
            self.laser.angle,
            self.laser.white,
            self.prisms.len(),
            self.steps,
            self.dt,
        )
    }
}
