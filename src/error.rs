//! Error types for refrax

use thiserror::Error;

/// Rejections raised where external input mutates the scene. The tracing
/// core itself never fails.
#[derive(Error, Debug)]
pub enum RefraxError {
    #[error("Refractive index must be finite and at least 1, got {0}")]
    InvalidRefractiveIndex(f64),

    #[error("Prism needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    #[error("Prism has zero area")]
    DegeneratePrism,

    #[error("Prism edges {0} and {1} intersect")]
    SelfIntersectingPrism(usize, usize),

    #[error("Non-finite coordinate in prism geometry")]
    NonFiniteGeometry,

    #[error("No prism with id {0}")]
    UnknownPrism(usize),

    #[error("No probe with id {0}")]
    UnknownProbe(usize),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, RefraxError>;
