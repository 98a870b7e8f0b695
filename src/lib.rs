pub mod containment;
pub mod error;
pub mod fresnel;
pub mod geom;
pub mod intersect;
pub mod laser;
pub mod medium;
pub mod multiproblem;
pub mod output;
pub mod powers;
pub mod problem;
pub mod ray;
pub mod result;
pub mod sensor;
pub mod settings;
pub mod sim;
pub mod snell;
pub mod wave;
