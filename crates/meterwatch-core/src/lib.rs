//! meterwatch core: telemetry series, threshold trend estimation, and topic monitors.

pub mod sample;
pub mod validation;
pub mod series;
pub mod estimator;
pub mod bands;
pub mod gauge;
pub mod feed;
pub mod monitor;
pub mod render;
pub mod export;
pub mod signal;
pub mod config;

pub use sample::*;
pub use validation::*;
pub use series::*;
pub use estimator::*;
pub use bands::*;
pub use gauge::*;
pub use feed::*;
pub use monitor::*;
pub use render::*;
pub use export::*;
pub use signal::*;
pub use crate::config::*;

#[cfg(test)]
mod tests_estimator;
#[cfg(test)]
mod tests_config;
