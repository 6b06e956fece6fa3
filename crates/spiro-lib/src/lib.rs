//! Spirometry metrics (FEV1, FVC, PEF, FEF25–75%, blow duration) from raw
//! breath-flow sensor captures.
//!
//! Data flows strictly forward: voltages → flow → onset → volume → metrics,
//! with an optional anti-aliased downsampling branch for lower-resolution
//! consumers. Every stage is a pure function of its inputs.

pub mod detectors;
pub mod error;
pub mod features;
pub mod filter;
pub mod io;
pub mod metrics;
pub mod pipeline;
pub mod plot;
pub mod resample;
pub mod signal;

pub use detectors::*;
pub use error::SpiroError;
pub use metrics::*;
pub use pipeline::{analyze, summary_statistics, SpiroConfig, SpirometryReport};
pub use resample::{resample, ResampleConfig};
pub use signal::*;
