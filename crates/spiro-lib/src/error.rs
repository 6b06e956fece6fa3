use thiserror::Error;

/// Failures surfaced by the spirometry core.
///
/// Degenerate captures (too short, no threshold crossing, no low-flow run)
/// are not errors; they resolve to documented fallback values instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpiroError {
    #[error("sample sequence is empty")]
    EmptyInput,
    #[error("sample {index} is not a finite number: {value}")]
    NonFiniteSample { index: usize, value: f64 },
    #[error("sampling interval must be positive and finite, got {0}")]
    InvalidSamplingInterval(f64),
    #[error("sampling rate must be positive and finite, got {0}")]
    InvalidRate(f64),
    #[error("source rate {source_rate} Hz is not an integer multiple of target rate {target_rate} Hz")]
    NonIntegerDecimation { source_rate: f64, target_rate: f64 },
    #[error("filter order must be non-zero, got {0}")]
    InvalidFilterOrder(usize),
    #[error("normalized cutoff must lie in (0, 1), got {0}")]
    InvalidCutoff(f64),
    #[error("unrecognised sex label '{0}' (expected male/female)")]
    InvalidSex(String),
    #[error("source rate {source_rate} Hz disagrees with sampling interval {interval_s} s")]
    RateMismatch { source_rate: f64, interval_s: f64 },
    #[error("{0} window must span at least one sample")]
    EmptyWindow(&'static str),
    #[error("invalid subject measurement: {0}")]
    InvalidMeasurement(String),
}
