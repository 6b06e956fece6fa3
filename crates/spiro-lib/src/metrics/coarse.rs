use crate::{
    error::SpiroError,
    resample::{resample, ResampleConfig},
    signal::{linspace, nan_max, signed_flow, trapezoid},
};
use serde::{Deserialize, Serialize};

/// Summary computed on the downsampled flow for lower-resolution consumers.
///
/// Unlike [`crate::metrics::MetricSet`], this path integrates the whole
/// capture with no onset anchoring, over a time axis that starts at 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoarseSummary {
    pub rate_hz: f64,
    pub fvc: f64,
    pub fev1: f64,
    pub pef: f64,
    pub flow: Vec<f64>,
}

/// Downsample `flow` and derive FVC, FEV1 and PEF from the result.
pub fn coarse_summary(
    flow: &[f64],
    exhale_positive: bool,
    cfg: &ResampleConfig,
) -> Result<CoarseSummary, SpiroError> {
    let down = resample(flow, cfg.source_rate_hz, cfg.target_rate_hz)?;
    let down = signed_flow(&down, exhale_positive);
    let n = down.len();
    let time = linspace(0.0, n as f64 / cfg.target_rate_hz, n);

    let one_second = (cfg.target_rate_hz as usize).min(n);
    Ok(CoarseSummary {
        rate_hz: cfg.target_rate_hz,
        fvc: trapezoid(&down, &time),
        fev1: trapezoid(&down[..one_second], &time[..one_second]),
        pef: nan_max(&down).unwrap_or(f64::NAN),
        flow: down,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_flow_summary() {
        let flow = vec![2.0; 400];
        let cfg = ResampleConfig::default();
        let summary = coarse_summary(&flow, true, &cfg).unwrap();
        assert_eq!(summary.flow.len(), 200);
        assert!((summary.pef - 2.0).abs() < 1e-9);
        // 200 samples spread over [0, 2] s
        assert!((summary.fvc - 4.0).abs() < 1e-6);
        let dt = 2.0 / 199.0;
        assert!((summary.fev1 - 2.0 * 99.0 * dt).abs() < 1e-6);
    }

    #[test]
    fn short_capture_caps_first_second() {
        let flow = vec![1.0; 40];
        let cfg = ResampleConfig::default();
        let summary = coarse_summary(&flow, true, &cfg).unwrap();
        assert_eq!(summary.flow.len(), 20);
        assert!((summary.fev1 - summary.fvc).abs() < 1e-12);
    }

    #[test]
    fn propagates_decimation_errors() {
        let cfg = ResampleConfig {
            source_rate_hz: 250.0,
            target_rate_hz: 100.0,
        };
        assert!(coarse_summary(&[1.0; 10], true, &cfg).is_err());
    }
}
