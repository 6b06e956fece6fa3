use crate::{
    error::SpiroError,
    filter::{butterworth_lowpass, filtfilt},
};
use log::debug;
use serde::{Deserialize, Serialize};

/// Order of the anti-aliasing low-pass applied before decimation.
pub const ANTI_ALIAS_ORDER: usize = 4;

const RATIO_TOLERANCE: f64 = 1e-9;

/// Source and target rates for the secondary, lower-resolution pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResampleConfig {
    pub source_rate_hz: f64,
    pub target_rate_hz: f64,
}

impl Default for ResampleConfig {
    fn default() -> Self {
        Self {
            source_rate_hz: 200.0,
            target_rate_hz: 100.0,
        }
    }
}

impl ResampleConfig {
    pub fn factor(&self) -> Result<usize, SpiroError> {
        decimation_factor(self.source_rate_hz, self.target_rate_hz)
    }
}

/// Integer decimation factor `source / target`.
///
/// Fails when either rate is not positive and finite, or when the ratio is
/// not a whole number of at least one.
pub fn decimation_factor(source_rate: f64, target_rate: f64) -> Result<usize, SpiroError> {
    for rate in [source_rate, target_rate] {
        if !(rate.is_finite() && rate > 0.0) {
            return Err(SpiroError::InvalidRate(rate));
        }
    }
    let ratio = source_rate / target_rate;
    let rounded = ratio.round();
    if rounded < 1.0 || (ratio - rounded).abs() > RATIO_TOLERANCE {
        return Err(SpiroError::NonIntegerDecimation {
            source_rate,
            target_rate,
        });
    }
    Ok(rounded as usize)
}

/// Anti-alias filter and decimate `flow` from `source_rate` to `target_rate`.
///
/// Equal rates return the input untouched. Otherwise a 4th-order Butterworth
/// low-pass at the target Nyquist frequency is applied zero-phase and every
/// N-th sample is kept.
pub fn resample(flow: &[f64], source_rate: f64, target_rate: f64) -> Result<Vec<f64>, SpiroError> {
    let factor = decimation_factor(source_rate, target_rate)?;
    if factor == 1 {
        return Ok(flow.to_vec());
    }
    let cutoff = (target_rate / 2.0) / (source_rate / 2.0);
    let sections = butterworth_lowpass(ANTI_ALIAS_ORDER, cutoff)?;
    debug!(
        "resampling {} samples {} Hz -> {} Hz (factor {}, cutoff {:.3})",
        flow.len(),
        source_rate,
        target_rate,
        factor,
        cutoff
    );
    let filtered = filtfilt(&sections, flow);
    Ok(filtered.into_iter().step_by(factor).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_rates_return_input() {
        let flow = vec![0.0, 1.5, -2.0, 3.25];
        assert_eq!(resample(&flow, 200.0, 200.0).unwrap(), flow);
    }

    #[test]
    fn halves_length_for_200_to_100() {
        let flow: Vec<f64> = (0..1000).map(|i| (i as f64 * 0.01).sin()).collect();
        let out = resample(&flow, 200.0, 100.0).unwrap();
        assert_eq!(out.len(), 500);
    }

    #[test]
    fn odd_length_keeps_first_sample_phase() {
        let flow = vec![2.0; 7];
        let out = resample(&flow, 300.0, 100.0).unwrap();
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|v| (v - 2.0).abs() < 1e-9));
    }

    #[test]
    fn slow_signal_survives_decimation() {
        let fs = 200.0;
        let flow: Vec<f64> = (0..2000)
            .map(|i| (2.0 * std::f64::consts::PI * 1.0 * i as f64 / fs).sin())
            .collect();
        let out = resample(&flow, fs, 100.0).unwrap();
        for (j, v) in out.iter().enumerate().skip(100).take(800) {
            assert!((v - flow[2 * j]).abs() < 1e-3);
        }
    }

    #[test]
    fn non_integer_ratio_fails_fast() {
        assert_eq!(
            resample(&[1.0; 10], 300.0, 200.0),
            Err(SpiroError::NonIntegerDecimation {
                source_rate: 300.0,
                target_rate: 200.0
            })
        );
        assert!(matches!(
            decimation_factor(100.0, 200.0),
            Err(SpiroError::NonIntegerDecimation { .. })
        ));
    }

    #[test]
    fn rejects_non_positive_rates() {
        assert_eq!(
            decimation_factor(0.0, 100.0),
            Err(SpiroError::InvalidRate(0.0))
        );
        assert!(decimation_factor(200.0, f64::NAN).is_err());
    }

    #[test]
    fn config_defaults_to_factor_two() {
        assert_eq!(ResampleConfig::default().factor().unwrap(), 2);
    }
}
