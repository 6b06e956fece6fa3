use crate::error::SpiroError;
use serde::{Deserialize, Serialize};

/// Linear voltage → flow calibration (`flow = gain * (v - baseline_voltage)`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    /// Sensor constant K in L/s per volt.
    pub gain: f64,
    /// Voltage reported at zero airflow.
    pub baseline_voltage: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            gain: 1.0,
            baseline_voltage: 0.0,
        }
    }
}

/// Reject empty captures and any sample that is not a finite number.
pub fn validate_samples(samples: &[f64]) -> Result<(), SpiroError> {
    if samples.is_empty() {
        return Err(SpiroError::EmptyInput);
    }
    if let Some((index, &value)) = samples.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(SpiroError::NonFiniteSample { index, value });
    }
    Ok(())
}

/// Convert raw sensor voltages to flow in L/s.
pub fn to_flow(voltages: &[f64], calibration: &Calibration) -> Result<Vec<f64>, SpiroError> {
    validate_samples(voltages)?;
    Ok(voltages
        .iter()
        .map(|&v| calibration.gain * (v - calibration.baseline_voltage))
        .collect())
}

/// Sample timestamps in seconds. The first sample sits at `interval`, not 0.
pub fn time_axis(interval: f64, len: usize) -> Vec<f64> {
    (0..len).map(|i| interval + i as f64 * interval).collect()
}

/// Flow with exhalation mapped to the positive direction.
pub fn signed_flow(flow: &[f64], exhale_positive: bool) -> Vec<f64> {
    if exhale_positive {
        flow.to_vec()
    } else {
        flow.iter().map(|v| -v).collect()
    }
}

/// Maximum over the finite entries, `None` when there are none.
pub fn nan_max(data: &[f64]) -> Option<f64> {
    data.iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            Some(m) if m >= v => Some(m),
            _ => Some(v),
        })
}

/// Piecewise-linear interpolation of `fp(xp)` at `x`.
///
/// `xp` must be increasing. Values outside the table clamp to the end points.
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let n = xp.len().min(fp.len());
    if n == 0 {
        return f64::NAN;
    }
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[n - 1] {
        return fp[n - 1];
    }
    let hi = xp[..n].partition_point(|&v| v <= x);
    let lo = hi - 1;
    let dx = xp[hi] - xp[lo];
    if dx == 0.0 {
        return fp[lo];
    }
    fp[lo] + (x - xp[lo]) * (fp[hi] - fp[lo]) / dx
}

/// `n` evenly spaced points from `lo` to `hi` inclusive.
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (n - 1) as f64;
            let mut out: Vec<f64> = (0..n).map(|i| lo + i as f64 * step).collect();
            out[n - 1] = hi;
            out
        }
    }
}

/// Trapezoidal integral of `y` over the sample positions `x`.
pub fn trapezoid(y: &[f64], x: &[f64]) -> f64 {
    y.windows(2)
        .zip(x.windows(2))
        .map(|(yw, xw)| (xw[1] - xw[0]) * (yw[0] + yw[1]) / 2.0)
        .sum()
}
