use crate::{
    detectors::onset::first_sustained_run,
    signal::{interp, linspace, nan_max, signed_flow, trapezoid},
};
use serde::{Deserialize, Serialize};

/// Minimum volume step kept when building a strictly increasing volume axis.
const VOLUME_EPSILON: f64 = 1e-12;
/// Grid resolution used to average flow across the mid-expiratory window.
const FEF_GRID_POINTS: usize = 200;

/// Standard spirometry metrics for one forced exhalation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    /// Volume exhaled in the first second (L).
    pub fev1: f64,
    /// Forced vital capacity (L).
    pub fvc: f64,
    /// Peak expiratory flow (L/s).
    pub pef: f64,
    /// Mean flow between 25% and 75% of FVC (L/s). NaN when undefined.
    pub fef25_75: f64,
    /// Seconds from onset to end of blow.
    pub blow_duration: f64,
    /// Sample index where the blow was judged to end.
    pub end_index: usize,
}

impl MetricSet {
    /// FEV1/FVC ratio, `None` when FVC is not positive.
    pub fn fev1_fvc_ratio(&self) -> Option<f64> {
        (self.fvc > 0.0).then(|| self.fev1 / self.fvc)
    }
}

/// Parameters for locating the end of a blow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndConfig {
    /// Flow (L/s) at or below which the blow is considered finished.
    pub end_flow_threshold: f64,
    /// Consecutive low-flow samples required.
    pub min_consecutive: usize,
}

impl Default for EndConfig {
    fn default() -> Self {
        Self {
            end_flow_threshold: 0.05,
            min_consecutive: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlowDuration {
    pub seconds: f64,
    pub end_index: usize,
}

/// Volume exhaled one second after the onset sample.
///
/// Captures that end before the one-second mark report the total volume
/// exhaled after onset instead.
pub fn fev1(volume: &[f64], time: &[f64], onset: usize) -> f64 {
    let (Some(&last_t), Some(&last_v)) = (time.last(), volume.last()) else {
        return f64::NAN;
    };
    let (Some(&t0), Some(&v0)) = (time.get(onset), volume.get(onset)) else {
        return f64::NAN;
    };
    let target_t = t0 + 1.0;
    if target_t > last_t {
        return last_v - v0;
    }
    interp(target_t, time, volume) - v0
}

/// Largest finite volume.
pub fn fvc(volume: &[f64]) -> f64 {
    nan_max(volume).unwrap_or(f64::NAN)
}

/// Largest finite signed flow.
pub fn pef(flow: &[f64], exhale_positive: bool) -> f64 {
    nan_max(&signed_flow(flow, exhale_positive)).unwrap_or(f64::NAN)
}

/// Average flow over the 25–75% FVC volume span, NaN if the span is degenerate.
pub fn fef25_75(flow: &[f64], volume: &[f64], fvc: f64, onset: usize, exhale_positive: bool) -> f64 {
    let s = signed_flow(flow, exhale_positive);
    let start = onset.min(s.len()).min(volume.len());
    let v = &volume[start..];
    let f = &s[start..];

    let mut v2 = Vec::with_capacity(v.len());
    let mut f2 = Vec::with_capacity(f.len());
    for (i, (&vi, &fi)) in v.iter().zip(f).enumerate() {
        if i == 0 || vi - v[i - 1] > VOLUME_EPSILON {
            v2.push(vi);
            f2.push(fi);
        }
    }
    if v2.len() < 2 || !fvc.is_finite() {
        return f64::NAN;
    }

    let v_lo = (0.25 * fvc).max(v2[0]);
    let v_hi = (0.75 * fvc).min(v2[v2.len() - 1]);
    if v_hi <= v_lo {
        return f64::NAN;
    }

    let v_grid = linspace(v_lo, v_hi, FEF_GRID_POINTS);
    let f_grid: Vec<f64> = v_grid.iter().map(|&x| interp(x, &v2, &f2)).collect();
    trapezoid(&f_grid, &v_grid) / (v_hi - v_lo)
}

/// Time from onset until flow first stays at or below the end threshold.
pub fn blow_duration(
    flow: &[f64],
    time: &[f64],
    onset: usize,
    exhale_positive: bool,
    cfg: &EndConfig,
) -> BlowDuration {
    let Some(last) = time.len().checked_sub(1) else {
        return BlowDuration {
            seconds: f64::NAN,
            end_index: 0,
        };
    };
    let onset = onset.min(last);
    let post: Vec<f64> = signed_flow(flow, exhale_positive)
        .iter()
        .skip(onset)
        .map(|v| v.max(0.0))
        .collect();

    let end_index = if post.len() < cfg.min_consecutive {
        last
    } else {
        first_sustained_run(
            post.iter().map(|&v| v <= cfg.end_flow_threshold),
            cfg.min_consecutive,
        )
        .map(|offset| onset + offset)
        .unwrap_or(last)
    };

    BlowDuration {
        seconds: time[end_index] - time[onset],
        end_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        detectors::onset::OnsetConfig,
        metrics::volume::integrate,
        signal::time_axis,
    };

    const DT: f64 = 0.005;

    fn decaying_blow(n: usize) -> Vec<f64> {
        let mut flow = vec![0.0; 20];
        flow.extend((0..n).map(|i| {
            let t = i as f64 * DT;
            8.0 * (t / 0.1).min(1.0) * (-t / 0.8).exp()
        }));
        flow.extend(vec![0.0; 40]);
        flow
    }

    #[test]
    fn fev1_interpolates_at_one_second() {
        let flow = vec![1.0; 600];
        let time = time_axis(DT, flow.len());
        let (volume, onset) = integrate(&flow, DT, Some(0), true, &OnsetConfig::default());
        assert_eq!(onset, 0);
        assert!((fev1(&volume, &time, onset) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn fev1_short_capture_uses_last_volume() {
        let flow = vec![2.0; 100];
        let time = time_axis(DT, flow.len());
        let (volume, onset) = integrate(&flow, DT, Some(0), true, &OnsetConfig::default());
        let expected = volume[99] - volume[0];
        assert_eq!(fev1(&volume, &time, onset), expected);
    }

    #[test]
    fn pef_is_exact_peak() {
        let flow: Vec<f64> = (0..=50).map(|i| i as f64 * 0.25).collect();
        assert_eq!(pef(&flow, true), 12.5);
        let neg: Vec<f64> = flow.iter().map(|v| -v).collect();
        assert_eq!(pef(&neg, false), 12.5);
    }

    #[test]
    fn fvc_ignores_non_finite() {
        assert_eq!(fvc(&[0.0, 1.5, f64::NAN, 1.2]), 1.5);
    }

    #[test]
    fn fef_constant_flow_equals_flow() {
        let flow = vec![3.0; 500];
        let (volume, onset) = integrate(&flow, DT, Some(0), true, &OnsetConfig::default());
        let cap = fvc(&volume);
        let fef = fef25_75(&flow, &volume, cap, onset, true);
        assert!((fef - 3.0).abs() < 1e-9, "fef {}", fef);
    }

    #[test]
    fn fef_is_nan_for_zero_fvc() {
        let flow = vec![0.0; 50];
        let volume = vec![0.0; 50];
        assert!(fef25_75(&flow, &volume, 0.0, 0, true).is_nan());
    }

    #[test]
    fn fef_is_nan_with_single_usable_point() {
        let flow = [1.0, 1.0, 1.0];
        let volume = [0.0, 0.0, 0.0];
        assert!(fef25_75(&flow, &volume, 1.0, 0, true).is_nan());
    }

    #[test]
    fn fef_within_flow_range_for_decaying_blow() {
        let flow = decaying_blow(800);
        let (volume, onset) = integrate(&flow, DT, None, true, &OnsetConfig::default());
        let cap = fvc(&volume);
        let fef = fef25_75(&flow, &volume, cap, onset, true);
        assert!(fef > 0.0 && fef < pef(&flow, true));
    }

    #[test]
    fn blow_ends_at_first_low_flow_run() {
        let flow = decaying_blow(800);
        let time = time_axis(DT, flow.len());
        let (_, onset) = integrate(&flow, DT, None, true, &OnsetConfig::default());
        let bd = blow_duration(&flow, &time, onset, true, &EndConfig::default());
        assert!(bd.end_index > onset);
        assert!(bd.end_index < flow.len() - 1);
        assert!(flow[bd.end_index..bd.end_index + 5].iter().all(|&v| v <= 0.05));
        assert!((bd.seconds - (time[bd.end_index] - time[onset])).abs() < 1e-12);
    }

    #[test]
    fn blow_without_low_flow_runs_to_end() {
        let flow = vec![1.0; 100];
        let time = time_axis(DT, flow.len());
        let bd = blow_duration(&flow, &time, 10, true, &EndConfig::default());
        assert_eq!(bd.end_index, 99);
        assert!((bd.seconds - 89.0 * DT).abs() < 1e-9);
    }

    #[test]
    fn blow_with_short_tail_runs_to_end() {
        let flow = vec![0.0; 10];
        let time = time_axis(DT, flow.len());
        let bd = blow_duration(&flow, &time, 7, true, &EndConfig::default());
        assert_eq!(bd.end_index, 9);
    }

    #[test]
    fn negative_noise_counts_as_low_flow() {
        let mut flow = vec![2.0; 30];
        flow.extend([-0.3, -0.1, -0.2, 0.01, -0.5]);
        flow.extend(vec![2.0; 10]);
        let time = time_axis(DT, flow.len());
        let bd = blow_duration(&flow, &time, 0, true, &EndConfig::default());
        assert_eq!(bd.end_index, 30);
    }

    #[test]
    fn ratio_requires_positive_fvc() {
        let m = MetricSet {
            fev1: 2.0,
            fvc: 4.0,
            pef: 6.0,
            fef25_75: 3.0,
            blow_duration: 3.5,
            end_index: 700,
        };
        assert_eq!(m.fev1_fvc_ratio(), Some(0.5));
        let zero = MetricSet { fvc: 0.0, ..m };
        assert_eq!(zero.fev1_fvc_ratio(), None);
    }
}
