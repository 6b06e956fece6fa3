use crate::{
    detectors::onset::{detect_onset, OnsetConfig},
    signal::{signed_flow, time_axis},
};

/// Integrate flow into cumulative exhaled volume (L) starting at the onset.
///
/// Volume is 0 up to and including the onset sample, then accumulates
/// trapezoidal increments. A running-maximum pass keeps the curve
/// non-decreasing. Returns the volume and the onset index that was used.
pub fn integrate(
    flow: &[f64],
    interval: f64,
    onset: Option<usize>,
    exhale_positive: bool,
    onset_cfg: &OnsetConfig,
) -> (Vec<f64>, usize) {
    let time = time_axis(interval, flow.len());
    let onset = onset.unwrap_or_else(|| detect_onset(flow, exhale_positive, onset_cfg));
    let s = signed_flow(flow, exhale_positive);

    let mut volume = vec![0.0; s.len()];
    if onset + 1 >= s.len() {
        return (volume, onset);
    }

    let mut acc = 0.0;
    for i in onset..s.len() - 1 {
        acc += 0.5 * (s[i + 1] + s[i]) * (time[i + 1] - time[i]);
        volume[i + 1] = acc;
    }

    let mut running = f64::NEG_INFINITY;
    for v in volume.iter_mut() {
        running = running.max(*v);
        *v = running;
    }

    (volume, onset)
}
