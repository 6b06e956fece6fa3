use rand::{rngs::StdRng, Rng, SeedableRng};

/// Shape of a synthetic forced exhalation.
#[derive(Debug, Clone, Copy)]
pub struct BlowProfile {
    pub samples: usize,
    pub interval_s: f64,
    /// Quiet lead-in before the blow starts (seconds).
    pub lead_in_s: f64,
    pub peak_flow: f64,
    /// Rise time to peak (seconds).
    pub rise_s: f64,
    /// Exponential decay constant after the peak (seconds).
    pub decay_s: f64,
    /// Uniform noise amplitude added to every sample.
    pub noise: f64,
    pub seed: u64,
}

/// Flow-shaped voltages for a blow with linear rise and exponential decay,
/// expressed through the inverse of `flow = gain * (v - baseline)`.
pub fn synthesize(profile: &BlowProfile, gain: f64, baseline: f64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(profile.seed);
    (0..profile.samples)
        .map(|i| {
            let t = i as f64 * profile.interval_s - profile.lead_in_s;
            let flow = if t < 0.0 {
                0.0
            } else if t < profile.rise_s {
                profile.peak_flow * t / profile.rise_s
            } else {
                profile.peak_flow * (-(t - profile.rise_s) / profile.decay_s).exp()
            };
            let noise = if profile.noise > 0.0 {
                rng.gen_range(-profile.noise..=profile.noise)
            } else {
                0.0
            };
            (flow + noise) / gain + baseline
        })
        .collect()
}
