use crate::signal::{nan_max, signed_flow};
use serde::{Deserialize, Serialize};

/// Parameters for locating the start of a forced exhalation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnsetConfig {
    /// Threshold as a fraction of peak signed flow.
    pub frac_of_peak: f64,
    /// Number of consecutive samples that must sit at or above the threshold.
    pub min_consecutive: usize,
}

impl Default for OnsetConfig {
    fn default() -> Self {
        Self {
            frac_of_peak: 0.05,
            min_consecutive: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Below,
    Counting { start: usize, len: usize },
    Confirmed { start: usize },
}

/// Start index of the first run of `min_consecutive` samples satisfying `pred`.
///
/// Returns `None` if the sequence is shorter than the run or no run exists.
pub fn first_sustained_run<I>(samples: I, min_consecutive: usize) -> Option<usize>
where
    I: IntoIterator<Item = bool>,
{
    let need = min_consecutive.max(1);
    let mut state = RunState::Below;
    for (i, hit) in samples.into_iter().enumerate() {
        state = match (state, hit) {
            (RunState::Below, true) => RunState::Counting { start: i, len: 1 },
            (RunState::Counting { start, len }, true) => RunState::Counting {
                start,
                len: len + 1,
            },
            (_, false) => RunState::Below,
            (confirmed @ RunState::Confirmed { .. }, true) => confirmed,
        };
        if let RunState::Counting { start, len } = state {
            if len >= need {
                state = RunState::Confirmed { start };
            }
        }
        if let RunState::Confirmed { start } = state {
            return Some(start);
        }
    }
    None
}

/// Index of the first sustained crossing of `frac_of_peak * peak` in signed flow.
///
/// Falls back to 0 when the capture is shorter than `min_consecutive` or the
/// threshold is never held for long enough.
pub fn detect_onset(flow: &[f64], exhale_positive: bool, cfg: &OnsetConfig) -> usize {
    let s = signed_flow(flow, exhale_positive);
    if s.len() < cfg.min_consecutive {
        return 0;
    }
    let Some(peak) = nan_max(&s) else {
        return 0;
    };
    let threshold = cfg.frac_of_peak * peak;
    first_sustained_run(s.iter().map(|&v| v >= threshold), cfg.min_consecutive).unwrap_or(0)
}
