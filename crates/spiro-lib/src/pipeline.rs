use crate::{
    detectors::onset::OnsetConfig,
    error::SpiroError,
    metrics::{
        coarse::{coarse_summary, CoarseSummary},
        spirometry::{blow_duration, fef25_75, fev1, fvc, pef, EndConfig, MetricSet},
        volume::integrate,
    },
    resample::ResampleConfig,
    signal::{time_axis, to_flow, Calibration},
};
use log::debug;
use serde::{Deserialize, Serialize};

/// Allowed drift between `1 / sampling_interval_s` and the resample source rate.
const RATE_TOLERANCE: f64 = 1e-6;

/// Every tunable of the capture → metrics pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpiroConfig {
    pub calibration: Calibration,
    /// Seconds between samples of the raw capture.
    pub sampling_interval_s: f64,
    /// Whether exhalation produces positive flow.
    pub exhale_positive: bool,
    pub onset: OnsetConfig,
    pub end: EndConfig,
    /// When set, also compute the downsampled summary.
    pub resample: Option<ResampleConfig>,
}

impl Default for SpiroConfig {
    fn default() -> Self {
        Self {
            calibration: Calibration::default(),
            sampling_interval_s: 0.005,
            exhale_positive: true,
            onset: OnsetConfig::default(),
            end: EndConfig::default(),
            resample: None,
        }
    }
}

impl SpiroConfig {
    pub fn validate(&self) -> Result<(), SpiroError> {
        let dt = self.sampling_interval_s;
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SpiroError::InvalidSamplingInterval(dt));
        }
        if self.onset.min_consecutive == 0 {
            return Err(SpiroError::EmptyWindow("onset"));
        }
        if self.end.min_consecutive == 0 {
            return Err(SpiroError::EmptyWindow("end-of-blow"));
        }
        if let Some(resample) = &self.resample {
            resample.factor()?;
            if (resample.source_rate_hz * dt - 1.0).abs() > RATE_TOLERANCE {
                return Err(SpiroError::RateMismatch {
                    source_rate: resample.source_rate_hz,
                    interval_s: dt,
                });
            }
        }
        Ok(())
    }
}

/// Metrics plus the bookkeeping needed to interpret them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpirometryReport {
    pub sample_count: usize,
    pub onset_index: usize,
    pub metrics: MetricSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coarse: Option<CoarseSummary>,
}

/// Raw voltages → [`MetricSet`].
pub fn summary_statistics(voltages: &[f64], cfg: &SpiroConfig) -> Result<MetricSet, SpiroError> {
    analyze(voltages, cfg).map(|report| report.metrics)
}

/// Run conversion, onset detection, integration and metric extraction, plus
/// the downsampled summary when `cfg.resample` is set.
pub fn analyze(voltages: &[f64], cfg: &SpiroConfig) -> Result<SpirometryReport, SpiroError> {
    cfg.validate()?;
    let flow = to_flow(voltages, &cfg.calibration)?;
    let dt = cfg.sampling_interval_s;
    let sign = cfg.exhale_positive;

    let (volume, onset) = integrate(&flow, dt, None, sign, &cfg.onset);
    let time = time_axis(dt, flow.len());

    let fvc = fvc(&volume);
    let blow = blow_duration(&flow, &time, onset, sign, &cfg.end);
    debug!(
        "capture of {} samples: onset {} end {}",
        flow.len(),
        onset,
        blow.end_index
    );
    let metrics = MetricSet {
        fev1: fev1(&volume, &time, onset),
        fvc,
        pef: pef(&flow, sign),
        fef25_75: fef25_75(&flow, &volume, fvc, onset, sign),
        blow_duration: blow.seconds,
        end_index: blow.end_index,
    };

    let coarse = cfg
        .resample
        .as_ref()
        .map(|rs| coarse_summary(&flow, sign, rs))
        .transpose()?;

    Ok(SpirometryReport {
        sample_count: flow.len(),
        onset_index: onset,
        metrics,
        coarse,
    })
}
