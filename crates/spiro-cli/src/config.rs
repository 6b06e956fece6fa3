use anyhow::{Context, Result};
use log::info;
use spiro_lib::SpiroConfig;
use std::{fs, path::Path};

/// Flag-level overrides applied on top of a config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub gain: Option<f64>,
    pub baseline: Option<f64>,
    pub interval_s: Option<f64>,
    pub exhale_negative: bool,
    pub resample: bool,
    pub source_rate_hz: Option<f64>,
    pub target_rate_hz: Option<f64>,
}

pub fn read_config(path: &Path) -> Result<SpiroConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: SpiroConfig =
        toml::from_str(&contents).with_context(|| format!("parsing config {}", path.display()))?;
    info!("loaded pipeline config from {}", path.display());
    Ok(cfg)
}

pub fn resolve(path: Option<&Path>, overrides: &Overrides) -> Result<SpiroConfig> {
    let mut cfg = match path {
        Some(path) => read_config(path)?,
        None => SpiroConfig::default(),
    };
    if let Some(gain) = overrides.gain {
        cfg.calibration.gain = gain;
    }
    if let Some(baseline) = overrides.baseline {
        cfg.calibration.baseline_voltage = baseline;
    }
    if let Some(dt) = overrides.interval_s {
        cfg.sampling_interval_s = dt;
    }
    if overrides.exhale_negative {
        cfg.exhale_positive = false;
    }
    let wants_resample = overrides.resample
        || overrides.source_rate_hz.is_some()
        || overrides.target_rate_hz.is_some();
    if wants_resample {
        let mut rs = cfg.resample.unwrap_or_default();
        if let Some(source) = overrides.source_rate_hz {
            rs.source_rate_hz = source;
        }
        if let Some(target) = overrides.target_rate_hz {
            rs.target_rate_hz = target;
        }
        cfg.resample = Some(rs);
    }
    cfg.validate()?;
    Ok(cfg)
}
