use crate::{error::SpiroError, metrics::spirometry::MetricSet};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const CM_PER_INCH: f64 = 2.54;
const KG_PER_LB: f64 = 0.453;
/// Age assumed when the subject profile does not carry one.
pub const DEFAULT_AGE_YEARS: u32 = 35;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    /// Model encoding: 0 for female, 1 for male.
    pub fn code(self) -> u8 {
        match self {
            Sex::Female => 0,
            Sex::Male => 1,
        }
    }
}

impl FromStr for Sex {
    type Err = SpiroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "m" | "male" | "1" => Ok(Sex::Male),
            "f" | "female" | "0" => Ok(Sex::Female),
            _ => Err(SpiroError::InvalidSex(s.to_string())),
        }
    }
}

/// Anthropometrics in the units the capture apps collect them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectProfile {
    pub height_in: f64,
    pub weight_lbs: f64,
    pub sex: Sex,
    #[serde(default)]
    pub age: Option<u32>,
}

/// Flat feature row handed to downstream risk models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFeatures {
    pub fev1: f64,
    pub fvc: f64,
    pub pef: f64,
    pub fef25_75: f64,
    pub blow_duration: f64,
    pub age: u32,
    pub sex: u8,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub bmi: f64,
}

impl RiskFeatures {
    pub fn assemble(metrics: &MetricSet, subject: &SubjectProfile) -> Result<Self, SpiroError> {
        for (name, value) in [
            ("height_in", subject.height_in),
            ("weight_lbs", subject.weight_lbs),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SpiroError::InvalidMeasurement(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        let height_cm = subject.height_in * CM_PER_INCH;
        let weight_kg = subject.weight_lbs * KG_PER_LB;
        let height_m = height_cm / 100.0;
        Ok(Self {
            fev1: metrics.fev1,
            fvc: metrics.fvc,
            pef: metrics.pef,
            fef25_75: metrics.fef25_75,
            blow_duration: metrics.blow_duration,
            age: subject.age.unwrap_or(DEFAULT_AGE_YEARS),
            sex: subject.sex.code(),
            height_cm,
            weight_kg,
            bmi: weight_kg / (height_m * height_m),
        })
    }
}
