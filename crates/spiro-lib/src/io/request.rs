use crate::features::{Sex, SubjectProfile};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Capture upload as sent by the mobile and desktop recorders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureRequest {
    pub height_in: f64,
    pub weight_lbs: f64,
    pub sex: String,
    #[serde(default)]
    pub age: Option<u32>,
    pub breath_data: Vec<f64>,
}

impl CaptureRequest {
    pub fn subject(&self) -> Result<SubjectProfile> {
        let sex: Sex = self.sex.parse()?;
        Ok(SubjectProfile {
            height_in: self.height_in,
            weight_lbs: self.weight_lbs,
            sex,
            age: self.age,
        })
    }
}

pub fn parse_capture_request(json: &str) -> Result<CaptureRequest> {
    serde_json::from_str(json).context("parsing capture request")
}

pub fn read_capture_request(path: &Path) -> Result<CaptureRequest> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_capture_request(&text).with_context(|| format!("in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_recorder_payload() {
        let json = r#"{"height_in": 65.0, "weight_lbs": 140, "sex": "Female",
                       "breath_data": [0.0, 0.5, 1.0]}"#;
        let req = parse_capture_request(json).unwrap();
        assert_eq!(req.breath_data.len(), 3);
        let subject = req.subject().unwrap();
        assert_eq!(subject.sex, Sex::Female);
        assert_eq!(subject.age, None);
    }

    #[test]
    fn unknown_sex_is_rejected() {
        let json = r#"{"height_in": 65, "weight_lbs": 140, "sex": "?", "breath_data": []}"#;
        let req = parse_capture_request(json).unwrap();
        assert!(req.subject().is_err());
    }

    #[test]
    fn missing_samples_fail_to_parse() {
        assert!(parse_capture_request(r#"{"height_in": 65}"#).is_err());
    }
}
