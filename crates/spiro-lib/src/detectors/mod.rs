pub mod onset;

pub use onset::{detect_onset, first_sustained_run, OnsetConfig};
