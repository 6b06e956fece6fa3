pub mod coarse;
pub mod spirometry;
pub mod volume;

pub use coarse::{coarse_summary, CoarseSummary};
pub use spirometry::{
    blow_duration, fef25_75, fev1, fvc, pef, BlowDuration, EndConfig, MetricSet,
};
pub use volume::integrate;
