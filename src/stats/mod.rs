//! Statistics over recorded latency samples.

pub mod phase_measurement;
pub mod robust_statistics;

pub use phase_measurement::PhaseMeasurement;
pub use robust_statistics::RobustStatistics;
