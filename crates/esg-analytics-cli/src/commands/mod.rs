pub mod aggregation;
pub mod analysis;
pub mod benchmark;
pub mod cement;
pub mod correlation;
pub mod forecast;
pub mod intensity;
pub mod quality;
pub mod seasonal;
pub mod trend;

use serde::Deserialize;

use esg_analytics_core::quality::integrity::checked_series;
use esg_analytics_core::{EsgAnalyticsResult, Observation, SeriesPoint};

/// Input document of the single-series commands.
#[derive(Debug, Deserialize)]
pub struct SeriesRequest {
    pub observations: Vec<Observation>,
}

impl SeriesRequest {
    /// Chronological series. A missing value or a bad month is an error
    /// naming the first offending observation.
    pub fn series(&self) -> EsgAnalyticsResult<Vec<SeriesPoint>> {
        checked_series(&self.observations)
    }
}
