pub mod aggregation;
pub mod config;
pub mod conversion;
pub mod error;
pub mod stats;
pub mod types;

#[cfg(feature = "intensity")]
pub mod intensity;

#[cfg(feature = "trend")]
pub mod trend;

#[cfg(feature = "seasonal")]
pub mod seasonal;

#[cfg(feature = "correlation")]
pub mod correlation;

#[cfg(feature = "forecast")]
pub mod forecast;

#[cfg(feature = "benchmark")]
pub mod benchmark;

#[cfg(feature = "quality")]
pub mod quality;

#[cfg(feature = "analysis")]
pub mod analysis;

pub use config::AnalyticsConfig;
pub use error::EsgAnalyticsError;
pub use types::*;

/// Standard result type for all esg-analytics operations
pub type EsgAnalyticsResult<T> = Result<T, EsgAnalyticsError>;
