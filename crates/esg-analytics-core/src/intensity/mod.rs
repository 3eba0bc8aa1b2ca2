pub mod metrics;
pub mod ratios;
