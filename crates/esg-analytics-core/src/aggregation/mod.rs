pub mod breakdown;
pub mod period;
