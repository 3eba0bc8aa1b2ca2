pub mod units;

#[cfg(feature = "cement")]
pub mod cement;
