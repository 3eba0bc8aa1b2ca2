pub mod direction;
pub mod growth;
pub mod smoothing;
