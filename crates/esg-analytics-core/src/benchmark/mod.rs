pub mod position;
pub mod targets;
