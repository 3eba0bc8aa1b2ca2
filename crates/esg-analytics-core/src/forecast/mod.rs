pub mod ensemble;
pub mod methods;
