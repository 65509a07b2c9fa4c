//! Domain layer: pure models, ports, and errors. No I/O.

pub mod errors;
pub mod models;
pub mod ports;
