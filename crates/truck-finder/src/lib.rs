//! Read-only search proxy over the San Francisco mobile food facility permit dataset.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod trucks;
