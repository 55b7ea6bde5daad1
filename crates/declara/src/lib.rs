pub mod config;
pub mod error;
pub mod filing;
pub mod telemetry;
