pub mod accounts;
pub mod config;
pub mod state;
pub mod telemetry;
