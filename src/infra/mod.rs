pub mod clients;
pub mod config;
pub mod email;
pub mod imgbb;
pub mod telemetry;
