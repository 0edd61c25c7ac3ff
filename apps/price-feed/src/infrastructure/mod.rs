//! Infrastructure layer - venue adapters and external integrations.

pub mod config;
pub mod reconnect;
pub mod rest;
pub mod stream;
pub mod telemetry;
