//! Application layer - port definitions and the resolver session loop.

pub mod ports;
pub mod resolver;
