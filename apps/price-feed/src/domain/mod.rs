//! Domain layer - core price feed types with no external I/O.

pub mod snapshot;
pub mod symbol;
