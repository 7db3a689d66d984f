//! Domain layer - pure analysis types with no I/O dependencies.

pub mod analysis;
