// Domain layer: core models and ports (interfaces). No HTTP or filesystem
// dependencies here; adapters implement the ports.

pub mod model;
pub mod ports;
