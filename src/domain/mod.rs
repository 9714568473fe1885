// Domain layer: report model, ports and the pure rules around them.

pub mod model;
pub mod ports;
pub mod services;
