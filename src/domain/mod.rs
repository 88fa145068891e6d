// Domain layer: payload storage models and ports (interfaces).

pub mod model;
pub mod ports;
