// Domain layer: core models, request payloads and ports (interfaces).

pub mod model;
pub mod payload;
pub mod ports;
