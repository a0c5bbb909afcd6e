// Domain layer: race-entry models and the ports the predictor talks through.

pub mod model;
pub mod ports;
