use super::{CENTER, Placement};
use serde::Serialize;

/// Line segment from the hub to a satellite, in percent space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Connector {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

pub fn connect(placement: &Placement) -> Connector {
    Connector {
        x1: CENTER.x,
        y1: CENTER.y,
        x2: placement.x,
        y2: placement.y,
    }
}
