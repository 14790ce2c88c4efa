use serde::Serialize;
use std::f64::consts::PI;

pub mod connector;

pub use connector::{Connector, connect};

pub const CENTER: Point = Point::new(50.0, 50.0);
pub const START_OFFSET: f64 = -PI / 2.0; // 12 o'clock
pub const DEFAULT_MIN_RADIUS: f64 = 20.0;
pub const DEFAULT_MAX_RADIUS: f64 = 45.0;
pub const LOG_GROWTH: f64 = 12.0; // radius gained per decade of satellites
pub const CROWD_THRESHOLD: usize = 8;
pub const CROWD_GROWTH: f64 = 0.6; // extra radius per satellite past the threshold

/// A position in the 100x100 percent space the diagram is laid out in.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutParameters {
    pub min_radius: f64,
    pub max_radius: f64,
}

impl Default for LayoutParameters {
    fn default() -> Self {
        Self {
            min_radius: DEFAULT_MIN_RADIUS,
            max_radius: DEFAULT_MAX_RADIUS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub index: usize,
    pub angle: f64,
    pub x: f64,
    pub y: f64,
}

impl Placement {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RadialLayout {
    pub radius: f64,
    pub placements: Vec<Placement>,
}

/// Shared orbit radius for `count` satellites. Grows logarithmically, gets a
/// small linear bonus past [`CROWD_THRESHOLD`] and never exceeds `max_radius`.
pub fn radius_for(count: usize, params: &LayoutParameters) -> f64 {
    let count = count as f64;
    let log_growth = count.max(1.0).log10() * LOG_GROWTH;
    let crowd_growth = ((count - CROWD_THRESHOLD as f64) * CROWD_GROWTH).max(0.0);

    (params.min_radius + log_growth + crowd_growth).min(params.max_radius)
}

/// Caller guarantees `count > 0`.
pub fn angle_for(index: usize, count: usize) -> f64 {
    START_OFFSET + (2.0 * PI * index as f64) / count as f64
}

pub fn angle_difference(a: f64, b: f64) -> f64 {
    // shortest way around the circle
    ((a - b + PI).rem_euclid(2.0 * PI) - PI).abs()
}

pub fn place(index: usize, count: usize, radius: f64) -> Placement {
    let angle = angle_for(index, count);
    Placement {
        index,
        angle,
        x: CENTER.x + radius * angle.cos(),
        y: CENTER.y + radius * angle.sin(),
    }
}

/// Places `count` satellites clockwise from the top of the circle.
pub fn layout(count: usize, params: &LayoutParameters) -> RadialLayout {
    if count == 0 {
        return RadialLayout::default();
    }

    let radius = radius_for(count, params);
    let placements = (0..count).map(|i| place(i, count, radius)).collect();

    RadialLayout { radius, placements }
}
