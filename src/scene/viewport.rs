use super::{HUB_RADIUS, SATELLITE_RADIUS, Scene};
use crate::events::InteractionEvent;
use crate::layout::Point;

pub const HEADER_FRACTION: f64 = 0.18;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn contains(&self, p: Point) -> bool {
        (self.x..=self.x + self.width).contains(&p.x)
            && (self.y..=self.y + self.height).contains(&p.y)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Maps the percent space of a [`Scene`] onto a device surface: a header band
/// for the summary fields on top and a centered square diagram below it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub header: Rect,
    pub diagram: Rect,
}

impl Viewport {
    pub fn new(width: f64, height: f64, has_fields: bool) -> Self {
        let header_height = if has_fields { height * HEADER_FRACTION } else { 0.0 };
        let side = width.min(height - header_height).max(0.0);

        Self {
            header: Rect {
                x: 0.0,
                y: 0.0,
                width,
                height: header_height,
            },
            diagram: Rect {
                x: (width - side) / 2.0,
                y: header_height,
                width: side,
                height: side,
            },
        }
    }

    pub fn for_scene(scene: &Scene, width: f64, height: f64) -> Self {
        Self::new(width, height, !scene.fields.is_empty())
    }

    /// Device units per percent.
    pub fn scale(&self) -> f64 {
        self.diagram.width / 100.0
    }

    pub fn to_device(&self, p: Point) -> Point {
        Point::new(
            self.diagram.x + p.x * self.scale(),
            self.diagram.y + p.y * self.scale(),
        )
    }

    /// Slot `index` of `count` equal-width slots across the header band.
    pub fn field_rect(&self, index: usize, count: usize) -> Rect {
        let width = self.header.width / count.max(1) as f64;
        Rect {
            x: self.header.x + index as f64 * width,
            y: self.header.y,
            width,
            height: self.header.height,
        }
    }

    /// The action of the interactive node under `device`, if any. Inert nodes
    /// never match.
    pub fn hit<'a>(&self, scene: &'a Scene, device: Point) -> Option<&'a InteractionEvent> {
        if self.header.contains(device) && self.header.height > 0.0 {
            let count = scene.fields.len();
            return scene
                .fields
                .iter()
                .enumerate()
                .find(|(i, _)| self.field_rect(*i, count).contains(device))
                .and_then(|(_, f)| f.action.as_ref());
        }

        let scale = self.scale();
        if scale <= 0.0 {
            return None;
        }
        let within = |center: Point, radius: f64| {
            self.to_device(center).distance(device) <= radius * scale
        };

        scene
            .satellites
            .iter()
            .rev()
            .find(|s| within(s.placement.point(), SATELLITE_RADIUS))
            .and_then(|s| s.action.as_ref())
            .or_else(|| {
                within(crate::layout::CENTER, HUB_RADIUS)
                    .then_some(scene.hub.action.as_ref())
                    .flatten()
            })
    }
}
