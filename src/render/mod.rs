use crate::layout::{CENTER, Point};
use crate::scene::viewport::Rect;
use crate::scene::{HUB_RADIUS, SATELLITE_RADIUS, Satellite, Scene, SummaryField, Viewport};
use cairo::Context;
use fs_err as fs;
use palette::Srgba;
use std::f64::consts::PI;
use std::path::Path;
use thiserror::Error;

pub mod theme;

pub use theme::ThemeColors;

const FONT_FACE: &str = "Sans";
const CONNECTOR_WIDTH: f64 = 0.4; // percent

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Cairo error: {0}")]
    Cairo(#[from] cairo::Error),
    #[error("PNG error: {0}")]
    Png(#[from] cairo::IoError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn set_color(cr: &Context, color: Srgba<f64>) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a);
}

/// Centers `text` on `at`, scaled to the diagram.
fn draw_text(
    cr: &Context,
    text: &str,
    at: Point,
    size: f64,
    color: Srgba<f64>,
) -> Result<(), cairo::Error> {
    set_color(cr, color);
    cr.select_font_face(FONT_FACE, cairo::FontSlant::Normal, cairo::FontWeight::Bold);
    cr.set_font_size(size);
    let ext = cr.text_extents(text)?;
    cr.move_to(
        at.x - ext.width() / 2.0 - ext.x_bearing(),
        at.y + ext.height() / 2.0,
    );
    cr.show_text(text)
}

fn fill_circle(
    cr: &Context,
    center: Point,
    radius: f64,
    color: Srgba<f64>,
) -> Result<(), cairo::Error> {
    set_color(cr, color);
    cr.arc(center.x, center.y, radius, 0.0, 2.0 * PI);
    cr.fill()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeState {
    Unresolved,
    Interactive,
    Idle,
}

impl NodeState {
    fn resolve(value: Option<f64>, interactive: bool) -> Self {
        if value.is_none() {
            Self::Unresolved
        } else if interactive {
            Self::Interactive
        } else {
            Self::Idle
        }
    }

    fn color(&self, idle: Srgba<f64>, colors: &ThemeColors) -> Srgba<f64> {
        match self {
            Self::Unresolved => colors.unresolved,
            Self::Interactive => colors.interactive,
            Self::Idle => idle,
        }
    }
}

struct SatelliteRenderer<'a> {
    satellite: &'a Satellite,
    viewport: &'a Viewport,
}

impl<'a> SatelliteRenderer<'a> {
    fn new(satellite: &'a Satellite, viewport: &'a Viewport) -> Self {
        Self {
            satellite,
            viewport,
        }
    }

    fn draw(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        let scale = self.viewport.scale();
        let center = self.viewport.to_device(self.satellite.placement.point());
        let state = NodeState::resolve(self.satellite.value, self.satellite.action.is_some());

        let color = state.color(colors.satellite, colors);
        fill_circle(cr, center, SATELLITE_RADIUS * scale, color)?;

        // label sits above the value inside the node
        let label_at = Point::new(center.x, center.y - 1.8 * scale);
        let value_at = Point::new(center.x, center.y + 2.0 * scale);
        draw_text(cr, &self.satellite.label, label_at, 2.2 * scale, colors.text)?;
        draw_text(cr, &self.satellite.text, value_at, 2.8 * scale, colors.text)
    }
}

fn draw_connectors(
    cr: &Context,
    scene: &Scene,
    viewport: &Viewport,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    if scene.connectors.is_empty() {
        return Ok(());
    }

    set_color(cr, colors.connector);
    cr.set_line_width(CONNECTOR_WIDTH * viewport.scale());
    for c in &scene.connectors {
        let from = viewport.to_device(Point::new(c.x1, c.y1));
        let to = viewport.to_device(Point::new(c.x2, c.y2));
        cr.move_to(from.x, from.y);
        cr.line_to(to.x, to.y);
    }
    cr.stroke()
}

fn draw_hub(
    cr: &Context,
    scene: &Scene,
    viewport: &Viewport,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    let scale = viewport.scale();
    let center = viewport.to_device(CENTER);
    let state = NodeState::resolve(scene.hub.value, scene.hub.action.is_some());

    fill_circle(cr, center, HUB_RADIUS * scale, state.color(colors.hub, colors))?;
    draw_text(cr, &scene.hub.text, center, 4.0 * scale, colors.text)
}

fn draw_field(
    cr: &Context,
    field: &SummaryField,
    rect: Rect,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    let size = rect.height * 0.22;
    let center = rect.center();
    let accent = colors.field(field.kind);

    draw_text(
        cr,
        &field.kind.to_string(),
        Point::new(center.x, center.y - size * 0.8),
        size * 0.8,
        accent,
    )?;
    let color = if field.value.is_some() {
        colors.text
    } else {
        colors.unresolved
    };
    let value_at = Point::new(center.x, center.y + size * 0.8);
    draw_text(cr, &field.text, value_at, size, color)
}

/// Paints `scene` onto `cr`, which covers the whole viewport.
pub fn paint(
    cr: &Context,
    scene: &Scene,
    viewport: &Viewport,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    set_color(cr, colors.background);
    cr.paint()?;

    for (i, field) in scene.fields.iter().enumerate() {
        draw_field(cr, field, viewport.field_rect(i, scene.fields.len()), colors)?;
    }

    draw_connectors(cr, scene, viewport, colors)?;
    draw_hub(cr, scene, viewport, colors)?;

    for satellite in &scene.satellites {
        SatelliteRenderer::new(satellite, viewport).draw(cr, colors)?;
    }
    Ok(())
}

pub fn render_png(
    scene: &Scene,
    width: i32,
    height: i32,
    colors: &ThemeColors,
    output: &Path,
) -> Result<(), RenderError> {
    let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, width, height)?;
    {
        let cr = Context::new(&surface)?;
        let viewport = Viewport::for_scene(scene, width as f64, height as f64);
        paint(&cr, scene, &viewport, colors)?;
    }

    let mut file = fs::File::create(output)?;
    surface.write_to_png(&mut file)?;
    log::info!("Wrote {}x{} scene to {}", width, height, output.display());
    Ok(())
}
