use crate::config::SummaryKind;
#[cfg(feature = "gui")]
use gtk4::prelude::*;
use palette::Srgba;

#[derive(Debug, Clone, PartialEq)]
pub struct ThemeColors {
    pub background: Srgba<f64>,
    pub text: Srgba<f64>,
    pub hub: Srgba<f64>,
    pub satellite: Srgba<f64>,
    pub interactive: Srgba<f64>,
    pub unresolved: Srgba<f64>,
    pub connector: Srgba<f64>,
    pub grid: Srgba<f64>,
    pub solar: Srgba<f64>,
    pub battery: Srgba<f64>,
    pub home: Srgba<f64>,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            background: Srgba::new(0.11, 0.11, 0.12, 1.0),
            text: Srgba::new(0.95, 0.95, 0.95, 1.0),
            hub: Srgba::new(0.2, 0.2, 0.2, 0.9),
            satellite: Srgba::new(0.15, 0.15, 0.15, 0.8),
            interactive: Srgba::new(0.4, 0.4, 0.8, 0.9),
            unresolved: Srgba::new(0.8, 0.2, 0.2, 0.5),
            connector: Srgba::new(0.6, 0.6, 0.6, 0.6),
            grid: Srgba::new(0.45, 0.55, 0.95, 1.0),
            solar: Srgba::new(1.0, 0.6, 0.0, 1.0),
            battery: Srgba::new(0.95, 0.3, 0.55, 1.0),
            home: Srgba::new(0.35, 0.75, 0.45, 1.0),
        }
    }
}

impl ThemeColors {
    pub fn field(&self, kind: SummaryKind) -> Srgba<f64> {
        match kind {
            SummaryKind::Grid => self.grid,
            SummaryKind::Solar => self.solar,
            SummaryKind::Battery => self.battery,
            SummaryKind::Home => self.home,
        }
    }
}

#[cfg(feature = "gui")]
impl ThemeColors {
    /// Picks up the GTK theme where it defines a matching named color.
    #[allow(deprecated)]
    pub fn from_context(context: &gtk4::StyleContext) -> Self {
        let fallback = Self::default();
        Self {
            background: Self::lookup_color(context, "theme_bg_color", fallback.background, None),
            text: Self::lookup_color(context, "theme_fg_color", fallback.text, None),
            hub: Self::lookup_color(context, "theme_fg_color", fallback.hub, Some(0.15)),
            satellite: Self::lookup_color(context, "theme_bg_color", fallback.satellite, Some(0.8)),
            interactive: Self::lookup_color(
                context,
                "theme_selected_bg_color",
                fallback.interactive,
                Some(0.9),
            ),
            unresolved: Self::lookup_color(
                context,
                "error_bg_color",
                fallback.unresolved,
                Some(0.5),
            ),
            connector: Self::lookup_color(context, "borders", fallback.connector, Some(0.6)),
            ..fallback
        }
    }

    #[allow(deprecated)]
    fn lookup_color(
        context: &gtk4::StyleContext,
        name: &str,
        fallback: Srgba<f64>,
        alpha_override: Option<f64>,
    ) -> Srgba<f64> {
        context
            .lookup_color(name)
            .map(|c| {
                let (r, g, b, a) = (
                    c.red() as f64,
                    c.green() as f64,
                    c.blue() as f64,
                    c.alpha() as f64,
                );
                Srgba::new(r, g, b, alpha_override.unwrap_or(a))
            })
            .unwrap_or(fallback)
    }
}
