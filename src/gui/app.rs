use crate::dashboard::Dashboard;
use crate::events::{AppEvent, InteractionEvent};
use crate::layout::Point;
use crate::render::{self, ThemeColors};
use crate::scene::Viewport;
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

pub struct AppModel {
    pub dashboard: Rc<RefCell<Dashboard>>,
    pub drawing_area: gtk::DrawingArea,
}

#[derive(Debug)]
pub enum AppMsg {
    StateChanged,
    ConfigReload,
    Click(Point),
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::StateChanged => AppMsg::StateChanged,
            AppEvent::ConfigReload => AppMsg::ConfigReload,
        }
    }
}

/// Hands an activated node over to whoever runs us, one JSON line per event.
fn emit(event: &InteractionEvent) {
    log::info!("More info requested for {}", event.entity());
    match serde_json::to_string(event) {
        Ok(line) => println!("{}", line),
        Err(e) => log::error!("Failed to serialize interaction event: {}", e),
    }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = (Dashboard, async_channel::Receiver<AppEvent>);
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        gtk::ApplicationWindow {
            set_title: Some("Power Halo"),
            set_default_width: 480,
            set_default_height: 600,

            add_controller = gtk::EventControllerKey {
                connect_key_pressed => move |_, key, _, _| {
                    if key == gtk::gdk::Key::Escape {
                        relm4::main_application().quit();
                        return glib::Propagation::Stop;
                    }
                    glib::Propagation::Proceed
                }
            },

            #[name = "drawing_area"]
            gtk::DrawingArea {
                set_hexpand: true,
                set_vexpand: true,

                add_controller = gtk::GestureClick {
                    set_button: 1,
                    connect_released[sender] => move |_, _, x, y| {
                        sender.input(AppMsg::Click(Point::new(x, y)));
                    }
                }
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (dashboard, rx) = init;

        let model = AppModel {
            dashboard: Rc::new(RefCell::new(dashboard)),
            drawing_area: gtk::DrawingArea::default(),
        };

        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();

        let dashboard_draw = model.dashboard.clone();
        widgets
            .drawing_area
            .set_draw_func(move |drawing_area, cr, width, height| {
                #[allow(deprecated)]
                let colors = ThemeColors::from_context(&drawing_area.style_context());
                let dashboard = dashboard_draw.borrow();
                let viewport = Viewport::for_scene(&dashboard.scene, width as f64, height as f64);
                if let Err(e) = render::paint(cr, &dashboard.scene, &viewport, &colors) {
                    log::error!("Drawing error: {}", e);
                }
            });

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, _sender: ComponentSender<Self>) {
        match msg {
            AppMsg::StateChanged => {
                self.dashboard.borrow_mut().recompose();
                self.drawing_area.queue_draw();
            }
            AppMsg::ConfigReload => match self.dashboard.borrow_mut().reload_config() {
                Ok(()) => {
                    self.drawing_area.queue_draw();
                    log::info!("Configuration reloaded");
                }
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
            AppMsg::Click(point) => {
                let dashboard = self.dashboard.borrow();
                let viewport = Viewport::for_scene(
                    &dashboard.scene,
                    self.drawing_area.width() as f64,
                    self.drawing_area.height() as f64,
                );
                if let Some(event) = viewport.hit(&dashboard.scene, point) {
                    emit(event);
                }
            }
        }
    }
}
