pub mod macros;

pub mod config;
pub mod dashboard;
pub mod entity;
pub mod events;
pub mod format;
pub mod layout;
pub mod scene;
pub mod state;
pub mod sys;

#[cfg(feature = "render")]
pub mod render;

#[cfg(feature = "gui")]
pub mod gui;
