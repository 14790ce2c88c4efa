use crate::entity::EntityId;
use serde::Serialize;

/// Notifications that trigger a new render pass.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    StateChanged,
    ConfigReload,
}

/// Produced when an interactive node is activated; the host decides what a
/// details view looks like.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "entity", rename_all = "kebab-case")]
pub enum InteractionEvent {
    MoreInfo(EntityId),
}

impl InteractionEvent {
    pub fn entity(&self) -> &EntityId {
        match self {
            Self::MoreInfo(id) => id,
        }
    }
}
