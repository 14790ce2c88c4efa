use crate::config::{CardConfig, SummaryKind};
use crate::entity::{self, EntityId, EntityRef};
use crate::events::InteractionEvent;
use crate::format::format_reading;
use crate::layout::{self, Connector, Placement};
use crate::state::StateSource;
use serde::Serialize;
use strum::IntoEnumIterator;

pub mod viewport;

pub use viewport::Viewport;

pub const HUB_RADIUS: f64 = 12.0;
pub const SATELLITE_RADIUS: f64 = 7.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hub {
    pub entity: Option<EntityId>,
    pub value: Option<f64>,
    pub text: String,
    pub action: Option<InteractionEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryField {
    pub kind: SummaryKind,
    pub entity: EntityId,
    pub value: Option<f64>,
    pub text: String,
    pub action: Option<InteractionEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Satellite {
    pub entity: EntityId,
    pub label: String,
    pub value: Option<f64>,
    pub text: String,
    pub placement: Placement,
    pub action: Option<InteractionEvent>,
}

/// Everything the host paints for one render pass. Coordinates are percent
/// of the diagram area with the hub at (50, 50).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub hub: Hub,
    pub fields: Vec<SummaryField>,
    pub radius: f64,
    pub satellites: Vec<Satellite>,
    pub connectors: Vec<Connector>,
}

struct Composer<'a, S: StateSource> {
    config: &'a CardConfig,
    states: &'a S,
}

impl<'a, S: StateSource> Composer<'a, S> {
    fn action(&self, id: &EntityId) -> Option<InteractionEvent> {
        (self.config.clickable_entities && !id.is_empty())
            .then(|| InteractionEvent::MoreInfo(id.clone()))
    }

    fn hub(&self) -> Hub {
        let entity = self.config.entities.entity(SummaryKind::Home).cloned();
        let reading = entity
            .as_ref()
            .map(|id| self.states.reading(id))
            .unwrap_or_default();

        Hub {
            action: entity.as_ref().and_then(|id| self.action(id)),
            entity,
            value: reading.value(),
            text: format_reading(reading),
        }
    }

    fn fields(&self) -> Vec<SummaryField> {
        SummaryKind::iter()
            .filter(|&kind| self.config.entities.shows(kind))
            .filter_map(|kind| {
                let id = self.config.entities.entity(kind)?;
                let reading = self.states.reading(id);
                Some(SummaryField {
                    kind,
                    entity: id.clone(),
                    value: reading.value(),
                    text: format_reading(reading),
                    action: self.action(id),
                })
            })
            .collect()
    }

    fn satellite(&self, entity: EntityRef, placement: Placement) -> Satellite {
        let reading = self.states.reading(&entity.id);
        Satellite {
            label: entity.label(),
            value: reading.value(),
            text: format_reading(reading),
            placement,
            action: self.action(&entity.id),
            entity: entity.id,
        }
    }

    fn compose(&self) -> Scene {
        let entities = entity::normalize(&self.config.entities.individual);
        let radial = layout::layout(entities.len(), &self.config.layout_parameters());

        let connectors = radial.placements.iter().map(layout::connect).collect();
        let satellites = entities
            .into_iter()
            .zip(radial.placements)
            .map(|(entity, placement)| self.satellite(entity, placement))
            .collect();

        Scene {
            hub: self.hub(),
            fields: self.fields(),
            radius: radial.radius,
            satellites,
            connectors,
        }
    }
}

/// Builds the scene for one render pass from the configuration and a
/// snapshot of the current readings.
pub fn compose<S: StateSource>(config: &CardConfig, states: &S) -> Scene {
    let scene = Composer { config, states }.compose();
    log::debug!(
        "Composed scene: {} fields, {} satellites, radius {:.2}",
        scene.fields.len(),
        scene.satellites.len(),
        scene.radius
    );
    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EntitiesConfig, HomeConfig, SourceConfig};
    use crate::entity::IndividualEntry;
    use crate::format::PLACEHOLDER;
    use crate::layout::angle_difference;
    use crate::state::StateSnapshot;
    use std::f64::consts::PI;

    fn home_only(home: &str) -> EntitiesConfig {
        EntitiesConfig {
            home: HomeConfig {
                entity: Some(EntityId::new(home)),
                hide: false,
            },
            ..Default::default()
        }
    }

    fn individual(count: usize) -> Vec<IndividualEntry> {
        (0..count)
            .map(|i| IndividualEntry::Bare(EntityId::new(format!("sensor.load_{i}"))))
            .collect()
    }

    #[test]
    fn test_empty_individual_list() {
        let config = CardConfig::new(home_only("sensor.home"));
        let states: StateSnapshot = [("sensor.home", 482.7)].into_iter().collect();

        let scene = compose(&config, &states);

        assert!(scene.satellites.is_empty());
        assert!(scene.connectors.is_empty());
        assert_eq!(scene.hub.text, "483 W");
        assert_eq!(scene.hub.value, Some(482.7));
        assert_eq!(scene.fields.len(), 1);
        assert_eq!(scene.fields[0].kind, SummaryKind::Home);
    }

    #[test]
    fn test_twelve_satellites() {
        let mut entities = home_only("sensor.home");
        entities.individual = individual(12);
        let config = CardConfig::new(entities);

        let scene = compose(&config, &StateSnapshot::default());

        assert_eq!(scene.satellites.len(), 12);
        assert_eq!(scene.connectors.len(), 12);
        assert!(scene.radius <= config.individual_max_radius);

        let step = PI / 6.0;
        for (i, sat) in scene.satellites.iter().enumerate() {
            let next = &scene.satellites[(i + 1) % 12];
            assert!(angle_difference(sat.placement.angle + step, next.placement.angle) < 1e-9);
            assert_eq!(sat.placement.index, i);
            assert_eq!(
                (scene.connectors[i].x2, scene.connectors[i].y2),
                (sat.placement.x, sat.placement.y)
            );
        }
    }

    #[test]
    fn test_resolution_gaps_show_placeholder() {
        let mut entities = home_only("sensor.home");
        entities.individual = vec![IndividualEntry::Labeled {
            entity: None,
            name: None,
        }];
        let states: StateSnapshot = [("sensor.home", "unavailable")].into_iter().collect();

        let scene = compose(&CardConfig::new(entities), &states);

        assert_eq!(scene.hub.text, PLACEHOLDER);
        assert_eq!(scene.hub.value, None);
        assert_eq!(scene.satellites[0].text, PLACEHOLDER);
        assert_eq!(scene.satellites[0].label, PLACEHOLDER);
    }

    #[test]
    fn test_hub_without_home_entity() {
        let entities = EntitiesConfig {
            grid: SourceConfig {
                entity: Some(EntityId::new("sensor.grid")),
            },
            ..Default::default()
        };
        let mut config = CardConfig::new(entities);
        config.clickable_entities = true;

        let scene = compose(&config, &StateSnapshot::default());

        assert_eq!(scene.hub.entity, None);
        assert_eq!(scene.hub.text, PLACEHOLDER);
        assert_eq!(scene.hub.action, None);
        assert_eq!(
            scene.fields[0].action,
            Some(InteractionEvent::MoreInfo(EntityId::new("sensor.grid")))
        );
    }

    #[test]
    fn test_field_visibility_and_order() {
        let entities = EntitiesConfig {
            grid: SourceConfig {
                entity: Some(EntityId::new("sensor.grid")),
            },
            battery: SourceConfig {
                entity: Some(EntityId::new("sensor.battery")),
            },
            home: HomeConfig {
                entity: Some(EntityId::new("sensor.home")),
                hide: true,
            },
            ..Default::default()
        };
        let states: StateSnapshot = [("sensor.home", 100.0), ("sensor.battery", -250.4)]
            .into_iter()
            .collect();

        let scene = compose(&CardConfig::new(entities), &states);
        let kinds: Vec<_> = scene.fields.iter().map(|f| f.kind).collect();

        assert_eq!(kinds, vec![SummaryKind::Grid, SummaryKind::Battery]);
        assert_eq!(scene.fields[1].text, "-250 W");
        // hidden field, hub still shows home
        assert_eq!(scene.hub.text, "100 W");
    }

    #[test]
    fn test_actions_follow_clickable_flag() {
        let mut entities = home_only("sensor.home");
        entities.individual = vec![
            IndividualEntry::Bare(EntityId::new("sensor.kitchen_light")),
            IndividualEntry::Labeled {
                entity: Some(EntityId::new("sensor.ev")),
                name: Some("Car".to_string()),
            },
        ];
        let mut config = CardConfig::new(entities);

        let inert = compose(&config, &StateSnapshot::default());
        assert!(inert.satellites.iter().all(|s| s.action.is_none()));
        assert!(inert.hub.action.is_none());

        config.clickable_entities = true;
        let scene = compose(&config, &StateSnapshot::default());

        assert_eq!(scene.satellites[0].label, "kitchen light");
        assert_eq!(scene.satellites[1].label, "Car");
        assert_eq!(
            scene.satellites[1].action,
            Some(InteractionEvent::MoreInfo(EntityId::new("sensor.ev")))
        );
        assert_eq!(
            scene.hub.action,
            Some(InteractionEvent::MoreInfo(EntityId::new("sensor.home")))
        );
    }

    #[test]
    fn test_compose_is_repeatable() {
        let mut entities = home_only("sensor.home");
        entities.individual = individual(7);
        let config = CardConfig::new(entities);
        let states: StateSnapshot = [("sensor.load_3", 12.0)].into_iter().collect();

        assert_eq!(compose(&config, &states), compose(&config, &states));
    }
}
