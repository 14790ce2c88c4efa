use crate::entity::{EntityId, IndividualEntry};
use crate::events::AppEvent;
use crate::layout::{DEFAULT_MAX_RADIUS, DEFAULT_MIN_RADIUS, LayoutParameters};
use async_channel::Sender;
use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use serde_with::DeserializeFromStr;
use std::path::{Path, PathBuf};
use strum::{Display as StrumDisplay, EnumIter, EnumString};
use thiserror::Error;

/// The fixed summary categories shown in the top row.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SummaryKind {
    Grid,
    Solar,
    Battery,
    Home,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SourceConfig {
    pub entity: Option<EntityId>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct HomeConfig {
    pub entity: Option<EntityId>,
    #[serde(default)]
    pub hide: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct EntitiesConfig {
    #[serde(default)]
    pub grid: SourceConfig,
    #[serde(default)]
    pub solar: SourceConfig,
    #[serde(default)]
    pub battery: SourceConfig,
    #[serde(default)]
    pub home: HomeConfig,
    #[serde(default)]
    pub individual: Vec<IndividualEntry>,
}

impl EntitiesConfig {
    pub fn entity(&self, kind: SummaryKind) -> Option<&EntityId> {
        match kind {
            SummaryKind::Grid => self.grid.entity.as_ref(),
            SummaryKind::Solar => self.solar.entity.as_ref(),
            SummaryKind::Battery => self.battery.entity.as_ref(),
            SummaryKind::Home => self.home.entity.as_ref(),
        }
        .filter(|id| !id.is_empty())
    }

    /// Whether the top-row field for `kind` is displayed.
    pub fn shows(&self, kind: SummaryKind) -> bool {
        self.entity(kind).is_some() && !(kind == SummaryKind::Home && self.home.hide)
    }
}

/// Configuration as written by the user; `entities` may be missing here.
#[derive(Debug, Clone, Deserialize)]
struct RawConfig {
    entities: Option<EntitiesConfig>,
    #[serde(default)]
    clickable_entities: bool,
    #[serde(default = "default_min_radius")]
    individual_min_radius: f64,
    #[serde(default = "default_max_radius")]
    individual_max_radius: f64,
}

fn default_min_radius() -> f64 {
    DEFAULT_MIN_RADIUS
}

fn default_max_radius() -> f64 {
    DEFAULT_MAX_RADIUS
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardConfig {
    pub entities: EntitiesConfig,
    pub clickable_entities: bool,
    pub individual_min_radius: f64,
    pub individual_max_radius: f64,
}

impl CardConfig {
    pub fn new(entities: EntitiesConfig) -> Self {
        Self {
            entities,
            clickable_entities: false,
            individual_min_radius: DEFAULT_MIN_RADIUS,
            individual_max_radius: DEFAULT_MAX_RADIUS,
        }
    }

    pub fn layout_parameters(&self) -> LayoutParameters {
        LayoutParameters {
            min_radius: self.individual_min_radius,
            max_radius: self.individual_max_radius,
        }
    }
}

impl TryFrom<RawConfig> for CardConfig {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let entities = raw.entities.ok_or(ConfigError::MissingEntities)?;
        let (min, max) = (raw.individual_min_radius, raw.individual_max_radius);

        if !(min.is_finite() && max.is_finite() && 0.0 <= min && min <= max) {
            return Err(ConfigError::InvalidRadius { min, max });
        }

        Ok(Self {
            entities,
            clickable_entities: raw.clickable_entities,
            individual_min_radius: min,
            individual_max_radius: max,
        })
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Invalid configuration: the `entities` section is required")]
    MissingEntities,
    #[error("Invalid radius range: min {min} and max {max} must satisfy 0 <= min <= max")]
    InvalidRadius { min: f64, max: f64 },
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs = ProjectDirs::from("org", "powerhalo", "powerhalo")
        .ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

/// `POWERHALO_<KEY>` variables override top-level keys of the file.
fn environment() -> config::Environment {
    config::Environment::with_prefix("POWERHALO").try_parsing(true)
}

fn finish(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    env: config::Environment,
) -> Result<CardConfig, ConfigError> {
    let s = builder.add_source(env).build()?;

    let raw: RawConfig = s.try_deserialize()?;
    CardConfig::try_from(raw)
}

/// Loads the file at `path`. A missing file is a missing `entities` section.
pub fn load_config(path: &Path) -> Result<CardConfig, ConfigError> {
    finish(
        config::Config::builder()
            .add_source(config::File::from(path.to_path_buf()).required(false)),
        environment(),
    )
}

pub fn load_config_str(toml: &str) -> Result<CardConfig, ConfigError> {
    finish(
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml)),
        environment(),
    )
}

pub fn write_default_config(path: &Path) -> std::io::Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(path, DEFAULT_CONFIG)?;
    }
    Ok(path.to_path_buf())
}

pub const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

fn is_config_change(event: &notify::Event, config_path: &Path) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| p == config_path)
}

/// Sends [`AppEvent::ConfigReload`] whenever the file at `config_path` changes.
pub async fn run_async_watcher(config_path: PathBuf, tx: Sender<AppEvent>) {
    let config_dir = match config_path.parent() {
        Some(p) => p.to_path_buf(),
        None => return,
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                if is_config_change(&event, &config_path)
                    && tx.send(AppEvent::ConfigReload).await.is_err()
                {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityRef;

    #[test]
    fn test_full_config() {
        let config = load_config_str(
            r#"
            clickable_entities = true
            individual_min_radius = 18
            individual_max_radius = 48.5

            [entities]
            grid = { entity = "sensor.grid" }
            home = { entity = "sensor.home", hide = true }
            individual = ["sensor.a", { entity = "sensor.b", name = "Batt" }]
            "#,
        )
        .unwrap();

        assert!(config.clickable_entities);
        assert_eq!(
            config.layout_parameters(),
            LayoutParameters {
                min_radius: 18.0,
                max_radius: 48.5
            }
        );
        assert_eq!(
            config.entities.entity(SummaryKind::Grid),
            Some(&EntityId::new("sensor.grid"))
        );
        assert!(config.entities.shows(SummaryKind::Grid));
        assert!(!config.entities.shows(SummaryKind::Solar));
        assert!(!config.entities.shows(SummaryKind::Home));
        assert_eq!(
            crate::entity::normalize(&config.entities.individual),
            vec![
                EntityRef::new("sensor.a", None),
                EntityRef::new("sensor.b", Some("Batt".to_string())),
            ]
        );
    }

    #[test]
    fn test_defaults() {
        let config = load_config_str("[entities]\ngrid = { entity = \"sensor.grid\" }\n").unwrap();

        assert!(!config.clickable_entities);
        assert_eq!(config.layout_parameters(), LayoutParameters::default());
        assert!(config.entities.individual.is_empty());
    }

    #[test]
    fn test_missing_entities() {
        let err = load_config_str("clickable_entities = true\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingEntities));
    }

    #[test]
    fn test_invalid_radius() {
        let err = load_config_str(
            r#"
            individual_min_radius = 40
            individual_max_radius = 30

            [entities]
            grid = { entity = "sensor.grid" }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRadius { .. }));
    }

    #[test]
    fn test_env_override() {
        let toml = r#"
            clickable_entities = false
            individual_max_radius = 45

            [entities]
            grid = { entity = "sensor.grid" }
        "#;
        let with_env = |vars: &[(&str, &str)]| {
            let source = vars
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            finish(
                config::Config::builder()
                    .add_source(config::File::from_str(toml, config::FileFormat::Toml)),
                environment().source(Some(source)),
            )
        };

        let config = with_env(&[
            ("POWERHALO_CLICKABLE_ENTITIES", "true"),
            ("POWERHALO_INDIVIDUAL_MAX_RADIUS", "30"),
            ("OTHER_CLICKABLE_ENTITIES", "false"),
        ])
        .unwrap();
        assert!(config.clickable_entities);
        assert_eq!(config.individual_max_radius, 30.0);
        assert_eq!(config.individual_min_radius, DEFAULT_MIN_RADIUS);

        let err = with_env(&[
            ("POWERHALO_INDIVIDUAL_MIN_RADIUS", "40"),
            ("POWERHALO_INDIVIDUAL_MAX_RADIUS", "30"),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidRadius { min, max } if min == 40.0 && max == 30.0
        ));
    }

    #[test]
    fn test_write_default_config() {
        let root = std::env::temp_dir().join(format!("powerhalo-init-{}", std::process::id()));
        let path = root.join("nested").join("config.toml");
        let _ = std::fs::remove_dir_all(&root);

        assert_eq!(write_default_config(&path).unwrap(), path);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);

        std::fs::write(&path, "# edited\n").unwrap();
        write_default_config(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# edited\n");

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_is_config_change() {
        use notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind};

        let path = Path::new("/tmp/powerhalo/config.toml");
        let other = Path::new("/tmp/powerhalo/other.toml");
        let change = |kind, p: &Path| notify::Event::new(kind).add_path(p.to_path_buf());

        let cases = vec![
            (EventKind::Modify(ModifyKind::Any), path, true),
            (EventKind::Create(CreateKind::File), path, true),
            (EventKind::Remove(RemoveKind::File), path, true),
            (EventKind::Access(AccessKind::Any), path, false),
            (EventKind::Modify(ModifyKind::Any), other, false),
        ];

        for (kind, p, expected) in cases {
            let event = change(kind, p);
            assert_eq!(is_config_change(&event, path), expected, "{event:?}");
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = load_config_str(DEFAULT_CONFIG).unwrap();
        assert!(config.entities.entity(SummaryKind::Home).is_some());
    }

    #[test]
    fn test_summary_kind_deserialization() {
        let cases = vec![
            ("\"grid\"", SummaryKind::Grid),
            ("\"Solar\"", SummaryKind::Solar),
            ("\"BATTERY\"", SummaryKind::Battery),
            ("\"home\"", SummaryKind::Home),
        ];

        for (json, expected) in cases {
            let deserialized: SummaryKind = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized, expected);
        }
        assert_eq!(SummaryKind::Battery.to_string(), "battery");
    }
}
