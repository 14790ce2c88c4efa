use crate::config::{self, CardConfig, ConfigError};
use crate::scene::{Scene, compose};
use crate::state::StateStore;
use std::path::PathBuf;

/// Host-side glue: the current configuration, the live store and the scene of
/// the last render pass.
pub struct Dashboard {
    pub config_path: PathBuf,
    pub config: CardConfig,
    pub store: StateStore,
    pub scene: Scene,
}

impl Dashboard {
    pub fn new(config_path: PathBuf, config: CardConfig, store: StateStore) -> Self {
        let scene = compose(&config, &store.snapshot());
        Self {
            config_path,
            config,
            store,
            scene,
        }
    }

    pub fn recompose(&mut self) {
        self.scene = compose(&self.config, &self.store.snapshot());
    }

    /// Keeps the previous configuration when the new one does not load.
    pub fn reload_config(&mut self) -> Result<(), ConfigError> {
        self.config = config::load_config(&self.config_path)?;
        self.recompose();
        Ok(())
    }
}
