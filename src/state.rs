use crate::entity::EntityId;
use fs_err as fs;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Reading {
    Value(f64),
    #[default]
    Unresolved,
}

impl Reading {
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            Self::Unresolved => None,
        }
    }
}

/// A value as the host stores it, before any interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawState {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl RawState {
    /// Only finite numbers resolve.
    pub fn parse(&self) -> Reading {
        let value = match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok(),
            Self::Other(_) => None,
        };

        value
            .filter(|v| v.is_finite())
            .map_or(Reading::Unresolved, Reading::Value)
    }
}

impl From<f64> for RawState {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RawState {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

pub trait StateSource {
    fn reading(&self, id: &EntityId) -> Reading;
}

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to read state snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid state snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// Immutable view of the readings a render pass may see.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateSnapshot(HashMap<EntityId, RawState>);

impl StateSnapshot {
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for StateSnapshot
where
    K: Into<EntityId>,
    V: Into<RawState>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl StateSource for StateSnapshot {
    fn reading(&self, id: &EntityId) -> Reading {
        self.0.get(id).map_or(Reading::Unresolved, RawState::parse)
    }
}

/// Live readings shared between the ingest server and the UI.
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    inner: Arc<RwLock<StateSnapshot>>,
}

impl StateStore {
    pub fn new(initial: StateSnapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    pub fn set(&self, id: EntityId, raw: RawState) {
        self.inner.write().0.insert(id, raw);
    }

    pub fn unset(&self, id: &EntityId) -> bool {
        self.inner.write().0.remove(id).is_some()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.inner.read().clone()
    }
}
