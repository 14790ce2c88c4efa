use crate::format::PLACEHOLDER;
use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use serde_with::{NoneAsEmptyString, serde_as};

#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    Deref,
    From,
    Into,
    AsRef,
)]
#[serde(transparent)]
pub struct EntityId(String);

crate::impl_string_newtype!(EntityId);

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One element of the configured `individual` list: either a bare identifier
/// or a record carrying the identifier and an optional display name.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndividualEntry {
    Bare(EntityId),
    Labeled {
        #[serde(default)]
        entity: Option<EntityId>,
        #[serde(default, alias = "label")]
        #[serde_as(as = "NoneAsEmptyString")]
        name: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityRef {
    pub id: EntityId,
    pub name: Option<String>,
}

impl EntityRef {
    pub fn new(id: impl Into<EntityId>, name: Option<String>) -> Self {
        Self {
            id: id.into(),
            name,
        }
    }

    /// Explicit name when configured, otherwise derived from the identifier.
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| derive_label(&self.id))
    }
}

impl From<&IndividualEntry> for EntityRef {
    fn from(entry: &IndividualEntry) -> Self {
        match entry {
            IndividualEntry::Bare(id) => Self::new(id.clone(), None),
            IndividualEntry::Labeled { entity, name } => {
                Self::new(entity.clone().unwrap_or_default(), name.clone())
            }
        }
    }
}

/// Resolves configured entries into a uniform list. Order is preserved and
/// duplicates are kept; position in this list is the only satellite identity.
pub fn normalize(entries: &[IndividualEntry]) -> Vec<EntityRef> {
    entries.iter().map(EntityRef::from).collect()
}

/// `domain.object_id` becomes `object id`. Identifiers without a separator are
/// returned verbatim, and anything that would produce an empty label falls
/// back to the raw identifier.
pub fn derive_label(id: &EntityId) -> String {
    if id.is_empty() {
        return PLACEHOLDER.to_string();
    }

    match id.split_once('.') {
        Some((_, object_id)) if !object_id.is_empty() => object_id.replace('_', " "),
        _ => id.to_string(),
    }
}
