//! Shared traits implemented by every ledger entity, and the identifier they share.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Opaque record identifier.
///
/// Ids minted here are UUID v4 strings, but any non-empty string read from storage
/// is accepted as-is (`"1"`, `"salary-3-15"`, millisecond timestamps). Bare JSON
/// integers are read as their decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Mints a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Uuid> for EntityId {
    fn from(value: Uuid) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        let raw = match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text,
            Raw::Number(number) => number.to_string(),
        };
        if raw.trim().is_empty() {
            return Err(serde::de::Error::custom("record id must not be empty"));
        }
        Ok(Self(raw))
    }
}

/// Exposes a stable identifier for entities stored in the ledger.
pub trait Identifiable {
    fn id(&self) -> &EntityId;
}

/// Provides read-only access to an entity's display name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Associates entities with a free-text category label.
///
/// Categories are plain strings; nothing guarantees the label exists in the
/// ledger's [`crate::CategorySet`].
pub trait BelongsToCategory {
    fn category(&self) -> &str;
}

/// Converts an entity into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_legacy_string_and_numeric_ids() {
        let ids: Vec<EntityId> =
            serde_json::from_str(r#"["1", "salary-3-15", 1733000000000]"#).unwrap();
        assert_eq!(ids[0].as_str(), "1");
        assert_eq!(ids[1].as_str(), "salary-3-15");
        assert_eq!(ids[2].as_str(), "1733000000000");
    }

    #[test]
    fn rejects_blank_ids() {
        assert!(serde_json::from_str::<EntityId>(r#""  ""#).is_err());
    }

    #[test]
    fn generated_ids_are_distinct_uuids() {
        let first = EntityId::generate();
        assert_ne!(first, EntityId::generate());
        assert!(Uuid::parse_str(first.as_str()).is_ok());
        assert_eq!(serde_json::to_string(&EntityId::from("7")).unwrap(), r#""7""#);
    }
}
