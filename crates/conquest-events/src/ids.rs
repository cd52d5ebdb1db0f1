//! Identifier Types
//!
//! Stable string identifiers for territories and factions, plus the
//! numeric handle given to every in-flight attack.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Unique identifier for a territory (e.g. "north_africa")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TerritoryId(pub String);

impl TerritoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TerritoryId {
    fn from(s: &str) -> Self {
        TerritoryId(s.to_string())
    }
}

impl From<String> for TerritoryId {
    fn from(s: String) -> Self {
        TerritoryId(s)
    }
}

impl Borrow<str> for TerritoryId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TerritoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a faction (e.g. "faction_0")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactionId(pub String);

impl FactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FactionId {
    fn from(s: &str) -> Self {
        FactionId(s.to_string())
    }
}

impl From<String> for FactionId {
    fn from(s: String) -> Self {
        FactionId(s)
    }
}

impl Borrow<str> for FactionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle for an attack between commitment and resolution.
///
/// Ids are handed out in issue order, so they double as the tie-breaker
/// when two attacks expire at the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttackId(pub u64);

impl fmt::Display for AttackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "atk_{:06}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_territory_id_borrows_as_str() {
        let mut map = BTreeMap::new();
        map.insert(TerritoryId::from("alaska"), 1);
        assert_eq!(map.get("alaska"), Some(&1));
        assert_eq!(map.get("canada"), None);
    }

    #[test]
    fn test_ids_serialize_transparently() {
        assert_eq!(serde_json::to_string(&FactionId::from("faction_1")).unwrap(), r#""faction_1""#);
        assert_eq!(serde_json::to_string(&AttackId(7)).unwrap(), "7");
        assert_eq!(AttackId(7).to_string(), "atk_000007");
    }
}
