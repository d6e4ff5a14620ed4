//! Entity identifiers
//!
//! Every record carries a prefixed ULID such as `CASE-01J9Z3K4M5N6P7Q8R9S0T1V2W3`.
//! The ULID supplies 128 bits with an 80-bit random component, so ids created
//! in the same millisecond never collide in practice.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use ulid::Ulid;

/// Record type prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityPrefix {
    Case,
    Def,
    Rpt,
    Prs,
    Usr,
}

impl EntityPrefix {
    pub fn all() -> &'static [EntityPrefix] {
        &[
            EntityPrefix::Case,
            EntityPrefix::Def,
            EntityPrefix::Rpt,
            EntityPrefix::Prs,
            EntityPrefix::Usr,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Case => "CASE",
            EntityPrefix::Def => "DEF",
            EntityPrefix::Rpt => "RPT",
            EntityPrefix::Prs => "PRS",
            EntityPrefix::Usr => "USR",
        }
    }
}

impl std::fmt::Display for EntityPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityPrefix {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityPrefix::all()
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| IdParseError::UnknownPrefix(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdParseError {
    #[error("Missing '-' separator in id '{0}'")]
    MissingSeparator(String),

    #[error("Unknown id prefix '{0}'")]
    UnknownPrefix(String),

    #[error("Invalid ULID in id '{0}'")]
    InvalidUlid(String),
}

/// A prefixed, globally unique record identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    prefix: EntityPrefix,
    ulid: Ulid,
}

impl EntityId {
    /// Generate a fresh identifier
    pub fn new(prefix: EntityPrefix) -> Self {
        Self {
            prefix,
            ulid: Ulid::new(),
        }
    }

    pub fn from_ulid(prefix: EntityPrefix, ulid: Ulid) -> Self {
        Self { prefix, ulid }
    }

    pub fn prefix(&self) -> EntityPrefix {
        self.prefix
    }

    /// True if `query` is this id or a case-insensitive leading fragment of it
    pub fn matches_prefix(&self, query: &str) -> bool {
        let query = query.trim();
        !query.is_empty() && self.to_string().to_uppercase().starts_with(&query.to_uppercase())
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.prefix, self.ulid)
    }
}

impl std::str::FromStr for EntityId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, ulid) = s
            .split_once('-')
            .ok_or_else(|| IdParseError::MissingSeparator(s.to_string()))?;
        let prefix: EntityPrefix = prefix.parse()?;
        let ulid = Ulid::from_string(ulid).map_err(|_| IdParseError::InvalidUlid(s.to_string()))?;
        Ok(Self { prefix, ulid })
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_new_id_has_prefix() {
        let id = EntityId::new(EntityPrefix::Case);
        let s = id.to_string();
        assert!(s.starts_with("CASE-"));
        assert_eq!(s.len(), 5 + 26);
        assert_eq!(id.prefix(), EntityPrefix::Case);
    }

    #[test]
    fn test_roundtrip_parse() {
        let id = EntityId::new(EntityPrefix::Rpt);
        let parsed: EntityId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "CASE01".parse::<EntityId>(),
            Err(IdParseError::MissingSeparator(_))
        ));
        assert!(matches!(
            "REQ-01J9Z3K4M5N6P7Q8R9S0T1V2W3".parse::<EntityId>(),
            Err(IdParseError::UnknownPrefix(_))
        ));
        assert!(matches!(
            "CASE-not-a-ulid".parse::<EntityId>(),
            Err(IdParseError::InvalidUlid(_))
        ));
    }

    #[test]
    fn test_rapid_generation_is_unique() {
        let ids: HashSet<String> = (0..2000)
            .map(|_| EntityId::new(EntityPrefix::Def).to_string())
            .collect();
        assert_eq!(ids.len(), 2000);
    }

    #[test]
    fn test_matches_prefix() {
        let id = EntityId::new(EntityPrefix::Prs);
        let s = id.to_string();
        assert!(id.matches_prefix("PRS-"));
        assert!(id.matches_prefix(&s[..10].to_lowercase()));
        assert!(id.matches_prefix(&s));
        assert!(!id.matches_prefix(""));
        assert!(!id.matches_prefix("CASE-"));
    }
}
