//! Prosecutor directory
//!
//! A [`ProsecutorSource`] is the backing collaborator (stored per owner, or a
//! fixed read-only table). [`ProsecutorDirectory`] wraps one source for the
//! session's owner and adds ordering, search and id resolution.

use std::collections::HashMap;
use std::rc::Rc;

use miette::Diagnostic;
use thiserror::Error;
use tracing::{debug, error};
use ulid::Ulid;

use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::{Prosecutor, ProsecutorPatch};
use crate::storage::{Collection, CollectionKey, Persistence};

#[derive(Debug, Error, Diagnostic)]
pub enum DirectoryError {
    #[error("The prosecutor list is read-only")]
    #[diagnostic(help("set `reference.prosecutors: stored` in config.yaml to manage prosecutors"))]
    ReadOnly,

    #[error("Prosecutor not found: {0}")]
    #[diagnostic(help("run `casebook prosecutor list` to see available prosecutors"))]
    NotFound(String),

    #[error("'{query}' matches several prosecutors: {candidates}")]
    #[diagnostic(help("use the prosecutor id instead"))]
    Ambiguous { query: String, candidates: String },

    #[error("Invalid prosecutor: {0}")]
    Invalid(String),

    #[error("Prosecutor storage is unavailable")]
    Unavailable,
}

/// Backing store for prosecutors, scoped by owner
pub trait ProsecutorSource {
    fn list(&self, owner: &str) -> Result<Vec<Prosecutor>, DirectoryError>;

    /// Insert a prosecutor, returning it with its assigned id
    fn insert(&self, owner: &str, prosecutor: Prosecutor) -> Result<Prosecutor, DirectoryError>;

    fn update(
        &self,
        owner: &str,
        id: &EntityId,
        patch: &ProsecutorPatch,
    ) -> Result<Prosecutor, DirectoryError>;

    fn delete(&self, owner: &str, id: &EntityId) -> Result<Prosecutor, DirectoryError>;
}

/// Prosecutors kept as a per-owner collection through the persistence port
pub struct StoredProsecutors {
    persistence: Rc<Persistence>,
}

impl StoredProsecutors {
    pub fn new(persistence: Rc<Persistence>) -> Self {
        Self { persistence }
    }

    fn key(owner: &str) -> CollectionKey {
        CollectionKey::new(Collection::Prosecutors, owner)
    }

    fn save(&self, owner: &str, items: &[Prosecutor]) -> Result<(), DirectoryError> {
        if self.persistence.save(&Self::key(owner), items).is_saved() {
            Ok(())
        } else {
            Err(DirectoryError::Unavailable)
        }
    }
}

impl ProsecutorSource for StoredProsecutors {
    fn list(&self, owner: &str) -> Result<Vec<Prosecutor>, DirectoryError> {
        Ok(self.persistence.load(&Self::key(owner)))
    }

    fn insert(&self, owner: &str, mut prosecutor: Prosecutor) -> Result<Prosecutor, DirectoryError> {
        let mut items = self.list(owner)?;
        prosecutor.id = Some(EntityId::new(EntityPrefix::Prs));
        prosecutor.owner = Some(owner.to_string());
        items.push(prosecutor.clone());
        self.save(owner, &items)?;
        Ok(prosecutor)
    }

    fn update(
        &self,
        owner: &str,
        id: &EntityId,
        patch: &ProsecutorPatch,
    ) -> Result<Prosecutor, DirectoryError> {
        let mut items = self.list(owner)?;
        let target = items
            .iter_mut()
            .find(|p| p.id.as_ref() == Some(id))
            .ok_or_else(|| DirectoryError::NotFound(id.to_string()))?;
        patch.apply(target);
        let updated = target.clone();
        self.save(owner, &items)?;
        Ok(updated)
    }

    fn delete(&self, owner: &str, id: &EntityId) -> Result<Prosecutor, DirectoryError> {
        let mut items = self.list(owner)?;
        let idx = items
            .iter()
            .position(|p| p.id.as_ref() == Some(id))
            .ok_or_else(|| DirectoryError::NotFound(id.to_string()))?;
        let removed = items.remove(idx);
        self.save(owner, &items)?;
        Ok(removed)
    }
}

/// Fixed, read-only prosecutor table shared by every owner
pub struct StaticProsecutors {
    entries: Vec<Prosecutor>,
}

impl StaticProsecutors {
    /// Entries without an id get one derived from their name, so references
    /// stay valid from one run to the next
    pub fn new(entries: Vec<Prosecutor>) -> Self {
        let entries = entries
            .into_iter()
            .map(|mut p| {
                if p.id.is_none() {
                    p.id = Some(stable_id(&p.name));
                }
                p
            })
            .collect();
        Self { entries }
    }
}

/// FNV-1a over the name, used as the ULID payload
fn stable_id(name: &str) -> EntityId {
    const OFFSET: u128 = 0x6c62272e07bb014262b821756295c58d;
    const PRIME: u128 = 0x0000000001000000000000000000013B;
    let hash = name
        .trim()
        .to_lowercase()
        .bytes()
        .fold(OFFSET, |acc, b| (acc ^ u128::from(b)).wrapping_mul(PRIME));
    EntityId::from_ulid(EntityPrefix::Prs, Ulid::from(hash))
}

impl ProsecutorSource for StaticProsecutors {
    fn list(&self, _owner: &str) -> Result<Vec<Prosecutor>, DirectoryError> {
        Ok(self.entries.clone())
    }

    fn insert(&self, _owner: &str, _prosecutor: Prosecutor) -> Result<Prosecutor, DirectoryError> {
        Err(DirectoryError::ReadOnly)
    }

    fn update(
        &self,
        _owner: &str,
        _id: &EntityId,
        _patch: &ProsecutorPatch,
    ) -> Result<Prosecutor, DirectoryError> {
        Err(DirectoryError::ReadOnly)
    }

    fn delete(&self, _owner: &str, _id: &EntityId) -> Result<Prosecutor, DirectoryError> {
        Err(DirectoryError::ReadOnly)
    }
}

/// Id to display name lookup built from one listing
#[derive(Debug, Default, Clone)]
pub struct NameIndex {
    names: HashMap<EntityId, String>,
}

impl NameIndex {
    /// Display name for an id; unknown ids render as the raw id
    pub fn display(&self, id: &EntityId) -> String {
        self.names
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    pub fn display_opt(&self, id: Option<&EntityId>) -> String {
        id.map(|id| self.display(id)).unwrap_or_default()
    }
}

/// Prosecutor directory for one owner
pub struct ProsecutorDirectory {
    source: Box<dyn ProsecutorSource>,
    owner: String,
}

impl ProsecutorDirectory {
    pub fn new(source: Box<dyn ProsecutorSource>, owner: impl Into<String>) -> Self {
        Self {
            source,
            owner: owner.into(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// All prosecutors sorted by name; empty if the source fails
    pub fn list(&self) -> Vec<Prosecutor> {
        match self.try_list() {
            Ok(items) => items,
            Err(e) => {
                error!(owner = %self.owner, error = %e, "could not fetch prosecutors");
                Vec::new()
            }
        }
    }

    pub fn try_list(&self) -> Result<Vec<Prosecutor>, DirectoryError> {
        let mut items = self.source.list(&self.owner)?;
        items.sort_by_key(|p| p.name.to_lowercase());
        Ok(items)
    }

    pub fn add(&self, prosecutor: Prosecutor) -> Result<Prosecutor, DirectoryError> {
        if prosecutor.name.trim().is_empty() {
            return Err(DirectoryError::Invalid("name must not be empty".to_string()));
        }
        let added = self.source.insert(&self.owner, prosecutor)?;
        debug!(name = %added.name, "prosecutor added");
        Ok(added)
    }

    pub fn update(
        &self,
        id: &EntityId,
        patch: &ProsecutorPatch,
    ) -> Result<Prosecutor, DirectoryError> {
        if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(DirectoryError::Invalid("name must not be empty".to_string()));
        }
        self.source.update(&self.owner, id, patch)
    }

    pub fn delete(&self, id: &EntityId) -> Result<Prosecutor, DirectoryError> {
        self.source.delete(&self.owner, id)
    }

    /// Case-insensitive search over name, title and department; a blank query lists all
    pub fn search(&self, query: &str) -> Vec<Prosecutor> {
        let all = self.list();
        if query.trim().is_empty() {
            return all;
        }
        all.into_iter().filter(|p| p.matches(query)).collect()
    }

    /// Resolve an id, id prefix, or unique name to a prosecutor id
    pub fn resolve(&self, query: &str) -> Result<EntityId, DirectoryError> {
        let query = query.trim();
        let all = self.try_list()?;

        let by_id: Vec<&Prosecutor> = all
            .iter()
            .filter(|p| p.id.as_ref().is_some_and(|id| id.matches_prefix(query)))
            .collect();
        let by_exact_name: Vec<&Prosecutor> = all
            .iter()
            .filter(|p| p.name.to_lowercase() == query.to_lowercase())
            .collect();
        let by_name: Vec<&Prosecutor> = all
            .iter()
            .filter(|p| !query.is_empty() && p.name.to_lowercase().contains(&query.to_lowercase()))
            .collect();

        let candidates = if !by_id.is_empty() {
            by_id
        } else if by_exact_name.len() == 1 {
            by_exact_name
        } else {
            by_name
        };

        match candidates.as_slice() {
            [] => Err(DirectoryError::NotFound(query.to_string())),
            [only] => only
                .id
                .clone()
                .ok_or_else(|| DirectoryError::NotFound(query.to_string())),
            many => Err(DirectoryError::Ambiguous {
                query: query.to_string(),
                candidates: many
                    .iter()
                    .map(|p| p.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }

    pub fn names(&self) -> NameIndex {
        NameIndex {
            names: self
                .list()
                .into_iter()
                .filter_map(|p| p.id.map(|id| (id, p.name)))
                .collect(),
        }
    }

    /// Name to show for a prosecutor id
    pub fn display_name(&self, id: &EntityId) -> String {
        self.names().display(id)
    }
}
