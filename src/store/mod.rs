//! Entity stores
//!
//! Each store owns one in-memory collection for the session's owner. Every
//! mutation is applied in memory first and the whole collection is then written
//! through [`Persistence`]; a failed write is logged there and never undoes the
//! mutation.

pub mod cases;
pub mod reports;

use std::rc::Rc;

use miette::Diagnostic;
use thiserror::Error;
use tracing::debug;

use crate::core::dates::{Clock, DisplayDate};
use crate::core::entity::Record;
use crate::core::identity::EntityId;
use crate::storage::{CollectionKey, Persistence};

pub use cases::CaseStore;
pub use reports::ReportStore;

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("No {kind} matches '{query}'")]
    #[diagnostic(help("run `casebook {kind} list` to see available ids"))]
    NotFound { kind: &'static str, query: String },

    #[error("'{query}' matches {count} {kind} records: {candidates}")]
    #[diagnostic(help("use a longer id prefix or the full id"))]
    Ambiguous {
        kind: &'static str,
        query: String,
        count: usize,
        candidates: String,
    },

    #[error("Case {case} has no defendant matching '{query}'")]
    #[diagnostic(help("run `casebook case show {case}` to list its defendants"))]
    DefendantNotFound { case: String, query: String },
}

/// List filter shared by both stores
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Case-insensitive free text
    pub search: Option<String>,
    /// Only records assigned to this prosecutor
    pub prosecutor: Option<EntityId>,
}

impl RecordFilter {
    pub fn matches<T: Record>(&self, record: &T) -> bool {
        if let Some(term) = &self.search {
            if !term.trim().is_empty() && !record.matches_search(term.trim()) {
                return false;
            }
        }
        if let Some(prosecutor) = &self.prosecutor {
            if record.prosecutor() != Some(prosecutor) {
                return false;
            }
        }
        true
    }
}

/// A persisted, ordered collection of one record type
pub struct RecordCollection<T: Record> {
    items: Vec<T>,
    key: CollectionKey,
    persistence: Rc<Persistence>,
    clock: Rc<dyn Clock>,
}

impl<T: Record> RecordCollection<T> {
    /// Load the owner's collection; empty if nothing is stored
    pub fn load(persistence: Rc<Persistence>, owner: &str, clock: Rc<dyn Clock>) -> Self {
        let key = CollectionKey::new(T::COLLECTION, owner);
        let items = persistence.load(&key);
        Self {
            items,
            key,
            persistence,
            clock,
        }
    }

    fn kind() -> &'static str {
        T::COLLECTION.singular()
    }

    pub fn today(&self) -> DisplayDate {
        self.clock.today()
    }

    pub fn persist(&self) {
        self.persistence.save(&self.key, &self.items);
    }

    pub fn all(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, id: &EntityId) -> Option<usize> {
        self.items.iter().position(|r| r.id() == id)
    }

    fn not_found(id: &EntityId) -> StoreError {
        StoreError::NotFound {
            kind: Self::kind(),
            query: id.to_string(),
        }
    }

    pub fn get(&self, id: &EntityId) -> Option<&T> {
        self.items.iter().find(|r| r.id() == id)
    }

    /// Resolve a full id, an id prefix, or a unique name fragment
    pub fn find(&self, query: &str) -> Result<&T, StoreError> {
        let query = query.trim();
        if let Ok(id) = query.parse::<EntityId>() {
            if let Some(record) = self.get(&id) {
                return Ok(record);
            }
        }

        let by_id: Vec<&T> = self
            .items
            .iter()
            .filter(|r| r.id().matches_prefix(query))
            .collect();
        if !by_id.is_empty() {
            return self.single(query, by_id);
        }

        let lower = query.to_lowercase();
        let exact: Vec<&T> = self
            .items
            .iter()
            .filter(|r| r.name().to_lowercase() == lower)
            .collect();
        if exact.len() == 1 {
            return Ok(exact[0]);
        }

        let by_name: Vec<&T> = self
            .items
            .iter()
            .filter(|r| !lower.is_empty() && r.name().to_lowercase().contains(&lower))
            .collect();
        self.single(query, by_name)
    }

    fn single<'a>(&self, query: &str, matches: Vec<&'a T>) -> Result<&'a T, StoreError> {
        match matches.len() {
            0 => Err(StoreError::NotFound {
                kind: Self::kind(),
                query: query.to_string(),
            }),
            1 => Ok(matches[0]),
            count => Err(StoreError::Ambiguous {
                kind: Self::kind(),
                query: query.to_string(),
                count,
                candidates: matches
                    .iter()
                    .take(5)
                    .map(|r| r.id().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }

    /// Records with exactly this stage, in store order
    pub fn by_stage(&self, stage: T::Stage) -> Vec<&T> {
        self.items.iter().filter(|r| r.stage() == stage).collect()
    }

    pub fn filter(&self, filter: &RecordFilter) -> Vec<&T> {
        self.items.iter().filter(|r| filter.matches(*r)).collect()
    }

    /// Append a new record and persist
    pub fn insert(&mut self, record: T) -> &T {
        debug!(id = %record.id(), kind = Self::kind(), "adding record");
        self.items.push(record);
        self.persist();
        let last = self.items.len() - 1;
        &self.items[last]
    }

    /// Replace the record with the same id and persist
    pub fn replace(&mut self, record: T) -> Result<(), StoreError> {
        let idx = self
            .position(record.id())
            .ok_or_else(|| Self::not_found(record.id()))?;
        debug!(id = %record.id(), kind = Self::kind(), "updating record");
        self.items[idx] = record;
        self.persist();
        Ok(())
    }

    /// Apply `change` to the record with `id` and persist
    pub fn modify<F>(&mut self, id: &EntityId, change: F) -> Result<&T, StoreError>
    where
        F: FnOnce(&mut T, DisplayDate) -> Result<(), StoreError>,
    {
        let idx = self.position(id).ok_or_else(|| Self::not_found(id))?;
        let today = self.today();
        change(&mut self.items[idx], today)?;
        self.persist();
        Ok(&self.items[idx])
    }

    /// Remove the record; `None` (and nothing persisted) if the id is unknown
    pub fn remove(&mut self, id: &EntityId) -> Option<T> {
        let idx = self.position(id)?;
        debug!(id = %id, kind = Self::kind(), "deleting record");
        let removed = self.items.remove(idx);
        self.persist();
        Some(removed)
    }
}
