//! Prosecutor reference data

use serde::{Deserialize, Serialize};

use crate::core::identity::EntityId;

/// A prosecutor that cases and reports can be assigned to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prosecutor {
    /// Assigned by the backing source on insert
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,

    pub name: String,

    /// Rank or position, e.g. "Procurator"
    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    /// User that owns this entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl Prosecutor {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            title: title.into(),
            department: None,
            owner: None,
        }
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Case-insensitive match against name, title and department
    pub fn matches(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        self.name.to_lowercase().contains(&q)
            || self.title.to_lowercase().contains(&q)
            || self
                .department
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&q))
    }
}

/// Partial update; `None` fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProsecutorPatch {
    pub name: Option<String>,
    pub title: Option<String>,
    /// `Some(None)` clears the department
    pub department: Option<Option<String>>,
}

impl ProsecutorPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.title.is_none() && self.department.is_none()
    }

    pub fn apply(&self, prosecutor: &mut Prosecutor) {
        if let Some(name) = &self.name {
            prosecutor.name = name.clone();
        }
        if let Some(title) = &self.title {
            prosecutor.title = title.clone();
        }
        if let Some(department) = &self.department {
            prosecutor.department = department.clone();
        }
    }
}
