//! Record trait - common interface for cases and reports

use serde::{de::DeserializeOwned, Serialize};

use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::workflow::Stage;
use crate::storage::Collection;

/// Common trait for stage-tracked records kept in a store
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Workflow stage enumeration for this record type
    type Stage: Stage;

    /// Id prefix (e.g. "CASE", "RPT")
    const PREFIX: EntityPrefix;

    /// Persisted collection this record type lives in
    const COLLECTION: Collection;

    fn id(&self) -> &EntityId;

    fn name(&self) -> &str;

    fn stage(&self) -> Self::Stage;

    /// Assigned prosecutor, if any
    fn prosecutor(&self) -> Option<&EntityId>;

    /// Case-insensitive free-text match used by list filters
    fn matches_search(&self, term: &str) -> bool;
}
