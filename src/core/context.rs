//! Application context
//!
//! Owns the session user, the persistence chain, both stores and the prosecutor
//! directory. Commands receive it explicitly; nothing is global.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, warn};

use crate::auth::{owner_key, Authenticator, UserHandle};
use crate::core::config::{BackendKind, Config, ProsecutorSourceKind};
use crate::core::dates::{Clock, DisplayDate, FixedClock, SystemClock};
use crate::core::identity::EntityId;
use crate::entities::{Case, CaseDraft, ReportStage};
use crate::reference::{ProsecutorDirectory, ProsecutorSource, StaticProsecutors, StoredProsecutors};
use crate::storage::file::COLLECTIONS_DIR;
use crate::storage::sqlite::DB_FILE;
use crate::storage::{Backend, JsonFileBackend, MemoryBackend, Persistence, SqliteBackend};
use crate::store::{CaseStore, ReportStore, StoreError};

pub struct AppContext {
    config: Config,
    data_dir: PathBuf,
    user: Option<UserHandle>,
    owner: String,
    clock: Rc<dyn Clock>,
    pub cases: CaseStore,
    pub reports: ReportStore,
    pub prosecutors: ProsecutorDirectory,
}

impl AppContext {
    /// Open the context for whoever is signed in (or the default owner)
    pub fn open(config: Config, authenticator: &dyn Authenticator) -> Self {
        let data_dir = config.resolve_data_dir(None);
        let user = authenticator.current_user();
        let persistence = Rc::new(build_persistence(&config, &data_dir));
        let source = prosecutor_source(&config, persistence.clone());
        Self::from_parts(config, user, persistence, source, Rc::new(SystemClock))
    }

    /// Assemble a context from explicit collaborators
    pub fn from_parts(
        config: Config,
        user: Option<UserHandle>,
        persistence: Rc<Persistence>,
        prosecutor_source: Box<dyn ProsecutorSource>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        let owner = owner_key(user.as_ref());
        debug!(owner = %owner, backends = ?persistence.backend_names(), "opening context");
        let data_dir = config.resolve_data_dir(None);
        Self {
            cases: CaseStore::load(persistence.clone(), &owner, clock.clone()),
            reports: ReportStore::load(persistence, &owner, clock.clone()),
            prosecutors: ProsecutorDirectory::new(prosecutor_source, owner.clone()),
            config,
            data_dir,
            user,
            owner,
            clock,
        }
    }

    /// In-memory context pinned to `today`, for tests and dry runs
    pub fn in_memory(today: DisplayDate) -> Self {
        let persistence = Rc::new(Persistence::in_memory());
        let source = Box::new(StoredProsecutors::new(persistence.clone()));
        Self::from_parts(
            Config::default(),
            None,
            persistence,
            source,
            Rc::new(FixedClock(today)),
        )
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn user(&self) -> Option<&UserHandle> {
        self.user.as_ref()
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn today(&self) -> DisplayDate {
        self.clock.today()
    }

    /// Mark the report prosecuted and open a case from it
    ///
    /// The new case copies name, charges, prosecutor and notes, starts with no
    /// defendants, and has today as its investigation deadline.
    pub fn transfer_report_to_case(&mut self, report_id: &EntityId) -> Result<&Case, StoreError> {
        let report = self
            .reports
            .transfer_stage(report_id, ReportStage::Prosecuted)?
            .clone();
        let draft = CaseDraft::from_report(&report, self.today());
        Ok(self.cases.add(draft))
    }
}

/// Build the persistence chain from config; backends that cannot be opened are skipped
pub fn build_persistence(config: &Config, data_dir: &Path) -> Persistence {
    let mut backends: Vec<Box<dyn Backend>> = Vec::new();
    for kind in &config.storage.backends {
        match kind {
            BackendKind::Sqlite => match SqliteBackend::open(&data_dir.join(DB_FILE)) {
                Ok(backend) => backends.push(Box::new(backend)),
                Err(e) => warn!(error = %e, "SQLite backend unavailable, skipping"),
            },
            BackendKind::Json => {
                backends.push(Box::new(JsonFileBackend::new(data_dir.join(COLLECTIONS_DIR))))
            }
        }
    }
    if backends.is_empty() {
        warn!("no storage backend available; changes will not be saved");
        backends.push(Box::new(MemoryBackend::new()));
    }
    Persistence::new(backends)
}

fn prosecutor_source(config: &Config, persistence: Rc<Persistence>) -> Box<dyn ProsecutorSource> {
    match config.reference.prosecutors {
        ProsecutorSourceKind::Stored => Box::new(StoredProsecutors::new(persistence)),
        ProsecutorSourceKind::Static => Box::new(StaticProsecutors::new(
            config.reference.static_prosecutors.clone(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Prosecutor, ReportDraft};
    use tempfile::TempDir;

    fn today() -> DisplayDate {
        "17/10/2026".parse().unwrap()
    }

    #[test]
    fn test_transfer_report_to_case() {
        let mut ctx = AppContext::in_memory(today());
        let prosecutor = ctx
            .prosecutors
            .add(Prosecutor::new("P1", "Procurator"))
            .unwrap()
            .id
            .unwrap();

        let mut draft = ReportDraft::new("N", "01/10/2026".parse().unwrap());
        draft.charges = "C".to_string();
        draft.prosecutor = Some(prosecutor.clone());
        let report_id = ctx.reports.add(draft).id.clone();

        let case = ctx.transfer_report_to_case(&report_id).unwrap().clone();
        assert_eq!(case.name, "N");
        assert_eq!(case.charges, "C");
        assert_eq!(case.prosecutor, Some(prosecutor));
        assert!(case.defendants.is_empty());
        assert_eq!(case.investigation_deadline, today());

        let report = ctx.reports.get(&report_id).unwrap();
        assert_eq!(report.stage, ReportStage::Prosecuted);
        assert_eq!(report.prosecution_date, Some(today()));
    }

    #[test]
    fn test_transfer_unknown_report() {
        let mut ctx = AppContext::in_memory(today());
        let ghost = EntityId::new(crate::core::identity::EntityPrefix::Rpt);
        assert!(ctx.transfer_report_to_case(&ghost).is_err());
        assert!(ctx.cases.is_empty());
    }

    #[test]
    fn test_build_persistence_order() {
        let tmp = TempDir::new().unwrap();
        let config = Config::default();
        let persistence = build_persistence(&config, tmp.path());
        assert_eq!(persistence.backend_names(), vec!["sqlite", "json"]);
        assert!(tmp.path().join(DB_FILE).exists());
    }

    #[test]
    fn test_empty_backend_list_falls_back_to_memory() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.storage.backends.clear();
        let persistence = build_persistence(&config, tmp.path());
        assert_eq!(persistence.backend_names(), vec!["memory"]);
    }

    #[test]
    fn test_static_prosecutor_source() {
        let mut config = Config::default();
        config.reference.prosecutors = ProsecutorSourceKind::Static;
        config.reference.static_prosecutors = vec![Prosecutor::new("Fixed", "Procurator")];
        let persistence = Rc::new(Persistence::in_memory());
        let source = prosecutor_source(&config, persistence.clone());
        let ctx = AppContext::from_parts(
            config,
            None,
            persistence,
            source,
            Rc::new(FixedClock(today())),
        );
        assert_eq!(ctx.prosecutors.list().len(), 1);
        assert!(ctx.prosecutors.add(Prosecutor::new("X", "Y")).is_err());
        assert_eq!(ctx.owner(), "default");
    }
}
