use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::entities::{CountryModel, StateModel};
use super::repository::{EntityStore, Repository, StateRepository, StateStore, TrackedRepository};
use super::session::{Session, StagedChange};
use crate::shared::AppError;

/// Groups repositories over one session and commits their staged changes together
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn country_repository(&self) -> &dyn Repository<CountryModel>;
    fn state_repository(&self) -> &dyn StateRepository;

    /// Commits every staged change as one transaction and returns the affected row count
    async fn save(&self) -> Result<u64, AppError>;

    /// Releases the session; later use of this unit of work or its repositories fails
    fn dispose(&self);
}

/// Opens a fresh unit of work per request
pub trait UnitOfWorkFactory: Send + Sync {
    fn begin(&self) -> Box<dyn UnitOfWork>;
}

/// Applies a change log atomically, implemented by each backend
#[async_trait]
pub trait ChangeCommitter: Send + Sync {
    async fn commit(&self, changes: Vec<StagedChange>) -> Result<u64, AppError>;
}

/// Unit of work shared by every backend: tracked repositories plus a committer
pub struct SessionUnitOfWork {
    session: Arc<Session>,
    countries: TrackedRepository<CountryModel>,
    states: TrackedRepository<StateModel, dyn StateStore>,
    committer: Arc<dyn ChangeCommitter>,
}

impl SessionUnitOfWork {
    pub fn new<D>(database: Arc<D>) -> Self
    where
        D: EntityStore<CountryModel> + StateStore + ChangeCommitter + 'static,
    {
        let session = Arc::new(Session::new());
        let country_store: Arc<dyn EntityStore<CountryModel>> = database.clone();
        let state_store: Arc<dyn StateStore> = database.clone();
        let committer: Arc<dyn ChangeCommitter> = database;

        Self {
            countries: TrackedRepository::new(country_store, Arc::clone(&session)),
            states: TrackedRepository::new(state_store, Arc::clone(&session)),
            session,
            committer,
        }
    }

    pub fn pending_changes(&self) -> usize {
        self.session.pending_changes()
    }
}

#[async_trait]
impl UnitOfWork for SessionUnitOfWork {
    fn country_repository(&self) -> &dyn Repository<CountryModel> {
        &self.countries
    }

    fn state_repository(&self) -> &dyn StateRepository {
        &self.states
    }

    #[instrument(skip(self))]
    async fn save(&self) -> Result<u64, AppError> {
        let changes = self.session.take_changes()?;

        if changes.is_empty() {
            debug!("No staged changes to save");
            return Ok(0);
        }

        let staged = changes.len();
        match self.committer.commit(changes).await {
            Ok(affected) => {
                info!(staged, affected, "Unit of work saved");
                Ok(affected)
            }
            Err(e) => {
                warn!(staged, error = %e, "Unit of work save failed, changes rolled back");
                Err(e)
            }
        }
    }

    fn dispose(&self) {
        self.session.dispose();
    }
}

impl Drop for SessionUnitOfWork {
    fn drop(&mut self) {
        self.session.dispose();
    }
}
