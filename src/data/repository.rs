use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::entities::{Entity, StateModel};
use super::session::{Change, Session};
use crate::shared::AppError;

/// Generic CRUD contract for one entity type.
///
/// Reads observe committed storage; writes are only staged and take effect
/// when the owning unit of work is saved.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    async fn get_all(&self) -> Result<Vec<E>, AppError>;
    async fn get_by_id(&self, id: i32) -> Result<Option<E>, AppError>;
    async fn add(&self, entity: E) -> Result<(), AppError>;
    async fn update(&self, entity: E) -> Result<(), AppError>;
    async fn delete(&self, id: i32) -> Result<(), AppError>;
}

/// Read access to committed rows of one entity type, implemented by each backend
#[async_trait]
pub trait EntityStore<E: Entity>: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<E>, AppError>;
    async fn fetch_by_id(&self, id: i32) -> Result<Option<E>, AppError>;
}

/// State reads filtered by owning country, answered by the backend
#[async_trait]
pub trait StateStore: EntityStore<StateModel> {
    async fn fetch_by_country(&self, country_id: i32) -> Result<Vec<StateModel>, AppError>;
}

/// State repository with the country lookup on top of generic CRUD
#[async_trait]
pub trait StateRepository: Repository<StateModel> {
    async fn get_by_country(&self, country_id: i32) -> Result<Vec<StateModel>, AppError>;
}

/// Repository that reads through an `EntityStore` and stages writes on a session
pub struct TrackedRepository<E: Entity, S: ?Sized = dyn EntityStore<E>> {
    store: Arc<S>,
    session: Arc<Session>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity, S: EntityStore<E> + ?Sized> TrackedRepository<E, S> {
    pub fn new(store: Arc<S>, session: Arc<Session>) -> Self {
        Self {
            store,
            session,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<E: Entity, S: EntityStore<E> + ?Sized> Repository<E> for TrackedRepository<E, S> {
    #[instrument(skip(self), fields(entity_type = E::NAME))]
    async fn get_all(&self) -> Result<Vec<E>, AppError> {
        self.session.ensure_open()?;
        let entities = self.store.fetch_all().await?;
        debug!(count = entities.len(), "Fetched all rows");
        Ok(entities)
    }

    #[instrument(skip(self), fields(entity_type = E::NAME))]
    async fn get_by_id(&self, id: i32) -> Result<Option<E>, AppError> {
        self.session.ensure_open()?;
        self.store.fetch_by_id(id).await
    }

    #[instrument(skip(self, entity), fields(entity_type = E::NAME, id = entity.id()))]
    async fn add(&self, entity: E) -> Result<(), AppError> {
        self.session.stage(Change::Add(entity))
    }

    #[instrument(skip(self, entity), fields(entity_type = E::NAME, id = entity.id()))]
    async fn update(&self, entity: E) -> Result<(), AppError> {
        self.session.stage(Change::Update(entity))
    }

    #[instrument(skip(self), fields(entity_type = E::NAME))]
    async fn delete(&self, id: i32) -> Result<(), AppError> {
        self.session.stage::<E>(Change::Delete(id))
    }
}

#[async_trait]
impl StateRepository for TrackedRepository<StateModel, dyn StateStore> {
    #[instrument(skip(self))]
    async fn get_by_country(&self, country_id: i32) -> Result<Vec<StateModel>, AppError> {
        self.session.ensure_open()?;
        let states = self.store.fetch_by_country(country_id).await?;
        debug!(count = states.len(), "Fetched states for country");
        Ok(states)
    }
}
