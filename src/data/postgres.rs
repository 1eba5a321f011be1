use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::entities::{CountryModel, StateModel};
use super::repository::{EntityStore, StateStore};
use super::session::{Change, StagedChange};
use super::unit_of_work::{ChangeCommitter, SessionUnitOfWork, UnitOfWork, UnitOfWorkFactory};
use crate::shared::AppError;

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS countries (
        id INTEGER GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
        name TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS states (
        id INTEGER GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
        name TEXT NOT NULL,
        country_id INTEGER NOT NULL REFERENCES countries (id) ON DELETE CASCADE
    )",
    "CREATE INDEX IF NOT EXISTS ix_states_country_id ON states (country_id)",
];

/// PostgreSQL implementation of the storage backend
#[derive(Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
}

impl PostgresDatabase {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database at `database_url`
    #[instrument(skip(database_url))]
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to connect to database");
                AppError::PersistenceError(e.to_string())
            })?;

        info!("Connected to PostgreSQL");
        Ok(Self::new(pool))
    }

    /// Creates the countries and states tables if they do not exist yet
    #[instrument(skip(self))]
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(persistence_error)?;
        }

        debug!("Database schema ensured");
        Ok(())
    }

    /// Moves the identity sequence of `table` past explicitly inserted ids
    async fn sync_identity(
        tx: &mut Transaction<'_, Postgres>,
        table: &'static str,
    ) -> Result<(), AppError> {
        let statement = format!(
            "SELECT setval(pg_get_serial_sequence('{table}', 'id'), MAX(id)) FROM {table}"
        );
        sqlx::query(&statement)
            .execute(&mut **tx)
            .await
            .map_err(persistence_error)?;
        Ok(())
    }

    async fn apply(
        tx: &mut Transaction<'_, Postgres>,
        change: StagedChange,
    ) -> Result<u64, AppError> {
        let result = match change {
            StagedChange::Country(Change::Add(country)) if country.id == 0 => {
                sqlx::query("INSERT INTO countries (name) VALUES ($1)")
                    .bind(&country.name)
                    .execute(&mut **tx)
                    .await
            }
            StagedChange::Country(Change::Add(country)) => {
                let result = sqlx::query("INSERT INTO countries (id, name) VALUES ($1, $2)")
                    .bind(country.id)
                    .bind(&country.name)
                    .execute(&mut **tx)
                    .await
                    .map_err(persistence_error)?;
                Self::sync_identity(tx, "countries").await?;
                return Ok(result.rows_affected());
            }
            StagedChange::Country(Change::Update(country)) => {
                let result = sqlx::query("UPDATE countries SET name = $2 WHERE id = $1")
                    .bind(country.id)
                    .bind(&country.name)
                    .execute(&mut **tx)
                    .await
                    .map_err(persistence_error)?;
                if result.rows_affected() == 0 {
                    return Err(AppError::NotFound(format!(
                        "Country {} not found",
                        country.id
                    )));
                }
                return Ok(result.rows_affected());
            }
            StagedChange::Country(Change::Delete(id)) => {
                sqlx::query("DELETE FROM countries WHERE id = $1")
                    .bind(id)
                    .execute(&mut **tx)
                    .await
            }
            StagedChange::State(Change::Add(state)) if state.id == 0 => {
                sqlx::query("INSERT INTO states (name, country_id) VALUES ($1, $2)")
                    .bind(&state.name)
                    .bind(state.country_id)
                    .execute(&mut **tx)
                    .await
            }
            StagedChange::State(Change::Add(state)) => {
                let result =
                    sqlx::query("INSERT INTO states (id, name, country_id) VALUES ($1, $2, $3)")
                        .bind(state.id)
                        .bind(&state.name)
                        .bind(state.country_id)
                        .execute(&mut **tx)
                        .await
                        .map_err(persistence_error)?;
                Self::sync_identity(tx, "states").await?;
                return Ok(result.rows_affected());
            }
            StagedChange::State(Change::Update(state)) => {
                let result =
                    sqlx::query("UPDATE states SET name = $2, country_id = $3 WHERE id = $1")
                        .bind(state.id)
                        .bind(&state.name)
                        .bind(state.country_id)
                        .execute(&mut **tx)
                        .await
                        .map_err(persistence_error)?;
                if result.rows_affected() == 0 {
                    return Err(AppError::NotFound(format!("State {} not found", state.id)));
                }
                return Ok(result.rows_affected());
            }
            StagedChange::State(Change::Delete(id)) => {
                sqlx::query("DELETE FROM states WHERE id = $1")
                    .bind(id)
                    .execute(&mut **tx)
                    .await
            }
        };

        result
            .map(|done| done.rows_affected())
            .map_err(persistence_error)
    }
}

fn persistence_error(e: sqlx::Error) -> AppError {
    warn!(error = %e, "Database operation failed");
    AppError::PersistenceError(e.to_string())
}

#[async_trait]
impl EntityStore<CountryModel> for PostgresDatabase {
    #[instrument(skip(self))]
    async fn fetch_all(&self) -> Result<Vec<CountryModel>, AppError> {
        sqlx::query_as::<_, CountryModel>("SELECT id, name FROM countries ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(persistence_error)
    }

    #[instrument(skip(self))]
    async fn fetch_by_id(&self, id: i32) -> Result<Option<CountryModel>, AppError> {
        sqlx::query_as::<_, CountryModel>("SELECT id, name FROM countries WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(persistence_error)
    }
}

#[async_trait]
impl EntityStore<StateModel> for PostgresDatabase {
    #[instrument(skip(self))]
    async fn fetch_all(&self) -> Result<Vec<StateModel>, AppError> {
        sqlx::query_as::<_, StateModel>("SELECT id, name, country_id FROM states ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(persistence_error)
    }

    #[instrument(skip(self))]
    async fn fetch_by_id(&self, id: i32) -> Result<Option<StateModel>, AppError> {
        sqlx::query_as::<_, StateModel>("SELECT id, name, country_id FROM states WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(persistence_error)
    }
}

#[async_trait]
impl StateStore for PostgresDatabase {
    #[instrument(skip(self))]
    async fn fetch_by_country(&self, country_id: i32) -> Result<Vec<StateModel>, AppError> {
        sqlx::query_as::<_, StateModel>(
            "SELECT id, name, country_id FROM states WHERE country_id = $1 ORDER BY id",
        )
        .bind(country_id)
        .fetch_all(&self.pool)
        .await
        .map_err(persistence_error)
    }
}

#[async_trait]
impl ChangeCommitter for PostgresDatabase {
    #[instrument(skip(self, changes), fields(changes = changes.len()))]
    async fn commit(&self, changes: Vec<StagedChange>) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await.map_err(persistence_error)?;

        let mut affected = 0;
        for change in changes {
            // Dropping `tx` on error rolls the transaction back
            affected += Self::apply(&mut tx, change).await?;
        }

        tx.commit().await.map_err(persistence_error)?;
        debug!(affected, "Changes committed to database");
        Ok(affected)
    }
}

impl UnitOfWorkFactory for PostgresDatabase {
    fn begin(&self) -> Box<dyn UnitOfWork> {
        Box::new(SessionUnitOfWork::new(Arc::new(self.clone())))
    }
}
