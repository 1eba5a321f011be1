use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::entities::{CountryModel, StateModel};
use super::repository::{EntityStore, StateStore};
use super::session::{Change, StagedChange};
use super::unit_of_work::{ChangeCommitter, SessionUnitOfWork, UnitOfWork, UnitOfWorkFactory};
use crate::shared::AppError;

#[derive(Debug, Clone, Default)]
struct Tables {
    countries: BTreeMap<i32, CountryModel>,
    states: BTreeMap<i32, StateModel>,
    country_seq: i32,
    state_seq: i32,
}

impl Tables {
    fn next_country_id(&mut self) -> Result<i32, AppError> {
        self.country_seq = next_identity(self.country_seq, "countries")?;
        Ok(self.country_seq)
    }

    fn next_state_id(&mut self) -> Result<i32, AppError> {
        self.state_seq = next_identity(self.state_seq, "states")?;
        Ok(self.state_seq)
    }

    /// Applies one change to the working copy, returning the directly affected rows
    fn apply(&mut self, change: StagedChange) -> Result<u64, AppError> {
        match change {
            StagedChange::Country(Change::Add(mut country)) => {
                if country.id == 0 {
                    country.id = self.next_country_id()?;
                } else {
                    self.country_seq = self.country_seq.max(country.id);
                }
                if self.countries.contains_key(&country.id) {
                    return Err(AppError::PersistenceError(format!(
                        "Duplicate key: country {} already exists",
                        country.id
                    )));
                }
                self.countries.insert(country.id, country);
                Ok(1)
            }
            StagedChange::Country(Change::Update(country)) => {
                let existing = self.countries.get_mut(&country.id).ok_or_else(|| {
                    AppError::NotFound(format!("Country {} not found", country.id))
                })?;
                *existing = country;
                Ok(1)
            }
            StagedChange::Country(Change::Delete(id)) => {
                if self.countries.remove(&id).is_none() {
                    debug!(country_id = id, "Country not present, delete is a no-op");
                    return Ok(0);
                }
                let before = self.states.len();
                self.states.retain(|_, state| !state.belongs_to(id));
                debug!(
                    country_id = id,
                    cascaded_states = before - self.states.len(),
                    "Country deleted with cascade"
                );
                Ok(1)
            }
            StagedChange::State(Change::Add(mut state)) => {
                self.check_country_exists(&state)?;
                if state.id == 0 {
                    state.id = self.next_state_id()?;
                } else {
                    self.state_seq = self.state_seq.max(state.id);
                }
                if self.states.contains_key(&state.id) {
                    return Err(AppError::PersistenceError(format!(
                        "Duplicate key: state {} already exists",
                        state.id
                    )));
                }
                self.states.insert(state.id, state);
                Ok(1)
            }
            StagedChange::State(Change::Update(state)) => {
                self.check_country_exists(&state)?;
                let existing = self.states.get_mut(&state.id).ok_or_else(|| {
                    AppError::NotFound(format!("State {} not found", state.id))
                })?;
                *existing = state;
                Ok(1)
            }
            StagedChange::State(Change::Delete(id)) => {
                if self.states.remove(&id).is_none() {
                    debug!(state_id = id, "State not present, delete is a no-op");
                    return Ok(0);
                }
                Ok(1)
            }
        }
    }

    fn check_country_exists(&self, state: &StateModel) -> Result<(), AppError> {
        if !self.countries.contains_key(&state.country_id) {
            return Err(AppError::PersistenceError(format!(
                "Foreign key violation: state {} references missing country {}",
                state.id, state.country_id
            )));
        }
        Ok(())
    }
}

fn next_identity(current: i32, table: &str) -> Result<i32, AppError> {
    current.checked_add(1).ok_or_else(|| {
        AppError::PersistenceError(format!("Identity sequence exhausted for {}", table))
    })
}

/// In-memory database for development and testing.
///
/// Commits apply to a copy of the tables which replaces the live tables only
/// when every change succeeded. Data is lost when the application restarts.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDatabase {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryDatabase {
    /// Creates a new empty in-memory database
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an in-memory database with pre-populated rows
    pub fn with_data(countries: Vec<CountryModel>, states: Vec<StateModel>) -> Self {
        let mut tables = Tables::default();
        for country in countries {
            tables.country_seq = tables.country_seq.max(country.id);
            tables.countries.insert(country.id, country);
        }
        for state in states {
            tables.state_seq = tables.state_seq.max(state.id);
            tables.states.insert(state.id, state);
        }

        Self {
            tables: Arc::new(RwLock::new(tables)),
        }
    }

    /// Returns the current number of committed countries and states
    pub async fn row_counts(&self) -> (usize, usize) {
        let tables = self.tables.read().await;
        (tables.countries.len(), tables.states.len())
    }
}

#[async_trait]
impl EntityStore<CountryModel> for InMemoryDatabase {
    async fn fetch_all(&self) -> Result<Vec<CountryModel>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.countries.values().cloned().collect())
    }

    async fn fetch_by_id(&self, id: i32) -> Result<Option<CountryModel>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.countries.get(&id).cloned())
    }
}

#[async_trait]
impl EntityStore<StateModel> for InMemoryDatabase {
    async fn fetch_all(&self) -> Result<Vec<StateModel>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.states.values().cloned().collect())
    }

    async fn fetch_by_id(&self, id: i32) -> Result<Option<StateModel>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.states.get(&id).cloned())
    }
}

#[async_trait]
impl StateStore for InMemoryDatabase {
    async fn fetch_by_country(&self, country_id: i32) -> Result<Vec<StateModel>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .states
            .values()
            .filter(|state| state.belongs_to(country_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ChangeCommitter for InMemoryDatabase {
    #[instrument(skip(self, changes), fields(changes = changes.len()))]
    async fn commit(&self, changes: Vec<StagedChange>) -> Result<u64, AppError> {
        let mut tables = self.tables.write().await;
        let mut working = tables.clone();

        let mut affected = 0;
        for change in changes {
            affected += working.apply(change).map_err(|e| {
                warn!(error = %e, "Commit rejected, rolling back");
                e
            })?;
        }

        *tables = working;
        debug!(affected, "Changes committed to memory");
        Ok(affected)
    }
}

impl UnitOfWorkFactory for InMemoryDatabase {
    fn begin(&self) -> Box<dyn UnitOfWork> {
        Box::new(SessionUnitOfWork::new(Arc::new(self.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_commit_assigns_identities_for_zero_ids() {
        let database = InMemoryDatabase::new();

        let affected = database
            .commit(vec![
                StagedChange::Country(Change::Add(CountryModel::new(0, "Country1"))),
                StagedChange::Country(Change::Add(CountryModel::new(0, "Country2"))),
            ])
            .await
            .unwrap();
        assert_eq!(affected, 2);

        let countries = EntityStore::<CountryModel>::fetch_all(&database).await.unwrap();
        assert_eq!(
            countries,
            vec![
                CountryModel::new(1, "Country1"),
                CountryModel::new(2, "Country2")
            ]
        );
    }

    #[tokio::test]
    async fn test_explicit_ids_advance_the_sequence() {
        let database = InMemoryDatabase::new();
        database
            .commit(vec![
                StagedChange::Country(Change::Add(CountryModel::new(5, "Five"))),
                StagedChange::Country(Change::Add(CountryModel::new(0, "Next"))),
            ])
            .await
            .unwrap();

        let next = EntityStore::<CountryModel>::fetch_by_id(&database, 6).await.unwrap();
        assert_eq!(next.unwrap().name, "Next");
    }

    #[tokio::test]
    async fn test_exhausted_sequence_rejects_commit() {
        let database =
            InMemoryDatabase::with_data(vec![CountryModel::new(i32::MAX, "Max")], vec![]);

        let result = database
            .commit(vec![
                StagedChange::Country(Change::Add(CountryModel::new(1, "Country1"))),
                StagedChange::Country(Change::Add(CountryModel::new(0, "Next"))),
            ])
            .await;

        assert!(matches!(result, Err(AppError::PersistenceError(_))));
        assert_eq!(database.row_counts().await, (1, 0));
    }

    #[tokio::test]
    async fn test_exhausted_state_sequence_rejects_commit() {
        let database = InMemoryDatabase::with_data(
            vec![CountryModel::new(1, "Country1")],
            vec![StateModel::new(i32::MAX, "Max", 1)],
        );

        let result = database
            .commit(vec![StagedChange::State(Change::Add(StateModel::new(
                0, "Next", 1,
            )))])
            .await;

        assert!(matches!(result, Err(AppError::PersistenceError(_))));
        assert_eq!(database.row_counts().await, (1, 1));
    }

    #[tokio::test]
    async fn test_fetch_by_country_returns_owned_states_in_id_order() {
        let database = InMemoryDatabase::with_data(
            vec![
                CountryModel::new(1, "Country1"),
                CountryModel::new(2, "Country2"),
            ],
            vec![
                StateModel::new(3, "State3", 1),
                StateModel::new(1, "State1", 1),
                StateModel::new(2, "State2", 2),
            ],
        );

        let states = database.fetch_by_country(1).await.unwrap();
        let ids: Vec<_> = states.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(database.fetch_by_country(9).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_key_rejects_whole_commit() {
        let database = InMemoryDatabase::with_data(vec![CountryModel::new(1, "Country1")], vec![]);

        let result = database
            .commit(vec![
                StagedChange::Country(Change::Add(CountryModel::new(2, "Country2"))),
                StagedChange::Country(Change::Add(CountryModel::new(1, "Again"))),
            ])
            .await;
        assert!(matches!(result, Err(AppError::PersistenceError(_))));
        assert_eq!(database.row_counts().await, (1, 0));
    }

    #[tokio::test]
    async fn test_state_update_must_reference_existing_country() {
        let database = InMemoryDatabase::with_data(
            vec![CountryModel::new(1, "Country1")],
            vec![StateModel::new(1, "State1", 1)],
        );

        let result = database
            .commit(vec![StagedChange::State(Change::Update(StateModel::new(
                1, "State1", 9,
            )))])
            .await;
        assert!(matches!(result, Err(AppError::PersistenceError(_))));

        let state = EntityStore::<StateModel>::fetch_by_id(&database, 1).await.unwrap();
        assert_eq!(state.unwrap().country_id, 1);
    }

    #[tokio::test]
    async fn test_country_and_state_added_in_one_commit() {
        let database = InMemoryDatabase::new();
        let affected = database
            .commit(vec![
                StagedChange::Country(Change::Add(CountryModel::new(7, "Country7"))),
                StagedChange::State(Change::Add(StateModel::new(0, "State1", 7))),
            ])
            .await
            .unwrap();

        assert_eq!(affected, 2);
        assert_eq!(database.row_counts().await, (1, 1));
    }
}
