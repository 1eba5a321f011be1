use tracing::{debug, info, instrument};

use super::types::StateDto;
use crate::data::{entities::StateModel, UnitOfWork};
use crate::shared::AppError;

/// Service for handling state business logic
pub struct StateService {
    unit_of_work: Box<dyn UnitOfWork>,
}

impl StateService {
    pub fn new(unit_of_work: Box<dyn UnitOfWork>) -> Self {
        Self { unit_of_work }
    }

    #[instrument(skip(self))]
    pub async fn get_states(&self) -> Result<Vec<StateDto>, AppError> {
        let states = self.unit_of_work.state_repository().get_all().await?;
        debug!(state_count = states.len(), "States retrieved");

        Ok(states.into_iter().map(StateDto::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_state_by_id(&self, id: i32) -> Result<StateDto, AppError> {
        self.unit_of_work
            .state_repository()
            .get_by_id(id)
            .await?
            .map(StateDto::from)
            .ok_or_else(|| AppError::NotFound(format!("State {} not found", id)))
    }

    /// Lists the states owned by a country
    #[instrument(skip(self))]
    pub async fn get_states_by_country(&self, country_id: i32) -> Result<Vec<StateDto>, AppError> {
        if self
            .unit_of_work
            .country_repository()
            .get_by_id(country_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!(
                "Country {} not found",
                country_id
            )));
        }

        let states = self
            .unit_of_work
            .state_repository()
            .get_by_country(country_id)
            .await?;
        debug!(state_count = states.len(), "States retrieved for country");

        Ok(states.into_iter().map(StateDto::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn add_state(&self, state: StateDto) -> Result<(), AppError> {
        self.unit_of_work
            .state_repository()
            .add(StateModel::from(state))
            .await?;
        let affected = self.unit_of_work.save().await?;

        info!(affected, "State added");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn update_state(&self, state: StateDto) -> Result<(), AppError> {
        self.unit_of_work
            .state_repository()
            .update(StateModel::from(state))
            .await?;
        let affected = self.unit_of_work.save().await?;

        info!(affected, "State updated");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_state(&self, id: i32) -> Result<(), AppError> {
        self.unit_of_work.state_repository().delete(id).await?;
        let affected = self.unit_of_work.save().await?;

        info!(affected, "State deleted");
        Ok(())
    }
}
