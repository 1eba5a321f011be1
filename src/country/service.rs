use tracing::{debug, info, instrument};

use super::types::CountryDto;
use crate::data::{entities::CountryModel, UnitOfWork};
use crate::shared::AppError;

/// Service for handling country business logic
pub struct CountryService {
    unit_of_work: Box<dyn UnitOfWork>,
}

impl CountryService {
    pub fn new(unit_of_work: Box<dyn UnitOfWork>) -> Self {
        Self { unit_of_work }
    }

    /// Lists all countries
    #[instrument(skip(self))]
    pub async fn get_countries(&self) -> Result<Vec<CountryDto>, AppError> {
        let countries = self.unit_of_work.country_repository().get_all().await?;
        debug!(country_count = countries.len(), "Countries retrieved");

        Ok(countries.into_iter().map(CountryDto::from).collect())
    }

    /// Gets one country, failing with `NotFound` when the id is unknown
    #[instrument(skip(self))]
    pub async fn get_country_by_id(&self, id: i32) -> Result<CountryDto, AppError> {
        self.unit_of_work
            .country_repository()
            .get_by_id(id)
            .await?
            .map(CountryDto::from)
            .ok_or_else(|| AppError::NotFound(format!("Country {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn add_country(&self, country: CountryDto) -> Result<(), AppError> {
        self.unit_of_work
            .country_repository()
            .add(CountryModel::from(country))
            .await?;
        let affected = self.unit_of_work.save().await?;

        info!(affected, "Country added");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn update_country(&self, country: CountryDto) -> Result<(), AppError> {
        self.unit_of_work
            .country_repository()
            .update(CountryModel::from(country))
            .await?;
        let affected = self.unit_of_work.save().await?;

        info!(affected, "Country updated");
        Ok(())
    }

    /// Deletes a country and, by cascade, its states; unknown ids are a no-op
    #[instrument(skip(self))]
    pub async fn delete_country(&self, id: i32) -> Result<(), AppError> {
        self.unit_of_work.country_repository().delete(id).await?;
        let affected = self.unit_of_work.save().await?;

        info!(affected, "Country deleted");
        Ok(())
    }
}
