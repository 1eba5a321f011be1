use serde::{Deserialize, Serialize};

use crate::data::entities::StateModel;

/// Transfer shape for states at the API boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDto {
    #[serde(alias = "Id", default)]
    pub id: i32,
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(alias = "CountryId")]
    pub country_id: i32,
}

impl From<StateModel> for StateDto {
    fn from(model: StateModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            country_id: model.country_id,
        }
    }
}

impl From<StateDto> for StateModel {
    fn from(dto: StateDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            country_id: dto.country_id,
        }
    }
}
