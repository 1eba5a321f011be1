use serde::{Deserialize, Serialize};

use crate::data::entities::CountryModel;

/// Transfer shape for countries at the API boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryDto {
    #[serde(alias = "Id", default)]
    pub id: i32,
    #[serde(alias = "Name")]
    pub name: String,
}

impl From<CountryModel> for CountryDto {
    fn from(model: CountryModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

impl From<CountryDto> for CountryModel {
    fn from(dto: CountryDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
        }
    }
}
