use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::session::{Change, StagedChange};

/// A persistent record addressed by an integer primary key
pub trait Entity: Clone + Send + Sync + 'static {
    /// Human readable entity name used in logs and error messages
    const NAME: &'static str;

    fn id(&self) -> i32;

    /// Tags a change to this entity type for the shared change log
    fn stage(change: Change<Self>) -> StagedChange;
}

/// Database model for countries table
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct CountryModel {
    pub id: i32,
    pub name: String,
}

impl CountryModel {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl Entity for CountryModel {
    const NAME: &'static str = "Country";

    fn id(&self) -> i32 {
        self.id
    }

    fn stage(change: Change<Self>) -> StagedChange {
        StagedChange::Country(change)
    }
}

/// Database model for states table; `country_id` references the owning country
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct StateModel {
    pub id: i32,
    pub name: String,
    pub country_id: i32,
}

impl StateModel {
    pub fn new(id: i32, name: impl Into<String>, country_id: i32) -> Self {
        Self {
            id,
            name: name.into(),
            country_id,
        }
    }

    /// Check if this state belongs to the given country
    pub fn belongs_to(&self, country_id: i32) -> bool {
        self.country_id == country_id
    }
}

impl Entity for StateModel {
    const NAME: &'static str = "State";

    fn id(&self) -> i32 {
        self.id
    }

    fn stage(change: Change<Self>) -> StagedChange {
        StagedChange::State(change)
    }
}
