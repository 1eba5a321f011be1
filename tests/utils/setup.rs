use axum::Router;
use std::sync::Arc;

use geo_registry::{
    build_router,
    data::entities::{CountryModel, StateModel},
    AppState, InMemoryDatabase, JwtSettings, TokenIssuer,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub const TEST_KEY: &str = "integration-test-signing-key-0123456789";
pub const TEST_ISSUER: &str = "geo-registry";
pub const TEST_AUDIENCE: &str = "geo-registry-clients";

pub fn test_settings() -> JwtSettings {
    JwtSettings {
        key: TEST_KEY.to_string(),
        issuer: TEST_ISSUER.to_string(),
        audience: TEST_AUDIENCE.to_string(),
    }
}

pub struct TestSetup {
    pub app: Router,
    pub database: InMemoryDatabase,
    pub token_issuer: Arc<TokenIssuer>,
}

pub struct TestSetupBuilder {
    countries: Vec<CountryModel>,
    states: Vec<StateModel>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            countries: vec![],
            states: vec![],
        }
    }

    pub fn with_countries(mut self, countries: Vec<(i32, &str)>) -> Self {
        self.countries = countries
            .into_iter()
            .map(|(id, name)| CountryModel::new(id, name))
            .collect();
        self
    }

    pub fn with_states(mut self, states: Vec<(i32, &str, i32)>) -> Self {
        self.states = states
            .into_iter()
            .map(|(id, name, country_id)| StateModel::new(id, name, country_id))
            .collect();
        self
    }

    /// Countries [{1,"Country1"},{2,"Country2"}]
    pub fn with_two_countries(self) -> Self {
        self.with_countries(vec![(1, "Country1"), (2, "Country2")])
    }

    /// Two countries with two states in Country1 and one in Country2
    pub fn with_countries_and_states(self) -> Self {
        self.with_two_countries().with_states(vec![
            (1, "State1", 1),
            (2, "State2", 1),
            (3, "State3", 2),
        ])
    }

    pub fn build(self) -> TestSetup {
        let database = InMemoryDatabase::with_data(self.countries, self.states);
        let token_issuer = Arc::new(TokenIssuer::new(test_settings()).unwrap());
        let app_state = AppState::new(Arc::new(database.clone()), Arc::clone(&token_issuer));

        TestSetup {
            app: build_router(app_state),
            database,
            token_issuer,
        }
    }
}
