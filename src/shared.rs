use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::auth::TokenIssuer;
use crate::data::UnitOfWorkFactory;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub database: Arc<dyn UnitOfWorkFactory>,
    pub token_issuer: Arc<TokenIssuer>,
}

impl AppState {
    pub fn new(database: Arc<dyn UnitOfWorkFactory>, token_issuer: Arc<TokenIssuer>) -> Self {
        Self {
            database,
            token_issuer,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Persistence error: {0}")]
    PersistenceError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::JwtError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Token error: {}", msg),
            ),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::PersistenceError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Persistence error: {}", msg),
            ),
            AppError::ConfigurationError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Configuration error: {}", msg),
            ),
            AppError::InvalidState(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Invalid state: {}", msg),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

/// Converts a panic caught by `CatchPanicLayer` into a generic 500 response
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detailed = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic message".to_string()
    };

    error!(detailed = %detailed, "An unhandled exception occurred");

    let body = Json(json!({
        "statusCode": StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
        "message": "An error occurred while processing your request.",
        "detailed": detailed
    }));

    (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
}

#[cfg(test)]
pub mod test_utils {
    use super::*;
    use crate::config::JwtSettings;
    use crate::data::entities::CountryModel;
    use crate::data::{InMemoryDatabase, Repository, SessionUnitOfWork, StateRepository, UnitOfWork};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub const TEST_KEY: &str = "test-signing-key-that-is-at-least-32-bytes";
    pub const TEST_ISSUER: &str = "geo-registry-tests";
    pub const TEST_AUDIENCE: &str = "geo-registry-clients";

    pub fn test_settings() -> JwtSettings {
        JwtSettings {
            key: TEST_KEY.to_string(),
            issuer: TEST_ISSUER.to_string(),
            audience: TEST_AUDIENCE.to_string(),
        }
    }

    pub fn test_token_issuer() -> TokenIssuer {
        TokenIssuer::new(test_settings()).unwrap()
    }

    /// Unit of work over an in-memory database that counts `save` calls
    pub struct RecordingUnitOfWork {
        inner: SessionUnitOfWork,
        saves: Arc<AtomicUsize>,
    }

    impl RecordingUnitOfWork {
        pub fn new(database: &InMemoryDatabase) -> (Self, Arc<AtomicUsize>) {
            let saves = Arc::new(AtomicUsize::new(0));
            let unit_of_work = Self {
                inner: SessionUnitOfWork::new(Arc::new(database.clone())),
                saves: Arc::clone(&saves),
            };
            (unit_of_work, saves)
        }
    }

    #[async_trait]
    impl UnitOfWork for RecordingUnitOfWork {
        fn country_repository(&self) -> &dyn Repository<CountryModel> {
            self.inner.country_repository()
        }

        fn state_repository(&self) -> &dyn StateRepository {
            self.inner.state_repository()
        }

        async fn save(&self) -> Result<u64, AppError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.inner.save().await
        }

        fn dispose(&self) {
            self.inner.dispose()
        }
    }

    /// Builder for creating AppState with overrides for testing
    pub struct AppStateBuilder {
        database: Option<Arc<dyn UnitOfWorkFactory>>,
        token_issuer: Option<Arc<TokenIssuer>>,
    }

    impl AppStateBuilder {
        pub fn new() -> Self {
            Self {
                database: None,
                token_issuer: None,
            }
        }

        pub fn with_database(mut self, database: Arc<dyn UnitOfWorkFactory>) -> Self {
            self.database = Some(database);
            self
        }

        pub fn with_token_issuer(mut self, token_issuer: Arc<TokenIssuer>) -> Self {
            self.token_issuer = Some(token_issuer);
            self
        }

        pub fn build(self) -> AppState {
            AppState {
                database: self
                    .database
                    .unwrap_or_else(|| Arc::new(InMemoryDatabase::new())),
                token_issuer: self
                    .token_issuer
                    .unwrap_or_else(|| Arc::new(test_token_issuer())),
            }
        }
    }

    impl Default for AppStateBuilder {
        fn default() -> Self {
            Self::new()
        }
    }
}
