// Library crate for the country/state registry API
// This file exposes the public API for the binary and integration tests

pub mod auth;
pub mod config;
pub mod country;
pub mod data;
pub mod router;
pub mod shared;
pub mod state;

// Re-export commonly used types for easier access in tests
pub use auth::{TokenClaims, TokenIssuer};
pub use config::{AppConfig, JwtSettings};
pub use data::{InMemoryDatabase, PostgresDatabase, UnitOfWork, UnitOfWorkFactory};
pub use router::build_router;
pub use shared::{AppError, AppState};
