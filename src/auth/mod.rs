// Public API - what other modules can use
pub use handlers::login;
pub use middleware::jwt_auth;
pub use token::{TokenIssuer, MIN_KEY_BYTES, TOKEN_LIFETIME_MINUTES};
pub use types::{LoginRequest, LoginResponse, TokenClaims};

// Internal modules
mod handlers;
mod middleware;
mod token;
mod types;
