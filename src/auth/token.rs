use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, instrument};

use super::types::TokenClaims;
use crate::config::JwtSettings;
use crate::shared::AppError;

/// Validity window of every issued token
pub const TOKEN_LIFETIME_MINUTES: i64 = 60;

/// Minimum HS256 key length in bytes (256 bits)
pub const MIN_KEY_BYTES: usize = 32;

/// Issues and validates HS256 bearer tokens for a single issuer/audience pair
#[derive(Clone)]
pub struct TokenIssuer {
    issuer: String,
    audience: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl TokenIssuer {
    pub fn new(settings: JwtSettings) -> Result<Self, AppError> {
        if settings.key.is_empty() {
            return Err(AppError::ConfigurationError(
                "JWT signing key is missing".to_string(),
            ));
        }
        if settings.key.len() < MIN_KEY_BYTES {
            return Err(AppError::ConfigurationError(format!(
                "JWT signing key must be at least {} bytes, got {}",
                MIN_KEY_BYTES,
                settings.key.len()
            )));
        }
        if settings.issuer.is_empty() {
            return Err(AppError::ConfigurationError(
                "JWT issuer is missing".to_string(),
            ));
        }
        if settings.audience.is_empty() {
            return Err(AppError::ConfigurationError(
                "JWT audience is missing".to_string(),
            ));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(settings.key.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.key.as_bytes()),
            issuer: settings.issuer,
            audience: settings.audience,
            lifetime: Duration::minutes(TOKEN_LIFETIME_MINUTES),
        })
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Creates a signed token whose subject is `username`, valid from now
    pub fn generate_token(&self, username: &str) -> Result<String, AppError> {
        self.generate_token_at(username, Utc::now())
    }

    /// Creates a signed token as if issued at `issued_at`
    #[instrument(skip(self, username))]
    pub fn generate_token_at(
        &self,
        username: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let exp = (issued_at + self.lifetime).timestamp() as usize;

        debug!(
            lifetime_minutes = self.lifetime.num_minutes(),
            exp_timestamp = exp,
            "Creating JWT token with expiration"
        );

        let claims = TokenClaims {
            sub: username.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            exp,
            iat: issued_at.timestamp() as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            debug!(error = %e, "Failed to encode JWT token");
            AppError::JwtError(e.to_string())
        })
    }

    /// Verifies signature, issuer, audience and expiry, then returns the claims
    #[instrument(skip(self, token))]
    pub fn validate_token(&self, token: &str) -> Result<TokenClaims, AppError> {
        debug!("Decoding and validating JWT token");

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = 0;

        decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| {
                debug!(
                    subject = %data.claims.sub,
                    exp = data.claims.exp,
                    "JWT token decoded successfully"
                );
                data.claims
            })
            .map_err(|e| {
                debug!(error = %e, "Failed to decode JWT token");
                AppError::Unauthorized(e.to_string())
            })
    }
}
