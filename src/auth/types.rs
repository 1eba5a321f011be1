use serde::{Deserialize, Serialize};

/// JWT claims carried by every bearer token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    pub sub: String, // Username the token was issued to
    pub iss: String,
    pub aud: String,
    pub exp: usize, // Expiration timestamp (standard JWT claim)
    pub iat: usize, // Issued at timestamp (standard JWT claim)
}

/// Login parameters, accepted from the query string or a JSON body
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "Username")]
    pub username: Option<String>,
}

/// Response structure for the login endpoint
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LoginResponse {
    #[serde(rename = "Token")]
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json;

    #[test]
    fn test_login_response_uses_token_field() {
        let response = LoginResponse {
            token: "jwt-token-here".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"Token":"jwt-token-here"}"#);
    }

    #[test]
    fn test_login_request_accepts_either_casing() {
        let lower: LoginRequest = serde_json::from_str(r#"{"username": "alice"}"#).unwrap();
        let pascal: LoginRequest = serde_json::from_str(r#"{"Username": "alice"}"#).unwrap();
        let empty: LoginRequest = serde_json::from_str("{}").unwrap();

        assert_eq!(lower.username.as_deref(), Some("alice"));
        assert_eq!(pascal.username.as_deref(), Some("alice"));
        assert!(empty.username.is_none());
    }
}
