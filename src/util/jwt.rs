use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::JwtConfig;

/// Claims carried by a session token. `jti` is the session id held in the session store.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject (user ID, hex)
    pub sub: String,
    pub username: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    pub jti: String,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum JwtError {
    #[error("Failed to encode JWT token: {0}")]
    EncodingFailed(String),
    #[error("Failed to decode JWT token: {0}")]
    DecodingFailed(String),
    #[error("Token has expired")]
    TokenExpired,
    #[error("Invalid token format")]
    InvalidToken,
}

pub trait JwtTokenUtils {
    fn generate_session_token(
        &self,
        user_id: &str,
        username: &str,
        role: &str,
        session_id: &str,
    ) -> Result<String, JwtError>;
    fn validate_token(&self, token: &str) -> Result<Claims, JwtError>;
    fn extract_token_from_header(&self, auth_header: &str) -> Result<String, JwtError>;
    /// Seconds until a freshly issued token expires.
    fn expires_in(&self) -> i64;
}

#[derive(Debug, Clone)]
pub struct JwtTokenUtilsImpl {
    pub jwt_config: JwtConfig,
}

impl JwtTokenUtilsImpl {
    pub fn new(jwt_config: JwtConfig) -> Self {
        JwtTokenUtilsImpl { jwt_config }
    }
}

impl JwtTokenUtils for JwtTokenUtilsImpl {
    fn generate_session_token(
        &self,
        user_id: &str,
        username: &str,
        role: &str,
        session_id: &str,
    ) -> Result<String, JwtError> {
        debug!("Generating session token for user: {} with role: {}", user_id, role);

        let now = Utc::now();
        let expiration = now + Duration::minutes(self.jwt_config.session_expiration);
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            iss: self.jwt_config.jwt_issuer.clone(),
            jti: session_id.to_string(),
        };

        let encoding_key = EncodingKey::from_secret(self.jwt_config.jwt_secret.as_bytes());
        encode(&Header::new(Algorithm::HS256), &claims, &encoding_key)
            .map(|token| {
                info!("Issued session token for user: {}", user_id);
                token
            })
            .map_err(|err| {
                error!("Failed to encode JWT token: {}", err);
                JwtError::EncodingFailed(err.to_string())
            })
    }

    fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        debug!("Validating JWT token");

        let decoding_key = DecodingKey::from_secret(self.jwt_config.jwt_secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(ref issuer) = self.jwt_config.jwt_issuer {
            validation.set_issuer(&[issuer]);
        }

        match decode::<Claims>(token, &decoding_key, &validation) {
            Ok(data) => {
                let claims = data.claims;
                if claims.exp < Utc::now().timestamp() {
                    warn!("Token has expired for user: {}", claims.sub);
                    return Err(JwtError::TokenExpired);
                }
                debug!("Token validation successful for user: {}", claims.sub);
                Ok(claims)
            }
            Err(err) => match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    warn!("Token signature expired");
                    Err(JwtError::TokenExpired)
                }
                _ => {
                    warn!("Failed to decode JWT token: {}", err);
                    Err(JwtError::DecodingFailed(err.to_string()))
                }
            },
        }
    }

    fn extract_token_from_header(&self, auth_header: &str) -> Result<String, JwtError> {
        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or(JwtError::InvalidToken)?;
        if token.is_empty() {
            error!("Empty token in authorization header");
            return Err(JwtError::InvalidToken);
        }
        Ok(token.to_string())
    }

    fn expires_in(&self) -> i64 {
        self.jwt_config.session_expiration * 60
    }
}
