use crate::core::errors::LedgerViewError;
use crate::core::models::{CurrentUser, User, UserId};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // User ID
    #[serde(default)]
    pub username: String,
    pub exp: usize,
}

impl CurrentUser for Claims {
    fn current_user(&self) -> Result<User, LedgerViewError> {
        let id = self
            .sub
            .parse::<UserId>()
            .map_err(|_| LedgerViewError::Unauthorized(format!("Invalid subject: {}", self.sub)))?;
        Ok(User {
            id,
            username: self.username.clone(),
        })
    }
}

#[derive(Clone)]
pub struct JwtService {
    secret: String,
}

impl JwtService {
    pub fn new(secret: String) -> Self {
        JwtService { secret }
    }

    pub fn generate_token(&self, user: &User, ttl_secs: u64) -> Result<String, LedgerViewError> {
        let expiration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| (d.as_secs() + ttl_secs) as usize)
            .map_err(|e| LedgerViewError::InternalServerError(format!("Time error: {}", e)))?;

        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            exp: expiration,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| LedgerViewError::InternalServerError(format!("JWT encoding error: {}", e)))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, LedgerViewError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| LedgerViewError::Unauthorized(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }
}
