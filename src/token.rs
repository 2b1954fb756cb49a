//! Stateless bearer token issuance and verification.

use crate::db::{Role, User, now_timestamp};
use crate::error::{AppError, Result};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Signed claim set carried by a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: String,
    /// User email.
    pub email: String,
    /// User display name.
    pub name: String,
    /// User role.
    pub role: Role,
    /// Issued-at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

/// Verified identity extracted from a token.
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    /// User ID.
    pub id: String,
    /// User email.
    pub email: String,
    /// User display name.
    pub name: String,
    /// User role.
    pub role: Role,
}

/// Signs and verifies bearer tokens with a server-held secret.
///
/// Issuance is stateless: there is no server-side session table, so a token
/// cannot be revoked before it expires. The expiry must stay equal to the
/// cookie max-age used at the transport boundary.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_days: u32,
}

impl TokenIssuer {
    /// Create a new token issuer.
    pub fn new(secret: &str, token_days: u32) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_days,
        }
    }

    /// Token lifetime in days.
    pub fn token_days(&self) -> u32 {
        self.token_days
    }

    /// Sign a claim set for the given user.
    pub fn sign(&self, user: &User) -> Result<String> {
        let iat = now_timestamp();
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            iat,
            exp: iat + self.token_days as i64 * 24 * 60 * 60,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Verify a token and return the identity it asserts.
    pub fn verify(&self, token: &str) -> Result<Identity> {
        let validation = Validation::new(Algorithm::HS256);

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| AppError::Unauthenticated("Invalid or expired token".to_string()))?;

        Ok(Identity {
            id: data.claims.sub,
            email: data.claims.email,
            name: data.claims.name,
            role: data.claims.role,
        })
    }
}
