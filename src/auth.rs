//! Authentication and user management.

use crate::db::{Database, Role, User, now_timestamp};
use crate::error::{AppError, Result};
use crate::token::{Identity, TokenIssuer};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use argon2::password_hash::rand_core::RngCore;
use serde::Serialize;

/// Hash a password using Argon2.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verify a password against a hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Generate a secure random secret (e.g. for token signing).
pub fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Registration result.
#[derive(Debug, Serialize)]
pub struct Registered {
    /// Confirmation message.
    pub message: String,
    /// The created user. The password hash is never serialized.
    pub user: User,
}

/// Authentication service.
pub struct AuthService {
    db: Database,
    tokens: TokenIssuer,
}

impl AuthService {
    /// Create a new auth service.
    pub fn new(db: Database, tokens: TokenIssuer) -> Self {
        Self { db, tokens }
    }

    /// Register a new user with the default USER role.
    pub fn register(&self, name: &str, email: &str, password: &str) -> Result<Registered> {
        let user = self.create_user(name, email, password, Role::User)?;

        Ok(Registered {
            message: "Successfully registered user".to_string(),
            user,
        })
    }

    /// Create a new user (also used by the operator CLI, which may pick the
    /// admin role).
    pub fn create_user(&self, name: &str, email: &str, password: &str, role: Role) -> Result<User> {
        if name.trim().is_empty() {
            return Err(AppError::Validation("Name must not be empty".to_string()));
        }

        validate_email(email)?;

        if password.len() < 6 {
            return Err(AppError::Validation(
                "Password must be at least 6 characters".to_string(),
            ));
        }

        if self.db.get_user_by_email(email)?.is_some() {
            return Err(AppError::Duplicate(format!(
                "Email '{}' is already registered",
                email
            )));
        }

        let password_hash = hash_password(password)?;
        let now = now_timestamp();

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
            role,
            created_at: now,
            updated_at: now,
        };

        self.db.create_user(&user)?;
        Ok(user)
    }

    /// Validate credentials and return the matching user.
    ///
    /// Unknown email and wrong password produce the same error, so callers
    /// cannot probe which addresses are registered.
    pub fn validate_user(&self, email: &str, password: &str) -> Result<User> {
        let user = self
            .db
            .get_user_by_email(email)?
            .ok_or_else(|| AppError::Unauthenticated("Invalid email or password".to_string()))?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthenticated(
                "Invalid email or password".to_string(),
            ));
        }

        Ok(user)
    }

    /// Issue a signed bearer token for a validated user. Stateless, no side
    /// effects beyond signing.
    pub fn login(&self, user: &User) -> Result<String> {
        self.tokens.sign(user)
    }

    /// Verify a bearer token and return the identity it asserts.
    pub fn verify_token(&self, token: &str) -> Result<Identity> {
        self.tokens.verify(token)
    }

    /// Token lifetime in days (kept equal to the cookie max-age).
    pub fn token_days(&self) -> u32 {
        self.tokens.token_days()
    }

    /// Delete a user by email.
    pub fn delete_user(&self, email: &str) -> Result<bool> {
        self.db.delete_user(email)
    }

    /// List all users.
    pub fn list_users(&self) -> Result<Vec<User>> {
        self.db.list_users()
    }
}

/// Syntactic email check: one `@`, non-empty local part, dotted domain.
fn validate_email(email: &str) -> Result<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "'{}' is not a valid email address",
            email
        )))
    }
}
