//! Authentication service: registration, login, token issuance

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{Claims, RegisterUser, Role, User},
    repository::Repository,
};

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored Argon2 hash
pub fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new student account and log it in
    pub async fn register(&self, request: RegisterUser) -> AppResult<(String, User)> {
        if self
            .repository
            .users
            .email_exists(&request.email, None)
            .await?
        {
            return Err(AppError::Conflict(
                "This email address is already in use".to_string(),
            ));
        }

        let password_hash = hash_password(&request.password)?;

        // Registration always creates a student; roles are granted
        // through the admin directory.
        let user = self
            .repository
            .users
            .create(
                &request.firstname,
                &request.lastname,
                &request.email,
                &password_hash,
                Role::Student,
            )
            .await?;

        let token = self.token_for_user(&user)?;
        Ok((token, user))
    }

    /// Authenticate by email and password, returning a signed token
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Unauthenticated("Invalid email or password".to_string()))?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthenticated(
                "Invalid email or password".to_string(),
            ));
        }

        let token = self.token_for_user(&user)?;
        Ok((token, user))
    }

    /// Current user profile for a verified set of claims
    pub async fn me(&self, claims: &Claims) -> AppResult<User> {
        self.repository.users.get_by_id(claims.user_id).await
    }

    /// Issue a signed token for the user
    pub fn token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = Claims {
            sub: user.email.clone(),
            user_id: user.id,
            role: user.role,
            firstname: Some(user.firstname.clone()),
            lastname: Some(user.lastname.clone()),
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }
}
