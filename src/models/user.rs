//! User model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::AppError;

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

// SQLx conversions: roles are stored as plain text
impl sqlx::Type<Postgres> for Role {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for Role {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for Role {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct UserQuery {
    /// Substring match on first or last name
    pub name: Option<String>,
    /// Exact match on email
    pub email: Option<String>,
}

/// Create user request (admin directory)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 1, message = "First name is required"))]
    pub firstname: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub lastname: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub role: Option<Role>,
}

/// Update user request (admin directory)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// Self-service registration request. Role is always `student`;
/// promotions go through the admin directory.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUser {
    #[validate(length(min = 1, message = "First name is required"))]
    pub firstname: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub lastname: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// JWT claims for authenticated users.
///
/// The token is the only session state: it is issued at login or
/// registration and verified (signature and expiry) on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User email
    pub sub: String,
    pub user_id: i32,
    pub role: Role,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Create a new signed token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Decode and verify a token (signature and expiry)
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Administrator privileges required".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use validator::Validate;

    fn claims(exp_offset_secs: i64) -> Claims {
        let now = Utc::now().timestamp();
        Claims {
            sub: "jean.dupont@univ.example".to_string(),
            user_id: 7,
            role: Role::Student,
            firstname: Some("Jean".to_string()),
            lastname: Some("Dupont".to_string()),
            exp: now + exp_offset_secs,
            iat: now,
        }
    }

    #[test]
    fn token_round_trip_preserves_identity() {
        let claims = claims(3600);
        let token = claims.create_token("test-secret").unwrap();
        let decoded = Claims::from_token(&token, "test-secret").unwrap();
        assert_eq!(decoded.user_id, 7);
        assert_eq!(decoded.role, Role::Student);
        assert_eq!(decoded.sub, "jean.dupont@univ.example");
    }

    #[test]
    fn token_with_wrong_secret_is_rejected() {
        let token = claims(3600).create_token("test-secret").unwrap();
        assert!(Claims::from_token(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        // Well past the default leeway
        let token = claims(-3600).create_token("test-secret").unwrap();
        assert!(Claims::from_token(&token, "test-secret").is_err());
    }

    #[test]
    fn require_admin_rejects_students() {
        let c = claims(3600);
        assert!(c.require_admin().is_err());
        let mut admin = claims(3600);
        admin.role = Role::Admin;
        assert!(admin.require_admin().is_ok());
    }

    #[test]
    fn create_user_validates_email_and_password() {
        let bad_email = CreateUser {
            firstname: "Jean".to_string(),
            lastname: "Dupont".to_string(),
            email: "not-an-email".to_string(),
            password: "secret1".to_string(),
            role: None,
        };
        assert!(bad_email.validate().is_err());

        let short_password = CreateUser {
            firstname: "Jean".to_string(),
            lastname: "Dupont".to_string(),
            email: "jean@univ.example".to_string(),
            password: "abc".to_string(),
            role: None,
        };
        assert!(short_password.validate().is_err());

        let ok = CreateUser {
            firstname: "Jean".to_string(),
            lastname: "Dupont".to_string(),
            email: "jean@univ.example".to_string(),
            password: "secret1".to_string(),
            role: None,
        };
        assert!(ok.validate().is_ok());
    }
}
