//! User directory service (admin back-office)

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, Role, UpdateUser, User, UserQuery},
    repository::Repository,
    services::auth,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// List users with optional filters
    pub async fn list(&self, query: &UserQuery) -> AppResult<Vec<User>> {
        self.repository.users.list(query).await
    }

    /// Create a new user
    pub async fn create(&self, user: CreateUser) -> AppResult<User> {
        if self.repository.users.email_exists(&user.email, None).await? {
            return Err(AppError::Conflict(
                "This email address is already in use".to_string(),
            ));
        }

        let password_hash = auth::hash_password(&user.password)?;
        let role = user.role.unwrap_or(Role::Student);

        self.repository
            .users
            .create(
                &user.firstname,
                &user.lastname,
                &user.email,
                &password_hash,
                role,
            )
            .await
    }

    /// Update an existing user
    pub async fn update(&self, id: i32, user: UpdateUser) -> AppResult<User> {
        self.repository.users.get_by_id(id).await?;

        if let Some(ref email) = user.email {
            if self.repository.users.email_exists(email, Some(id)).await? {
                return Err(AppError::Conflict(
                    "This email address is already in use".to_string(),
                ));
            }
        }

        let password_hash = match user.password {
            Some(ref password) => Some(auth::hash_password(password)?),
            None => None,
        };

        self.repository
            .users
            .update(
                id,
                user.firstname.as_deref(),
                user.lastname.as_deref(),
                user.email.as_deref(),
                password_hash.as_deref(),
                user.role,
            )
            .await
    }

    /// Delete a user. Refused while the user has copies out on loan.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.users.get_by_id(id).await?;

        if self.repository.loans.user_has_active_loans(id).await? {
            return Err(AppError::Conflict(
                "User has active loans".to_string(),
            ));
        }

        self.repository.users.delete(id).await
    }
}
