//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{NewUser, Registration, Role, User, UserClaims},
    repository::Repository,
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new account
    pub async fn register(&self, registration: Registration) -> AppResult<User> {
        let name = clean_name(&registration.name)?;

        if self.repository.users.email_exists(&registration.email).await? {
            return Err(AppError::Conflict("Email is already registered".to_string()));
        }

        // Admin self-registration only bootstraps the first admin
        if registration.role == Role::Admin
            && !self.config.allow_admin_registration
            && self.repository.users.role_exists(Role::Admin).await?
        {
            return Err(AppError::Authorization(
                "Admin accounts cannot be self-registered".to_string(),
            ));
        }

        let user = NewUser {
            name,
            email: registration.email.trim().to_string(),
            password_hash: hash_password(&registration.password)?,
            role: registration.role,
        };

        let created = self.repository.users.create(&user).await?;
        tracing::info!("Registered user id={} role={}", created.id, created.role);

        Ok(created)
    }

    /// Authenticate user by email and return a session token
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let user = match self.repository.users.get_by_email(email).await? {
            Some(user) => user,
            None => {
                tracing::warn!("Login failed: unknown email");
                return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
            }
        };

        if !verify_password(&user.password, password)? {
            tracing::warn!("Login failed: bad password for user id={}", user.id);
            return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        let token = self.issue_token(&user)?;
        tracing::info!("User id={} logged in", user.id);

        Ok((token, user))
    }

    /// Create a signed session token for a user
    pub fn issue_token(&self, user: &User) -> AppResult<String> {
        UserClaims::for_user(user, self.config.session_expiration_hours)
            .create_token(&self.config.session_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Change the credential, the only mutable user field
    pub async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = self.repository.users.get_by_id(user_id).await?;

        if !verify_password(&user.password, current_password)? {
            return Err(AppError::Authentication("Current password is incorrect".to_string()));
        }

        let hash = hash_password(new_password)?;
        self.repository.users.update_password(user_id, &hash).await?;
        tracing::info!("User id={} changed password", user_id);

        Ok(())
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }
}

/// Trimmed display name, 2 to 100 characters
pub fn clean_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if !(2..=100).contains(&name.chars().count()) {
        return Err(AppError::Validation(
            "Name must be between 2 and 100 characters".to_string(),
        ));
    }
    Ok(name.to_string())
}

/// Hash a password using Argon2 with a random salt
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC hash string
pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
