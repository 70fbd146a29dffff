use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;

use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::Password;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::DEFAULT_LEVEL;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for the authentication workflow.
///
/// Concrete implementation of UserServicePort with dependency injection.
/// Password hashing and verification run on the blocking pool.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User directory implementation
    /// * `authenticator` - Password hasher and token signer
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    async fn hash_password(&self, password: Password) -> Result<String, UserError> {
        let authenticator = Arc::clone(&self.authenticator);

        tokio::task::spawn_blocking(move || authenticator.hash_password(password.as_str()))
            .await
            .map_err(|e| UserError::Unknown(format!("Password hashing task failed: {}", e)))?
            .map_err(|e| UserError::Unknown(format!("Password hashing failed: {}", e)))
    }
}

/// Pull the token out of an `Authorization` header value.
fn bearer_token(header: &str) -> Option<&str> {
    let mut segments = header.split_whitespace();
    match (segments.next(), segments.next()) {
        (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("Bearer") => Some(token),
        _ => None,
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, command: RegisterCommand) -> Result<User, UserError> {
        if self
            .repository
            .find_by_username(&command.username)
            .await?
            .is_some()
        {
            tracing::info!(username = %command.username, "Registration rejected: duplicate username");
            return Err(UserError::UsernameAlreadyExists(
                command.username.to_string(),
            ));
        }

        let password_hash = self.hash_password(command.password).await?;

        let user = self
            .repository
            .create(NewUser {
                username: command.username,
                name: command.name,
                email: command.email,
                password_hash,
                level: DEFAULT_LEVEL.to_string(),
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");

        Ok(user)
    }

    async fn login(&self, command: LoginCommand) -> Result<String, UserError> {
        let Some(user) = self.repository.find_by_username(&command.username).await? else {
            tracing::warn!(username = %command.username, "Login failed: unknown username");
            return Err(UserError::InvalidCredentials);
        };

        let authenticator = Arc::clone(&self.authenticator);
        let password = command.password;
        let User {
            username,
            name,
            password_hash,
            ..
        } = user;

        let token = tokio::task::spawn_blocking(move || {
            authenticator.authenticate(password.as_str(), &password_hash, &name)
        })
        .await
        .map_err(|e| UserError::Unknown(format!("Password verification task failed: {}", e)))?
        .map_err(|e| match e {
            AuthenticationError::InvalidCredentials => {
                tracing::warn!(username = %username, "Login failed: password mismatch");
                UserError::InvalidCredentials
            }
            other => UserError::Unknown(format!("Token generation failed: {}", other)),
        })?;

        tracing::info!(username = %username, "User logged in");

        Ok(token)
    }

    fn verify_token(&self, authorization: Option<&str>) -> Result<auth::Claims, UserError> {
        let token = authorization
            .and_then(bearer_token)
            .ok_or(UserError::InvalidToken)?;

        self.authenticator.validate_token(token).map_err(|e| {
            tracing::debug!(error = %e, "Token rejected");
            UserError::InvalidToken
        })
    }

    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        self.repository.list_all().await
    }

    async fn find_users_by_id(&self, id: UserId) -> Result<Vec<User>, UserError> {
        Ok(self.repository.find_by_id(id).await?.into_iter().collect())
    }
}
