use async_trait::async_trait;

use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::models::Username;

/// Port for the authentication workflow and user listing.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new user.
    ///
    /// No token is issued on registration.
    ///
    /// # Returns
    /// Created user entity
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `DatabaseError` - Directory operation failed
    /// * `Unknown` - Password hashing failed
    async fn register(&self, command: RegisterCommand) -> Result<User, UserError>;

    /// Check credentials and issue an access token.
    ///
    /// # Returns
    /// Signed token carrying the user's display name
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown username or wrong password
    /// * `DatabaseError` - Directory operation failed
    async fn login(&self, command: LoginCommand) -> Result<String, UserError>;

    /// Verify the token carried in an `Authorization: Bearer <token>` header.
    ///
    /// # Returns
    /// Decoded claims
    ///
    /// # Errors
    /// * `InvalidToken` - Header missing or malformed, or token rejected
    fn verify_token(&self, authorization: Option<&str>) -> Result<auth::Claims, UserError>;

    /// Retrieve every registered user.
    ///
    /// # Errors
    /// * `DatabaseError` - Directory operation failed
    async fn list_users(&self) -> Result<Vec<User>, UserError>;

    /// Retrieve the users matching `id` (zero or one).
    ///
    /// # Errors
    /// * `DatabaseError` - Directory operation failed
    async fn find_users_by_id(&self, id: UserId) -> Result<Vec<User>, UserError>;
}

/// Persistence operations for the user directory.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Insert a user unless the username is taken.
    ///
    /// # Returns
    /// Created user entity with its assigned id
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: NewUser) -> Result<User, UserError>;

    /// Retrieve user by username.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserError>;

    /// Retrieve all users from storage.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_all(&self) -> Result<Vec<User>, UserError>;
}
