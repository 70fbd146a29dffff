use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// How long an issued token stays valid.
pub const TOKEN_LIFETIME_HOURS: i64 = 3;

/// Authentication coordinator combining password hashing and token handling.
///
/// The signing secret is fixed for the lifetime of the instance.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create an authenticator with the default hashing work factor.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for token signing
    pub fn new(jwt_secret: &[u8]) -> Self {
        Self::with_hasher(jwt_secret, PasswordHasher::new())
    }

    /// Create an authenticator around an already configured password hasher.
    pub fn with_hasher(jwt_secret: &[u8], password_hasher: PasswordHasher) -> Self {
        Self {
            password_hasher,
            jwt_handler: JwtHandler::new(jwt_secret),
        }
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a plaintext password against a stored hash.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> bool {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Verify credentials and issue a token for `name`.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match (or hash is malformed)
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        name: &str,
    ) -> Result<String, AuthenticationError> {
        if !self.verify_password(password, stored_hash) {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.issue_token(name)?)
    }

    /// Issue a token for `name`, valid from now.
    pub fn issue_token(&self, name: &str) -> Result<String, JwtError> {
        self.issue_token_at(name, Utc::now())
    }

    /// Issue a token for `name` as if it were issued at `issued_at`.
    pub fn issue_token_at(&self, name: &str, issued_at: DateTime<Utc>) -> Result<String, JwtError> {
        let claims = Claims::for_name(name, issued_at, Duration::hours(TOKEN_LIFETIME_HOURS));
        self.jwt_handler.encode(&claims)
    }

    /// Validate and decode a token.
    ///
    /// # Errors
    /// * `TokenExpired` - Token lifetime has elapsed
    /// * `InvalidToken` - Signature or format is wrong
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.jwt_handler.decode(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::HashingParams;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    fn authenticator() -> Authenticator {
        let hasher = PasswordHasher::with_params(HashingParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();
        Authenticator::with_hasher(SECRET, hasher)
    }

    #[test]
    fn test_authenticate_success() {
        let authenticator = authenticator();

        let hash = authenticator
            .hash_password("secret1")
            .expect("Failed to hash password");

        let token = authenticator
            .authenticate("secret1", &hash, "Ann")
            .expect("Authentication failed");

        let decoded = authenticator
            .validate_token(&token)
            .expect("Token validation failed");
        assert_eq!(decoded.name, "Ann");
        assert_eq!(decoded.exp - decoded.iat, TOKEN_LIFETIME_HOURS * 60 * 60);
    }

    #[test]
    fn test_authenticate_invalid_password() {
        let authenticator = authenticator();
        let hash = authenticator.hash_password("secret1").unwrap();

        let result = authenticator.authenticate("wrong", &hash, "Ann");
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_authenticate_malformed_hash() {
        let result = authenticator().authenticate("secret1", "not-a-hash", "Ann");
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_token_within_window() {
        let authenticator = authenticator();
        let issued_at = Utc::now() - Duration::hours(TOKEN_LIFETIME_HOURS) + Duration::minutes(5);

        let token = authenticator.issue_token_at("Ann", issued_at).unwrap();
        assert_eq!(authenticator.validate_token(&token).unwrap().name, "Ann");
    }

    #[test]
    fn test_token_past_expiry() {
        let authenticator = authenticator();
        let issued_at = Utc::now() - Duration::hours(TOKEN_LIFETIME_HOURS) - Duration::seconds(5);

        let token = authenticator.issue_token_at("Ann", issued_at).unwrap();
        assert!(matches!(
            authenticator.validate_token(&token),
            Err(JwtError::TokenExpired)
        ));
    }

    #[test]
    fn test_any_single_byte_mutation_invalidates() {
        let authenticator = authenticator();
        let token = authenticator.issue_token("Ann").unwrap();

        for index in 0..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[index] = if bytes[index] == b'A' { b'B' } else { b'A' };
            let mutated = String::from_utf8(bytes).unwrap();

            assert!(
                authenticator.validate_token(&mutated).is_err(),
                "mutation at byte {} was accepted",
                index
            );
        }
    }

    #[test]
    fn test_validate_token_from_other_secret() {
        let token = Authenticator::new(b"another_secret_key_at_least_32_bytes")
            .issue_token("Ann")
            .unwrap();

        assert!(authenticator().validate_token(&token).is_err());
    }
}
