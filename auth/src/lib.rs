//! Authentication utilities library
//!
//! Provides the credential primitives used by the account service:
//! - Password hashing (Argon2id, configurable work factor)
//! - Signed, time-bounded access tokens (HS256 JWT)
//! - Authentication coordination
//!
//! Everything here is synchronous and CPU-bound; callers running on an async
//! runtime should move hashing onto a blocking thread.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! assert!(!hasher.verify("other", &hash));
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::Authenticator;
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!");
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and issue token
//! let token = auth.authenticate("password123", &hash, "Alice").unwrap();
//!
//! // Validate token
//! let claims = auth.validate_token(&token).unwrap();
//! assert_eq!(claims.name, "Alice");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use authenticator::TOKEN_LIFETIME_HOURS;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::HashingParams;
pub use password::PasswordError;
pub use password::PasswordHasher;
