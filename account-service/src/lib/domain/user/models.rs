use std::fmt;

use crate::user::errors::EmailError;
use crate::user::errors::UserError;
use crate::user::errors::UsernameError;

/// Role label given to every self-registered user.
pub const DEFAULT_LEVEL: &str = "user";

const ERROR_INPUT: &str = "Error input!";
const ERROR_EMAIL_FORMAT: &str = "Error email format !";
const ERROR_PASSWORD_LENGTH: &str = "Password must be 6 or more characters long.";
const ERROR_MISSING_USERNAME: &str = "Please input your username";
const ERROR_MISSING_PASSWORD: &str = "Please input your password";

/// User aggregate entity.
///
/// Represents a registered user as stored in the directory. Only the
/// password hash is ever held here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub name: String,
    pub email: EmailAddress,
    pub password_hash: String,
    pub level: String,
}

/// User record ready to be inserted; the directory assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: Username,
    pub name: String,
    pub email: EmailAddress,
    pub password_hash: String,
    pub level: String,
}

impl NewUser {
    /// Attach the id assigned by the directory.
    pub fn with_id(self, id: UserId) -> User {
        User {
            id,
            username: self.username,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            level: self.level,
        }
    }
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

impl UserId {
    /// Parse a user ID from a path segment.
    ///
    /// # Errors
    /// * `InvalidUserId` - String is not an integer
    pub fn from_string(s: &str) -> Result<Self, UserError> {
        s.trim()
            .parse::<i64>()
            .map(UserId)
            .map_err(|e| UserError::InvalidUserId(e.to_string()))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Always trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Create a new valid username.
    ///
    /// # Errors
    /// * `Empty` - Username is empty once surrounding whitespace is removed
    pub fn new(username: &str) -> Result<Self, UsernameError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(UsernameError::Empty);
        }
        Ok(Self(username.to_string()))
    }

    /// Wrap a username read back from the user directory as-is.
    pub(crate) fn from_stored(username: String) -> Self {
        Self(username)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Trimmed, then validated as a bare `local@domain.tld` address: no display
/// name, no quoted local part, no IP domain literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email is not a plain address with a dotted domain
    pub fn new(email: &str) -> Result<Self, EmailError> {
        let email = email.trim();
        let options = email_address::Options::default()
            .without_display_text()
            .without_domain_literal()
            .with_required_tld();

        let parsed = email_address::EmailAddress::parse_with_options(email, options)
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))?;
        if parsed.local_part().starts_with('"') {
            return Err(EmailError::InvalidFormat(
                "quoted local part not allowed".to_string(),
            ));
        }

        Ok(EmailAddress(email.to_string()))
    }

    /// Wrap an address read back from the user directory.
    ///
    /// Stored rows predate any tightening of the rules above, so they are not
    /// validated again.
    pub(crate) fn from_stored(email: String) -> Self {
        EmailAddress(email)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Raw password as received from the client.
///
/// Lives only for the duration of a request and is never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub const MIN_LENGTH: usize = 6;

    pub fn new(password: String) -> Self {
        Self(password)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_long_enough(&self) -> bool {
        self.0.chars().count() >= Self::MIN_LENGTH
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

fn present(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.trim().is_empty())
}

/// Command to register a new user with validated fields
#[derive(Debug)]
pub struct RegisterCommand {
    pub name: String,
    pub username: Username,
    pub email: EmailAddress,
    pub password: Password,
}

impl RegisterCommand {
    /// Validate raw registration input.
    ///
    /// Checks run in a fixed order and the first failure wins: every field
    /// present, then email format, then password length.
    ///
    /// # Errors
    /// * `Validation` - Carries the message for the first failed check
    pub fn parse(
        name: Option<String>,
        username: Option<String>,
        password: Option<String>,
        email: Option<String>,
    ) -> Result<Self, UserError> {
        let (Some(name), Some(username), Some(password), Some(email)) = (
            present(name),
            present(username),
            present(password),
            present(email),
        ) else {
            return Err(UserError::Validation(ERROR_INPUT.to_string()));
        };

        let email = EmailAddress::new(&email)
            .map_err(|_| UserError::Validation(ERROR_EMAIL_FORMAT.to_string()))?;

        let password = Password::new(password);
        if !password.is_long_enough() {
            return Err(UserError::Validation(ERROR_PASSWORD_LENGTH.to_string()));
        }

        let username =
            Username::new(&username).map_err(|_| UserError::Validation(ERROR_INPUT.to_string()))?;

        Ok(Self {
            name: name.trim().to_string(),
            username,
            email,
            password,
        })
    }
}

/// Command to log a user in
#[derive(Debug)]
pub struct LoginCommand {
    pub username: Username,
    pub password: Password,
}

impl LoginCommand {
    /// Validate raw login input; username is checked before password.
    ///
    /// # Errors
    /// * `Validation` - A field is missing or blank
    pub fn parse(username: Option<String>, password: Option<String>) -> Result<Self, UserError> {
        let username = present(username)
            .and_then(|username| Username::new(&username).ok())
            .ok_or_else(|| UserError::Validation(ERROR_MISSING_USERNAME.to_string()))?;

        let password = present(password)
            .map(Password::new)
            .ok_or_else(|| UserError::Validation(ERROR_MISSING_PASSWORD.to_string()))?;

        Ok(Self { username, password })
    }
}
