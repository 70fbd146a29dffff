use async_trait::async_trait;
use sqlx::FromRow;
use sqlx::PgPool;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

const USERNAME_UNIQUE_CONSTRAINT: &str = "tb_users_username_key";

/// Row shape of `tb_users`; `password` holds the hash.
#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    name: String,
    email: String,
    password: String,
    level: String,
}

/// Stored rows are trusted: a value accepted under older validation rules
/// must still load.
impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId(row.id),
            username: Username::from_stored(row.username),
            name: row.name,
            email: EmailAddress::from_stored(row.email),
            password_hash: row.password,
            level: row.level,
        }
    }
}

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO tb_users (username, name, email, password, level)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(user.username.as_str())
        .bind(&user.name)
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(&user.level)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation()
                    && db_err.constraint() == Some(USERNAME_UNIQUE_CONSTRAINT)
                {
                    return UserError::UsernameAlreadyExists(user.username.as_str().to_string());
                }
            }
            UserError::DatabaseError(e.to_string())
        })?;

        Ok(user.with_id(UserId(id)))
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, name, email, password, level
            FROM tb_users
            WHERE username = $1
            "#,
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await
        .map(|row| row.map(User::from))
        .map_err(|e| UserError::DatabaseError(e.to_string()))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, name, email, password, level
            FROM tb_users
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map(|row| row.map(User::from))
        .map_err(|e| UserError::DatabaseError(e.to_string()))
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, name, email, password, level
            FROM tb_users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map(|rows| rows.into_iter().map(User::from).collect())
        .map_err(|e| UserError::DatabaseError(e.to_string()))
    }
}
