#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;

use account_service::domain::user::models::NewUser;
use account_service::domain::user::models::User;
use account_service::domain::user::models::UserId;
use account_service::domain::user::models::Username;
use account_service::domain::user::ports::UserRepository;
use account_service::domain::user::service::UserService;
use account_service::inbound::http::router::create_router;
use account_service::user::errors::UserError;
use async_trait::async_trait;
use auth::Authenticator;
use auth::HashingParams;
use auth::PasswordHasher;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// User directory kept in memory; insertion is atomic under the lock.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn snapshot(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == user.username) {
            return Err(UserError::UsernameAlreadyExists(
                user.username.as_str().to_string(),
            ));
        }

        let user = user.with_id(UserId(users.len() as i64 + 1));
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| &u.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        Ok(self.snapshot())
    }
}

/// Directory whose every call fails, to exercise internal error handling.
pub struct FailingUserRepository;

#[async_trait]
impl UserRepository for FailingUserRepository {
    async fn create(&self, _user: NewUser) -> Result<User, UserError> {
        Err(UserError::DatabaseError("connection refused".to_string()))
    }

    async fn find_by_username(&self, _username: &Username) -> Result<Option<User>, UserError> {
        Err(UserError::DatabaseError("connection refused".to_string()))
    }

    async fn find_by_id(&self, _id: UserId) -> Result<Option<User>, UserError> {
        Err(UserError::DatabaseError("connection refused".to_string()))
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        Err(UserError::DatabaseError("connection refused".to_string()))
    }
}

pub fn test_authenticator() -> Arc<Authenticator> {
    let hasher = PasswordHasher::with_params(HashingParams {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .expect("Invalid hashing params");
    Arc::new(Authenticator::with_hasher(TEST_SECRET, hasher))
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub repository: Arc<InMemoryUserRepository>,
    pub authenticator: Arc<Authenticator>,
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// Spawn the application backed by an in-memory directory
    pub async fn spawn() -> Self {
        let repository = Arc::new(InMemoryUserRepository::default());
        let authenticator = test_authenticator();
        let address = spawn_server(Arc::clone(&repository), Arc::clone(&authenticator)).await;

        Self {
            address,
            repository,
            authenticator,
            api_client: reqwest::Client::new(),
        }
    }

    /// Spawn the application backed by a directory that always fails
    pub async fn spawn_failing() -> Self {
        let authenticator = test_authenticator();
        let address = spawn_server(Arc::new(FailingUserRepository), Arc::clone(&authenticator)).await;

        Self {
            address,
            repository: Arc::new(InMemoryUserRepository::default()),
            authenticator,
            api_client: reqwest::Client::new(),
        }
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// POST a JSON body and return the decoded response body.
    ///
    /// Every endpoint answers 200, so the status is asserted here.
    pub async fn post_json(&self, path: &str, body: serde_json::Value) -> serde_json::Value {
        let response = self
            .post(path)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::OK);
        response.json().await.expect("Failed to parse response")
    }

    pub async fn get_json(&self, path: &str) -> serde_json::Value {
        let response = self
            .get(path)
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::OK);
        response.json().await.expect("Failed to parse response")
    }
}

async fn spawn_server<UR: UserRepository>(
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
) -> String {
    // Use random port (0 = OS assigns)
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let user_service = Arc::new(UserService::new(repository, authenticator));
    let router = create_router(user_service);

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Server error");
    });

    format!("http://127.0.0.1:{}", port)
}
