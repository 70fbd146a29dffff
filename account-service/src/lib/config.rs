use std::env;

use auth::HashingParams;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;
use sqlx::postgres::PgSslMode;

/// The directory is always reached on the local host.
pub const DATABASE_HOST: &str = "localhost";

#[derive(Deserialize, Clone)]
pub struct Config {
    /// HTTP listen port
    pub port: u16,
    /// Token signing secret
    pub secret_key: String,
    pub db_user: String,
    pub db_pwd: String,
    pub db_name: String,
    #[serde(default = "default_db_port")]
    pub db_port: u16,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default)]
    pub hash_memory_kib: Option<u32>,
    #[serde(default)]
    pub hash_iterations: Option<u32>,
    #[serde(default)]
    pub hash_parallelism: Option<u32>,
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_max_connections() -> u32 {
    5
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (PORT, SECRET_KEY, DB_USER, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    ///
    /// A `.env` file, if present, should be loaded into the environment first.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Keys are lower-cased: DB_USER overrides db_user
            .add_source(Environment::default())
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }

    /// Argon2 work factor, falling back to library defaults per field.
    pub fn hashing_params(&self) -> HashingParams {
        let defaults = HashingParams::default();
        HashingParams {
            memory_kib: self.hash_memory_kib.unwrap_or(defaults.memory_kib),
            iterations: self.hash_iterations.unwrap_or(defaults.iterations),
            parallelism: self.hash_parallelism.unwrap_or(defaults.parallelism),
        }
    }

    /// Connection options for the user directory.
    ///
    /// Traffic is encrypted but the server certificate is not verified,
    /// which suits a local development database with a self-signed cert.
    pub fn database_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(DATABASE_HOST)
            .port(self.db_port)
            .username(&self.db_user)
            .password(&self.db_pwd)
            .database(&self.db_name)
            .ssl_mode(PgSslMode::Require)
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn from_toml(source: &str) -> Result<Config, ConfigError> {
        ConfigBuilder::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn test_defaults_applied() {
        let config = from_toml(
            r#"
            port = 3000
            secret_key = "secret"
            db_user = "sa"
            db_pwd = "pwd"
            db_name = "accounts"
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.db_port, 5432);
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.hashing_params(), HashingParams::default());
    }

    #[test]
    fn test_hashing_overrides() {
        let config = from_toml(
            r#"
            port = 3000
            secret_key = "secret"
            db_user = "sa"
            db_pwd = "pwd"
            db_name = "accounts"
            hash_iterations = 4
            "#,
        )
        .unwrap();

        let params = config.hashing_params();
        assert_eq!(params.iterations, 4);
        assert_eq!(params.memory_kib, HashingParams::default().memory_kib);
    }

    #[test]
    fn test_missing_secret_is_an_error() {
        let result = from_toml(
            r#"
            port = 3000
            db_user = "sa"
            db_pwd = "pwd"
            db_name = "accounts"
            "#,
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_database_options() {
        let config = from_toml(
            r#"
            port = 3000
            secret_key = "secret"
            db_user = "sa"
            db_pwd = "pwd"
            db_name = "accounts"
            db_port = 6543
            "#,
        )
        .unwrap();

        let options = format!("{:?}", config.database_options());
        assert!(options.contains(r#"host: "localhost""#));
        assert!(options.contains("port: 6543"));
        assert!(options.contains(r#"username: "sa""#));
        assert!(options.contains(r#"database: Some("accounts")"#));
        assert!(options.contains("ssl_mode: Require"));
    }
}
