use std::{env, fs};

use actix_cors::Cors;
use actix_session::config::PersistentSession;
use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::Key;
use actix_web::{cookie, http};
use anyhow::{bail, Context};
use serde::Deserialize;

use crate::models::bookmark::Bookmark;
use crate::models::dislike::Dislike;
use crate::models::engagement::CounterUpdate;
use crate::models::follow::Follow;
use crate::models::like::Like;
use crate::models::poll_response::PollResponse;
use crate::models::user::User;
use crate::store::{MemoryStore, MongoStore, Store};

const MIN_SECRET_KEY_LEN: usize = 64;

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    #[default]
    Memory,
    Mongo,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: Backend,

    #[serde(default = "DatabaseConfig::default_url")]
    pub url: String,

    #[serde(default = "DatabaseConfig::default_name")]
    pub name: String,
}

impl DatabaseConfig {
    fn default_url() -> String {
        "mongodb://localhost:27017".to_string()
    }

    fn default_name() -> String {
        "tuiter".to_string()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            url: DatabaseConfig::default_url(),
            name: DatabaseConfig::default_name(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct CountersConfig {
    #[serde(default)]
    pub update: CounterUpdate,

    /// 0 turns the periodic reconciliation off.
    #[serde(default)]
    pub reconcile_interval_secs: u64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub allowed_origin: String,
    pub secret_key: String,

    #[serde(default = "Config::default_session_expiration")]
    pub session_expiration_in_days: i64,

    #[serde(default)]
    pub cookie_secure: bool,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub counters: CountersConfig,
}

impl Config {
    fn default_session_expiration() -> i64 {
        7
    }

    /// Reads `config.{ENV}.toml` (`ENV` defaults to `development`) and applies
    /// environment overrides on top.
    pub fn load() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let env = env::var("ENV").unwrap_or_else(|_| "development".to_string());
        let config_file = format!("config.{}.toml", env);
        let contents = fs::read_to_string(&config_file).with_context(|| format!("Unable to read {}", config_file))?;

        let mut config = Config::parse(&contents)?;
        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        toml::from_str(contents).context("Unable to parse TOML")
    }

    fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        if let Ok(port) = env::var("TUITER_PORT") {
            self.port = port.parse().with_context(|| format!("TUITER_PORT is not a port: {}", port))?;
        }

        if let Ok(allowed_origin) = env::var("TUITER_ALLOWED_ORIGIN") {
            self.allowed_origin = allowed_origin;
        }

        if let Ok(secret_key) = env::var("TUITER_SECRET_KEY") {
            self.secret_key = secret_key;
        }

        if let Ok(url) = env::var("MONGO_CONNECTION_STRING") {
            self.database.url = url;
        }

        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.secret_key.len() < MIN_SECRET_KEY_LEN {
            bail!("secret_key must be at least {} bytes long", MIN_SECRET_KEY_LEN);
        }

        if self.session_expiration_in_days <= 0 {
            bail!("session_expiration_in_days must be positive");
        }

        Ok(())
    }
}

#[derive(Clone)]
pub struct App {
    pub config: Config,
    pub store: Store,
}

impl App {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = match config.database.backend {
            Backend::Memory => Store::Memory(MemoryStore::new()),
            Backend::Mongo => {
                let mongo = MongoStore::connect(&config.database.url, &config.database.name)
                    .await
                    .context("Unable to connect to MongoDB")?;

                Store::Mongo(mongo)
            }
        };

        Ok(Self { config, store })
    }

    /// Init processes that need to be run on startup
    pub async fn init(&self) -> anyhow::Result<()> {
        self.store.ensure_indexes::<User>().await?;
        self.store.ensure_indexes::<Like>().await?;
        self.store.ensure_indexes::<Dislike>().await?;
        self.store.ensure_indexes::<Follow>().await?;
        self.store.ensure_indexes::<Bookmark>().await?;
        self.store.ensure_indexes::<PollResponse>().await?;

        Ok(())
    }

    pub fn counter_update(&self) -> CounterUpdate {
        self.config.counters.update
    }

    pub fn cors(&self) -> Cors {
        Cors::default()
            .allowed_origin(self.config.allowed_origin.as_str())
            .supports_credentials()
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                http::header::AUTHORIZATION,
                http::header::ACCEPT,
                http::header::ORIGIN,
                http::header::USER_AGENT,
                http::header::CONTENT_TYPE,
                http::header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            ])
            .max_age(86400)
    }

    pub fn port(&self) -> u16 {
        self.config.port
    }

    pub fn session_middleware(&self) -> SessionMiddleware<CookieSessionStore> {
        let ttl = PersistentSession::default()
            .session_ttl(cookie::time::Duration::days(self.config.session_expiration_in_days));

        SessionMiddleware::builder(CookieSessionStore::default(), self.secret_key())
            .session_lifecycle(ttl)
            .cookie_secure(self.config.cookie_secure)
            .build()
    }

    fn secret_key(&self) -> Key {
        Key::from(self.config.secret_key.as_bytes())
    }
}
