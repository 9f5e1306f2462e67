use crate::{
    auth::AccessPolicy,
    config::Settings,
    database::DatabasePool,
    error::ApiError,
    repositories::{
        entry_repo::SqlxEntryRepository, patient_repo::SqlxPatientRepository,
        user_repo::SqlxUserRepository, EntryRepository, InMemoryEntryRepository,
        InMemoryPatientRepository, InMemoryUserRepository, PatientRepository, UserRepository,
    },
    services::{AuthService, FieldExtractor, LogRelay},
};
use std::sync::Arc;

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod utils;

pub use routes::create_router;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub policy: Arc<AccessPolicy>,
    /// `None` when running on the in-memory store.
    pub db_pool: Option<DatabasePool>,
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
    pub patient_repository: Arc<dyn PatientRepository + Send + Sync>,
    pub entry_repository: Arc<dyn EntryRepository + Send + Sync>,
    pub auth_service: Arc<AuthService>,
    pub log_relay: Arc<LogRelay>,
    pub field_extractor: Arc<FieldExtractor>,
}

impl AppState {
    /// Connect to PostgreSQL when `DATABASE_URL` is set, otherwise fall back
    /// to the in-memory store.
    pub async fn new(config: Settings) -> Result<Self, ApiError> {
        match config.database_url.clone() {
            Some(url) => {
                let db_pool = crate::database::create_connection_pool(&url).await?;
                Self::new_with_pool(config, db_pool)
            }
            None => {
                tracing::warn!("DATABASE_URL not set, records are kept in memory only");
                Self::in_memory(config)
            }
        }
    }

    /// Create application state with an existing database pool
    pub fn new_with_pool(config: Settings, db_pool: DatabasePool) -> Result<Self, ApiError> {
        Self::build(
            config,
            Arc::new(SqlxUserRepository::new(db_pool.clone())),
            Arc::new(SqlxPatientRepository::new(db_pool.clone())),
            Arc::new(SqlxEntryRepository::new(db_pool.clone())),
            Some(db_pool),
        )
    }

    pub fn in_memory(config: Settings) -> Result<Self, ApiError> {
        let entries = Arc::new(InMemoryEntryRepository::new());
        Self::build(
            config,
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryPatientRepository::new(entries.clone())),
            entries,
            None,
        )
    }

    fn build(
        config: Settings,
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        patient_repository: Arc<dyn PatientRepository + Send + Sync>,
        entry_repository: Arc<dyn EntryRepository + Send + Sync>,
        db_pool: Option<DatabasePool>,
    ) -> Result<Self, ApiError> {
        let policy = Arc::new(AccessPolicy::new(config.public_assets.clone()));
        let log_relay = Arc::new(LogRelay::new(&config)?);
        let field_extractor = Arc::new(FieldExtractor::new(&config)?);
        let auth_service = Arc::new(AuthService::new(user_repository.clone()));

        if !log_relay.is_remote() {
            tracing::info!("LOGTAIL_URL not set, relayed logs are written locally");
        }

        Ok(Self {
            config: Arc::new(config),
            policy,
            db_pool,
            user_repository,
            patient_repository,
            entry_repository,
            auth_service,
            log_relay,
            field_extractor,
        })
    }

    /// Create the configured bootstrap admin, if any.
    pub async fn ensure_bootstrap_admin(&self) -> Result<(), ApiError> {
        let (Some(username), Some(password)) = (
            self.config.bootstrap_admin_username.as_deref(),
            self.config.bootstrap_admin_password.as_deref(),
        ) else {
            return Ok(());
        };

        self.auth_service
            .ensure_bootstrap_admin(username, password)
            .await
            .map(|_| ())
    }
}
