//! Database connection handle.
//!
//! The connection is an explicitly owned value: it is opened once at startup,
//! cloned into whatever needs it and closed when the last clone is dropped.

use std::future::Future;
use std::time::Duration;

use surrealdb::Surreal;
use surrealdb::engine::any::{Any, connect};
use surrealdb::opt::auth::Root;
use thiserror::Error;

/// Underlying SurrealDB client.
pub type Client = Surreal<Any>;

/// Default upper bound for a single store call.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Connection mode: "mem://", "file://path" or "rocksdb://path"
    pub endpoint: String,
    /// Namespace to use
    pub namespace: String,
    /// Database name to use
    pub database: String,
    /// Optional root credentials for authentication
    pub credentials: Option<(String, String)>,
    /// Upper bound for every store call
    pub query_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            endpoint: "mem://".to_string(),
            namespace: "jobboard".to_string(),
            database: "main".to_string(),
            credentials: None,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }
}

impl DbConfig {
    /// Create a config for in-memory testing.
    pub fn memory() -> Self {
        Self::default()
    }

    /// Create a config for file-based persistence.
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            endpoint: format!("file://{}", path.into()),
            ..Default::default()
        }
    }

    /// Create a config for RocksDB persistence (requires rocksdb feature).
    pub fn rocksdb(path: impl Into<String>) -> Self {
        Self {
            endpoint: format!("rocksdb://{}", path.into()),
            ..Default::default()
        }
    }

    /// Create a config for an arbitrary endpoint string.
    pub fn endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the database name.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Set root credentials for authentication.
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Set the per-call timeout.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }
}

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Surreal(surrealdb::Error),
    #[error("Query error: {0}")]
    Query(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    /// A concurrent transaction touched the same records; safe to re-run.
    #[error("Transaction conflict: {0}")]
    TransactionConflict(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Store call timed out after {0:?}")]
    Timeout(Duration),
}

impl From<surrealdb::Error> for DbError {
    fn from(err: surrealdb::Error) -> Self {
        let message = err.to_string();
        // Unique index violations surface as "Database index `x` already contains ..."
        if message.contains("already contains") {
            DbError::Conflict(message)
        } else if is_retryable(&message) {
            DbError::TransactionConflict(message)
        } else {
            DbError::Surreal(err)
        }
    }
}

/// Whether a store error reports an optimistic-concurrency conflict.
pub(crate) fn is_retryable(message: &str) -> bool {
    message.contains("read or write conflict") || message.contains("can be retried")
}

/// Owned handle to the document store.
#[derive(Debug, Clone)]
pub struct Database {
    client: Client,
    query_timeout: Duration,
}

impl Database {
    /// Open a connection and select the namespace and database.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        tracing::info!("Connecting to database: {}", config.endpoint);

        let client = connect(&config.endpoint).await?;

        // Authenticate if credentials provided
        if let Some((username, password)) = &config.credentials {
            client.signin(Root { username, password }).await?;
        }

        client
            .use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        tracing::info!(
            "Connected to database: {}/{}",
            config.namespace,
            config.database
        );

        Ok(Self {
            client,
            query_timeout: config.query_timeout,
        })
    }

    /// Open a fresh in-memory store with the schema applied.
    pub async fn memory() -> Result<Self, DbError> {
        let db = Self::connect(&DbConfig::memory()).await?;
        crate::init_schema(&db).await?;
        Ok(db)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Run one store operation under the configured timeout.
    pub async fn run<T, F>(&self, op: F) -> Result<T, DbError>
    where
        F: Future<Output = Result<T, DbError>>,
    {
        match tokio::time::timeout(self.query_timeout, op).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("Store call exceeded {:?}", self.query_timeout);
                Err(DbError::Timeout(self.query_timeout))
            }
        }
    }
}
