//! PostgreSQL scratch engine
//!
//! Connects to a configured server and runs the whole dump inside a single
//! transaction that is rolled back on discard, so nothing the dump creates
//! outlives the import. Point it at an empty scratch database: objects that
//! already exist there show up in the introspected snapshot too.

use super::{EngineProvider, QueryEngine};
use crate::config::EngineConfig;
use crate::error::{dependency_unavailable, IngestError};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error, info};

static TRANSACTION_CONTROL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(begin|commit|rollback|end|start\s+transaction)\b").expect("valid regex")
});

static CONCURRENTLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bindex\s+concurrently\b").expect("valid regex"));

/// Provisions one transaction-scoped connection per import
#[derive(Debug, Clone, Default)]
pub struct PostgresEngineProvider {
    config: Option<EngineConfig>,
}

impl PostgresEngineProvider {
    pub fn new(config: Option<EngineConfig>) -> Self {
        Self { config }
    }
}

fn rustls_connector() -> tokio_postgres_rustls::MakeRustlsConnect {
    let certs = rustls_native_certs::load_native_certs();
    let mut root_store = rustls::RootCertStore::empty();
    for cert in certs.certs {
        root_store.add(cert).ok();
    }

    let tls_config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    tokio_postgres_rustls::MakeRustlsConnect::new(tls_config)
}

#[async_trait]
impl EngineProvider for PostgresEngineProvider {
    type Engine = PostgresEngine;

    async fn provision(&self) -> Result<PostgresEngine, IngestError> {
        let config = self.config.as_ref().ok_or_else(|| {
            dependency_unavailable("no scratch PostgreSQL configured, set PGSNAP_ENGINE_URL or DATABASE_URL")
        })?;

        let pg_config: tokio_postgres::Config = config.url.parse()?;

        // Determine if TLS is needed (Neon requires it)
        let client = if config.require_tls {
            let (client, connection) = pg_config.connect(rustls_connector()).await?;
            tokio::spawn(async move {
                if let Err(e) = connection.await {
                    error!("Engine connection error: {}", e);
                }
            });
            client
        } else {
            let (client, connection) = pg_config.connect(NoTls).await?;
            tokio::spawn(async move {
                if let Err(e) = connection.await {
                    error!("Engine connection error: {}", e);
                }
            });
            client
        };

        client.batch_execute("BEGIN").await?;
        info!(host = %config.host, database = %config.database, tls = config.require_tls, "Scratch engine provisioned");

        Ok(PostgresEngine { client })
    }
}

/// Connection with an open transaction holding the materialized dump
pub struct PostgresEngine {
    client: Client,
}

impl PostgresEngine {
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Prepare a dump statement for running inside the import transaction
    fn prepare(sql: &str) -> Option<String> {
        if TRANSACTION_CONTROL.is_match(sql) {
            return None;
        }
        Some(CONCURRENTLY.replace_all(sql, "INDEX").into_owned())
    }
}

#[async_trait]
impl QueryEngine for PostgresEngine {
    async fn execute(&mut self, sql: &str) -> Result<(), IngestError> {
        match Self::prepare(sql) {
            Some(statement) => Ok(self.client.batch_execute(&statement).await?),
            None => {
                debug!(statement = sql, "Transaction control statement ignored");
                Ok(())
            }
        }
    }

    async fn discard(self) -> Result<(), IngestError> {
        self.client.batch_execute("ROLLBACK").await?;
        debug!("Scratch engine rolled back");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_control_is_skipped() {
        assert_eq!(PostgresEngine::prepare("COMMIT"), None);
        assert_eq!(PostgresEngine::prepare("  begin"), None);
        assert_eq!(PostgresEngine::prepare("START TRANSACTION ISOLATION LEVEL SERIALIZABLE"), None);
        assert!(PostgresEngine::prepare("CREATE TABLE ending (id int)").is_some());
    }

    #[test]
    fn test_concurrent_index_builds_run_in_transaction() {
        assert_eq!(
            PostgresEngine::prepare("CREATE INDEX CONCURRENTLY idx ON t (a)").as_deref(),
            Some("CREATE INDEX idx ON t (a)")
        );
    }

    #[tokio::test]
    async fn test_missing_url_is_dependency_unavailable() {
        let err = PostgresEngineProvider::new(None).provision().await.err();
        assert!(matches!(err, Some(IngestError::DependencyUnavailable(_))));
    }
}
