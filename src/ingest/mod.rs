//! SQL dump ingestion
//!
//! A dump is materialized into an ephemeral engine, statement by statement,
//! and the resulting catalog is introspected into a [`Snapshot`]. The engine
//! is discarded afterwards whether or not the import succeeded.

pub mod split;

#[cfg(feature = "postgres-engine")]
pub mod postgres;

pub use split::{schema_names_from_sql, split_sql_statements};

#[cfg(feature = "postgres-engine")]
pub use postgres::{PostgresEngine, PostgresEngineProvider};

use crate::error::{dependency_unavailable, IngestError};
use crate::snapshot::Snapshot;
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// Database engine a dump is executed against
#[async_trait]
pub trait QueryEngine: Send {
    async fn execute(&mut self, sql: &str) -> Result<(), IngestError>;

    /// Drop everything the dump created and release the engine
    async fn discard(self) -> Result<(), IngestError>;
}

/// Hands out a fresh, exclusive engine per import
#[async_trait]
pub trait EngineProvider: Send + Sync {
    type Engine: QueryEngine;

    async fn provision(&self) -> Result<Self::Engine, IngestError>;
}

/// Reads an engine's catalog back into a snapshot
#[async_trait]
pub trait CatalogIntrospector<E: QueryEngine>: Send + Sync {
    async fn introspect(&self, engine: &mut E, schemas: &[String]) -> Result<Snapshot, IngestError>;
}

/// Imports SQL dumps through an engine provider and a catalog introspector
pub struct SqlDumpImporter<P, I> {
    provider: P,
    introspector: I,
}

impl<P, I> SqlDumpImporter<P, I>
where
    P: EngineProvider,
    I: CatalogIntrospector<P::Engine>,
{
    pub fn new(provider: P, introspector: I) -> Self {
        Self { provider, introspector }
    }

    /// Materialize `sql` and snapshot the result.
    ///
    /// Statement numbers in [`IngestError::Statement`] are 1-based.
    pub async fn import(&self, sql: &str) -> Result<Snapshot, IngestError> {
        let statements = split_sql_statements(sql);
        let schemas = schema_names_from_sql(sql);
        debug!(statements = statements.len(), schemas = ?schemas, "Importing SQL dump");

        let mut engine = self.provider.provision().await?;
        let result = self.run(&mut engine, &statements, &schemas).await;

        match (result, engine.discard().await) {
            (Ok(snapshot), Ok(())) => {
                info!(tables = snapshot.tables.len(), "SQL dump imported");
                Ok(snapshot)
            }
            (Ok(_), Err(e)) => Err(e),
            (Err(e), discarded) => {
                if let Err(discard_err) = discarded {
                    warn!("Failed to discard engine after failed import: {}", discard_err);
                }
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        engine: &mut P::Engine,
        statements: &[String],
        schemas: &[String],
    ) -> Result<Snapshot, IngestError> {
        for (i, statement) in statements.iter().enumerate() {
            engine
                .execute(statement)
                .await
                .map_err(|e| IngestError::Statement {
                    index: i + 1,
                    message: e.to_string(),
                })?;
        }
        self.introspector.introspect(engine, schemas).await
    }
}

/// Engine type of [`UnavailableEngineProvider`]; it can never be constructed
#[derive(Debug)]
pub enum NoEngine {}

#[async_trait]
impl QueryEngine for NoEngine {
    async fn execute(&mut self, _sql: &str) -> Result<(), IngestError> {
        match *self {}
    }

    async fn discard(self) -> Result<(), IngestError> {
        match self {}
    }
}

/// Provider used when no engine is compiled in or configured
#[derive(Debug, Clone, Default)]
pub struct UnavailableEngineProvider {
    reason: Option<String>,
}

impl UnavailableEngineProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
        }
    }
}

#[async_trait]
impl EngineProvider for UnavailableEngineProvider {
    type Engine = NoEngine;

    async fn provision(&self) -> Result<NoEngine, IngestError> {
        Err(dependency_unavailable(self.reason.clone().unwrap_or_else(|| {
            "no database engine available to materialize SQL dumps".to_string()
        })))
    }
}
