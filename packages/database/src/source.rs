//! Record sources for the statistics pipeline.

use crash_impact_models::{ComponentRow, CrashRow};

use crate::db::{ConnectionSettings, connect};
use crate::{DbError, queries};

/// Somewhere crash and component rows can be read from.
#[async_trait::async_trait]
pub trait RecordSource: Send + Sync {
    /// Reads every crash record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the records cannot be read.
    async fn crashes(&self) -> Result<Vec<CrashRow>, DbError>;

    /// Reads every project component record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the records cannot be read.
    async fn components(&self) -> Result<Vec<ComponentRow>, DbError>;
}

/// Reads records from the two `PostgreSQL` databases.
///
/// A connection is opened for each fetch and dropped as soon as the rows
/// are materialized, including when the query fails.
#[derive(Debug, Clone)]
pub struct PostgresSource {
    settings: ConnectionSettings,
}

impl PostgresSource {
    /// Creates a source for the given connection settings.
    #[must_use]
    pub const fn new(settings: ConnectionSettings) -> Self {
        Self { settings }
    }
}

#[async_trait::async_trait]
impl RecordSource for PostgresSource {
    async fn crashes(&self) -> Result<Vec<CrashRow>, DbError> {
        log::info!("Connecting to crash database...");
        let db = connect(&self.settings.crash_url).await?;
        queries::fetch_crashes(db.as_ref()).await
    }

    async fn components(&self) -> Result<Vec<ComponentRow>, DbError> {
        log::info!("Connecting to project database...");
        let db = connect(&self.settings.project_url).await?;
        queries::fetch_components(db.as_ref()).await
    }
}
