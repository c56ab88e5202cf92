//! Where the dashboard's statistics table comes from.

use std::path::PathBuf;

use crash_impact_statistics::ComponentStatistics;
use crash_impact_statistics::output::{read_statistics, read_statistics_file};

use crate::DashboardError;
use crate::config::SourceConfig;

/// A loadable statistics table.
#[async_trait::async_trait]
pub trait StatisticsSource: Send + Sync {
    /// Loads every statistics row.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError`] if the table cannot be fetched or parsed.
    async fn load(&self) -> Result<Vec<ComponentStatistics>, DashboardError>;

    /// Human-readable description for logging.
    fn describe(&self) -> String;
}

/// Reads the statistics CSV from a local file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Creates a source for `path`.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait::async_trait]
impl StatisticsSource for FileSource {
    async fn load(&self) -> Result<Vec<ComponentStatistics>, DashboardError> {
        let path = self.path.clone();
        let rows = tokio::task::spawn_blocking(move || read_statistics_file(&path))
            .await
            .map_err(|e| DashboardError::Config(format!("file loader panicked: {e}")))??;
        Ok(rows)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// Fetches a published statistics CSV over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteSource {
    client: reqwest::Client,
    url: String,
}

impl RemoteSource {
    /// Creates a source for `url`.
    #[must_use]
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait::async_trait]
impl StatisticsSource for RemoteSource {
    async fn load(&self) -> Result<Vec<ComponentStatistics>, DashboardError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::Fetch {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(read_statistics(body.as_ref())?)
    }

    fn describe(&self) -> String {
        format!("remote {}", self.url)
    }
}

/// Builds the source described by a config.
#[must_use]
pub fn from_config(config: &SourceConfig) -> Box<dyn StatisticsSource> {
    match config {
        SourceConfig::File { path } => Box::new(FileSource::new(path.clone())),
        SourceConfig::Remote { url } => Box::new(RemoteSource::new(url.clone())),
    }
}
