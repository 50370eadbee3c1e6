use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{AnyConnection, Connection};
use tracing::{debug, info};


pub mod models;
pub mod queries;

pub use models::SolutionRecord;
pub use queries::{SOLUTIONS_QUERY, SolutionQueries};

use crate::FindasoError;

/// Anything that can hand over the full list of solutions in id order
#[async_trait]
pub trait SolutionSource: Send + Sync {
    async fn fetch_solutions(&self) -> Result<Vec<SolutionRecord>>;
}

/// Reads solutions from the source database named by `DB_URI`.
///
/// Accepts any URL the `sqlx` Any driver understands (`postgres://`,
/// `sqlite://`).
#[derive(Clone)]
pub struct SqlSolutionSource {
    database_url: String,
}

impl SqlSolutionSource {
    #[inline]
    pub fn new(database_url: impl Into<String>) -> Self {
        sqlx::any::install_default_drivers();
        Self {
            database_url: database_url.into(),
        }
    }

    async fn connect(&self) -> Result<AnyConnection> {
        AnyConnection::connect(&self.database_url)
            .await
            .map_err(|e| FindasoError::Database(format!("Failed to connect: {}", e)))
            .context("Failed to open source database connection")
    }
}

#[async_trait]
impl SolutionSource for SqlSolutionSource {
    /// One connection, one query, closed before the rows are returned
    async fn fetch_solutions(&self) -> Result<Vec<SolutionRecord>> {
        let mut conn = self.connect().await?;
        debug!("Connected to source database");

        let records = SolutionQueries::fetch_all(&mut conn).await?;

        conn.close()
            .await
            .context("Failed to close source database connection")?;

        info!("Fetched {} solutions from source database", records.len());
        Ok(records)
    }
}
