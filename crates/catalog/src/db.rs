//! Opening the catalog.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use sqlx::pool::PoolConnectionMetadata;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Executor, SqliteConnection};
use std::path::Path;
use std::time::Duration;
use tracing::instrument;

static MIGRATIONS: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
// Ingestion is sequential; a second connection only serves the odd read.
const MAX_CONNECTIONS: u32 = 2;
const BUSY_TIMEOUT: Duration = Duration::from_millis(1500);
/// Run on every pooled connection; not expressible through `SqliteConnectOptions`.
const CONNECTION_PRAGMAS: &str = "PRAGMA cache_size = -4096; PRAGMA temp_store = MEMORY;";

/// Handle on an open, fully migrated catalog.
///
/// Constructed once by the caller and handed to whatever needs it (usually
/// as a [`Repository`](crate::Repository)); there is no global handle.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the catalog stored at `path`.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "Opening catalog");
        let options = connect_options().filename(path).create_if_missing(true);
        Self::open(options, SqlitePoolOptions::new().max_connections(MAX_CONNECTIONS)).await
    }

    /// A private, throwaway catalog that lives as long as the returned handle
    /// (or any clone of its pool).
    ///
    /// Not gated behind `#[cfg(test)]`: dependent crates test against it too.
    pub async fn connect_in_memory() -> Result<Self> {
        let options = connect_options().filename(":memory:");
        // Every connection to ":memory:" gets its own empty database, so the
        // pool must hold exactly one and never recycle it.
        let pool = SqlitePoolOptions::new().max_connections(1).idle_timeout(None).max_lifetime(None);
        Self::open(options, pool).await
    }

    async fn open(options: SqliteConnectOptions, pool: SqlitePoolOptions) -> Result<Self> {
        let pool = pool
            .after_connect(|conn, meta| Box::pin(tune(conn, meta)))
            .connect_with(options)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Bring the schema up to date. Already done when connecting; running it
    /// again is a no-op.
    #[instrument("migrating catalog", skip(self))]
    pub async fn migrate(&self) -> Result<()> {
        MIGRATIONS.run(&self.pool).await.or_raise(|| ErrorKind::Migration)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Refresh planner statistics and close every connection. The handle is
    /// unusable afterwards.
    pub async fn close(&self) {
        if let Err(e) = self.pool.execute("PRAGMA optimize").await {
            tracing::debug!(error = %e, "Skipping catalog optimization");
        }
        self.pool.close().await;
    }
}

fn connect_options() -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        // Book deletion relies on ON DELETE CASCADE for its associations.
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(BUSY_TIMEOUT)
}

async fn tune(conn: &mut SqliteConnection, _meta: PoolConnectionMetadata) -> sqlx::Result<()> {
    conn.execute(CONNECTION_PRAGMAS).await?;
    Ok(())
}
