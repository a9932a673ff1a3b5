use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
#[cfg(test)]
use mockall::automock;
use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::version::error::{ArtifactError, CacheError};
use crate::version::target::ArtifactSource;

/// Storage for downloaded component artifacts
#[cfg_attr(test, automock)]
pub trait ArtifactStore: Send + Sync {
    /// Cached bytes of `name-version`, if present
    fn get(&self, name: &str, version: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store the bytes of `name-version`, replacing any previous copy
    fn set(&self, name: &str, version: &str, bytes: &[u8]) -> Result<(), CacheError>;

    /// Where `name-version` lives (or would live) on disk
    fn path_for(&self, name: &str, version: &str) -> PathBuf;
}

/// Artifact blobs on disk, indexed in SQLite
pub struct ArtifactCache {
    dir: PathBuf,
    conn: Mutex<Connection>,
}

impl ArtifactCache {
    pub fn new(dir: &Path) -> Result<Self, CacheError> {
        std::fs::create_dir_all(dir)?;
        let db_path = dir.join("artifacts.db");
        info!("Initializing artifact cache at {:?}", db_path);

        let conn = Connection::open(&db_path)?;

        // Enable WAL mode for better concurrency
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS artifacts (
                name TEXT NOT NULL,
                version TEXT NOT NULL,
                size INTEGER NOT NULL,
                cached_at INTEGER NOT NULL,
                PRIMARY KEY(name, version)
            )
            "#,
            [],
        )?;

        debug!("Artifact cache ready");

        Ok(Self {
            dir: dir.to_path_buf(),
            conn: Mutex::new(conn),
        })
    }

    /// Acquire database connection lock with proper error handling
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
        self.conn.lock().map_err(|_| CacheError::LockPoisoned)
    }

    /// Number of indexed artifacts
    pub fn len(&self) -> Result<usize, CacheError> {
        let conn = self.lock_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM artifacts", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.len()? == 0)
    }

    fn forget(&self, name: &str, version: &str) -> Result<(), CacheError> {
        let conn = self.lock_conn()?;
        conn.execute(
            "DELETE FROM artifacts WHERE name = ?1 AND version = ?2",
            (name, version),
        )?;
        Ok(())
    }
}

/// Reject names that would escape the cache directory
fn check_component(part: &str) -> Result<(), CacheError> {
    if part.is_empty() || part.contains(['/', '\\']) || part.contains("..") {
        return Err(CacheError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("invalid artifact name component: {:?}", part),
        )));
    }
    Ok(())
}

impl ArtifactStore for ArtifactCache {
    fn get(&self, name: &str, version: &str) -> Result<Option<Vec<u8>>, CacheError> {
        check_component(name)?;
        check_component(version)?;

        let indexed = {
            let conn = self.lock_conn()?;
            conn.query_row(
                "SELECT size FROM artifacts WHERE name = ?1 AND version = ?2",
                (name, version),
                |row| row.get::<_, i64>(0),
            )
            .optional()?
        };

        let Some(size) = indexed else {
            return Ok(None);
        };

        let path = self.path_for(name, version);
        match std::fs::read(&path) {
            Ok(bytes) if bytes.len() as i64 == size => Ok(Some(bytes)),
            Ok(_) => {
                warn!("Cached artifact {:?} has unexpected size, discarding", path);
                self.forget(name, version)?;
                Ok(None)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Cached artifact {:?} is missing on disk", path);
                self.forget(name, version)?;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, name: &str, version: &str, bytes: &[u8]) -> Result<(), CacheError> {
        check_component(name)?;
        check_component(version)?;

        let path = self.path_for(name, version);
        std::fs::write(&path, bytes)?;

        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO artifacts (name, version, size, cached_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(name, version) DO UPDATE SET
                size = excluded.size,
                cached_at = excluded.cached_at
            "#,
            (
                name,
                version,
                bytes.len() as i64,
                Utc::now().timestamp_millis(),
            ),
        )?;

        debug!("Cached {} bytes for {}-{}", bytes.len(), name, version);
        Ok(())
    }

    fn path_for(&self, name: &str, version: &str) -> PathBuf {
        self.dir.join(format!("{}-{}.gem", name, version))
    }
}

/// Return the artifact for `name-version`, downloading it on a cache miss
pub async fn download_artifact(
    store: &dyn ArtifactStore,
    source: &dyn ArtifactSource,
    name: &str,
    version: &str,
) -> Result<Vec<u8>, ArtifactError> {
    if let Some(bytes) = store.get(name, version)? {
        debug!("Artifact cache hit for {}-{}", name, version);
        return Ok(bytes);
    }

    info!("Downloading {}-{}", name, version);
    let bytes = source.download(name, version).await?;
    store.set(name, version, &bytes)?;
    Ok(bytes)
}
