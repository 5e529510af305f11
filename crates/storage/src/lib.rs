use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use shared::{
    domain::{Sector, SectorId},
    roster::{default_roster, RosterCollection, ROSTER_KEY},
};

/// Roster persistence consumed by the session controller.
///
/// Writes are whole-sector overwrites keyed by id; the last write wins.
#[async_trait]
pub trait RosterStore: Send + Sync {
    async fn list_sectors(&self) -> Result<Vec<Sector>>;
    async fn get_sector(&self, sector_id: &SectorId) -> Result<Sector>;
    async fn save_sector(&self, sector: Sector) -> Result<()>;
    async fn reset_to_defaults(&self) -> Result<()>;
}

/// SQLite-backed key-value store. The roster lives under [`ROSTER_KEY`].
#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Every connection to `:memory:` opens its own empty database.
        let in_memory = database_url.contains(":memory:");
        let max_connections = if in_memory { 1 } else { 5 };
        let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections);
        if in_memory {
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }
        let pool = pool_options.connect_with(connect_options).await?;
        let storage = Self { pool };
        storage.ensure_kv_table().await?;
        Ok(storage)
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    async fn ensure_kv_table(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key        TEXT PRIMARY KEY NOT NULL,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to ensure kv_store table exists")?;
        Ok(())
    }

    pub async fn get_value(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to read key '{key}'"))?;
        Ok(row.map(|r| r.get::<String, _>(0)))
    }

    pub async fn put_value(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to write key '{key}'"))?;
        Ok(())
    }

    pub async fn delete_value(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete key '{key}'"))?;
        Ok(result.rows_affected() > 0)
    }

    /// Reads the persisted roster. A missing key yields the built-in defaults;
    /// so does an unreadable payload, which is logged and left in place until
    /// the next write replaces it.
    pub async fn load_roster(&self) -> Result<RosterCollection> {
        let Some(raw) = self.get_value(ROSTER_KEY).await? else {
            debug!("no persisted roster, using defaults");
            return Ok(default_roster());
        };
        Ok(decode_or_default(&raw))
    }

    pub async fn save_roster(&self, roster: &RosterCollection) -> Result<()> {
        let raw = roster.encode().context("failed to encode roster")?;
        self.put_value(ROSTER_KEY, &raw).await
    }
}

fn decode_or_default(raw: &str) -> RosterCollection {
    match RosterCollection::decode(raw) {
        Ok(roster) => roster,
        Err(err) => {
            warn!(error = %err, "persisted roster is malformed, falling back to defaults");
            default_roster()
        }
    }
}

#[async_trait]
impl RosterStore for Storage {
    async fn list_sectors(&self) -> Result<Vec<Sector>> {
        Ok(self.load_roster().await?.into_sectors())
    }

    async fn get_sector(&self, sector_id: &SectorId) -> Result<Sector> {
        let roster = self.load_roster().await?;
        Ok(roster.get(sector_id)?.clone())
    }

    async fn save_sector(&self, sector: Sector) -> Result<()> {
        let mut roster = self.load_roster().await?;
        debug!(sector_id = %sector.id, members = sector.members.len(), "saving sector");
        roster.upsert(sector);
        self.save_roster(&roster).await
    }

    async fn reset_to_defaults(&self) -> Result<()> {
        self.delete_value(ROSTER_KEY).await?;
        Ok(())
    }
}

/// In-process roster for tests and throwaway runs.
#[derive(Default)]
pub struct MemoryRosterStore {
    roster: Mutex<Option<RosterCollection>>,
}

impl MemoryRosterStore {
    pub fn new(roster: RosterCollection) -> Self {
        Self {
            roster: Mutex::new(Some(roster)),
        }
    }
}

#[async_trait]
impl RosterStore for MemoryRosterStore {
    async fn list_sectors(&self) -> Result<Vec<Sector>> {
        let guard = self.roster.lock().await;
        Ok(guard.clone().unwrap_or_else(default_roster).into_sectors())
    }

    async fn get_sector(&self, sector_id: &SectorId) -> Result<Sector> {
        let guard = self.roster.lock().await;
        match guard.as_ref() {
            Some(roster) => Ok(roster.get(sector_id)?.clone()),
            None => Ok(default_roster().get(sector_id)?.clone()),
        }
    }

    async fn save_sector(&self, sector: Sector) -> Result<()> {
        let mut guard = self.roster.lock().await;
        guard.get_or_insert_with(default_roster).upsert(sector);
        Ok(())
    }

    async fn reset_to_defaults(&self) -> Result<()> {
        *self.roster.lock().await = None;
        Ok(())
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
