//! Persistent food cache
//!
//! Food records rarely change, and FoodData Central rate-limits API keys, so
//! fetched foods can be kept in a small SQLite database between runs. The
//! cache is opt-in: the caller opens it from a configured path and hands it
//! to [`CachedSource`].

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::food::Food;
use super::FoodSource;
use crate::error::Result;
use crate::meal::recipe::FoodId;

pub struct FoodCache {
    conn: Connection,
}

impl FoodCache {
    /// Open (or create) the cache database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::init(Connection::open(path)?)
    }

    /// Cache that lives only as long as this value
    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS foods (
                fdc_id     INTEGER PRIMARY KEY,
                body       TEXT NOT NULL,
                fetched_at TEXT NOT NULL
            )",
        )?;
        Ok(Self { conn })
    }

    pub fn get(&self, id: FoodId) -> Result<Option<Food>> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM foods WHERE fdc_id = ?1",
                params![id.0 as i64],
                |row| row.get(0),
            )
            .optional()?;

        match body {
            Some(body) => match serde_json::from_str(&body) {
                Ok(food) => Ok(Some(food)),
                Err(e) => {
                    // Written by an older version; refetch
                    tracing::warn!(food = %id, error = %e, "Ignoring unreadable cache entry");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    pub fn put(&self, food: &Food) -> Result<()> {
        let body = serde_json::to_string(food)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO foods (fdc_id, body, fetched_at) VALUES (?1, ?2, ?3)",
            params![food.id.0 as i64, body, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM foods", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// A [`FoodSource`] that consults a [`FoodCache`] before the wrapped source
pub struct CachedSource<S> {
    inner: S,
    cache: FoodCache,
}

impl<S: FoodSource> CachedSource<S> {
    pub fn new(inner: S, cache: FoodCache) -> Self {
        Self { inner, cache }
    }
}

impl<S: FoodSource> FoodSource for CachedSource<S> {
    fn fetch_food(&self, id: FoodId) -> Result<Food> {
        if let Some(food) = self.cache.get(id)? {
            tracing::debug!(food = %id, "Food cache hit");
            return Ok(food);
        }
        let food = self.inner.fetch_food(id)?;
        self.cache.put(&food)?;
        Ok(food)
    }
}
