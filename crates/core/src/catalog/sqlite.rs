//! SQLite-backed podcast catalog implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, TryLockError};
use std::time::{Duration, Instant};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{CatalogError, CatalogSearchQuery, CatalogStats, PodcastCatalog, UpsertOutcome};
use crate::podcast::{CollectionId, Podcast, StoredPodcast};

/// Pause between attempts to take the connection before a write deadline.
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(2);

/// Columns every read returns, in this order.
const RECORD_COLUMNS: &str = "p.document, p.needs_review, p.created_at, p.updated_at";

/// SQLite-backed podcast catalog.
pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    /// Create a new SQLite catalog, creating the database file and tables if needed.
    pub fn new(path: &Path, busy_timeout: Duration) -> Result<Self, CatalogError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite catalog (useful for testing).
    pub fn in_memory() -> Result<Self, CatalogError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CatalogError> {
        conn.execute_batch(
            r#"
            -- One row per distinct collection id
            CREATE TABLE IF NOT EXISTS podcasts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                collection_id TEXT NOT NULL UNIQUE,
                collection_name TEXT NOT NULL DEFAULT '',
                artist_name TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                genres TEXT NOT NULL DEFAULT '',
                primary_genre_name TEXT NOT NULL DEFAULT '',
                document TEXT NOT NULL,
                needs_review INTEGER NOT NULL DEFAULT 0,
                revision INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_podcasts_primary_genre ON podcasts(primary_genre_name);
            CREATE INDEX IF NOT EXISTS idx_podcasts_created_at ON podcasts(created_at);

            -- Full-text index over the searchable columns
            CREATE VIRTUAL TABLE IF NOT EXISTS podcasts_fts USING fts5(
                collection_name,
                artist_name,
                description,
                genres,
                content='podcasts',
                content_rowid='id'
            );

            CREATE TRIGGER IF NOT EXISTS podcasts_fts_insert AFTER INSERT ON podcasts BEGIN
                INSERT INTO podcasts_fts(rowid, collection_name, artist_name, description, genres)
                VALUES (new.id, new.collection_name, new.artist_name, new.description, new.genres);
            END;

            CREATE TRIGGER IF NOT EXISTS podcasts_fts_update AFTER UPDATE ON podcasts BEGIN
                INSERT INTO podcasts_fts(podcasts_fts, rowid, collection_name, artist_name, description, genres)
                VALUES ('delete', old.id, old.collection_name, old.artist_name, old.description, old.genres);
                INSERT INTO podcasts_fts(rowid, collection_name, artist_name, description, genres)
                VALUES (new.id, new.collection_name, new.artist_name, new.description, new.genres);
            END;
            "#,
        )?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, CatalogError> {
        self.conn
            .lock()
            .map_err(|_| CatalogError::Internal("catalog connection lock poisoned".to_string()))
    }

    /// Take the connection, giving up once `deadline` passes.
    fn lock_until(
        &self,
        deadline: Option<Instant>,
    ) -> Result<MutexGuard<'_, Connection>, CatalogError> {
        let Some(deadline) = deadline else {
            return self.lock();
        };
        loop {
            match self.conn.try_lock() {
                Ok(conn) => return Ok(conn),
                Err(TryLockError::Poisoned(_)) => {
                    return Err(CatalogError::Internal(
                        "catalog connection lock poisoned".to_string(),
                    ))
                }
                Err(TryLockError::WouldBlock) if Instant::now() >= deadline => {
                    return Err(CatalogError::DeadlineExceeded)
                }
                Err(TryLockError::WouldBlock) => std::thread::sleep(LOCK_RETRY_INTERVAL),
            }
        }
    }

    fn load(conn: &Connection, key: &str) -> Result<Option<StoredPodcast>, CatalogError> {
        let sql = format!(
            "SELECT {} FROM podcasts p WHERE p.collection_id = ?",
            RECORD_COLUMNS
        );
        conn.query_row(&sql, params![key], RawRecord::from_row)
            .optional()?
            .map(RawRecord::into_stored)
            .transpose()
    }

    fn query_records(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<StoredPodcast>, CatalogError> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, RawRecord::from_row)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?.into_stored()?);
        }
        Ok(results)
    }
}

impl PodcastCatalog for SqliteCatalog {
    fn upsert_until(
        &self,
        podcast: &Podcast,
        deadline: Option<Instant>,
    ) -> Result<UpsertOutcome, CatalogError> {
        if podcast.collection_id.is_empty() {
            return Err(CatalogError::InvalidRecord(
                "collection id is empty".to_string(),
            ));
        }
        if podcast.is_placeholder() {
            return Err(CatalogError::InvalidRecord(
                "placeholder records are never stored".to_string(),
            ));
        }

        let key = podcast.collection_id.storage_key();
        let document = serde_json::to_string(podcast)?;
        let genres = podcast.genres.join(", ");
        let now = format_timestamp(&Utc::now());

        let mut conn = self.lock_until(deadline)?;
        let tx = conn.transaction()?;

        let (raw, revision): (RawRecord, i64) = tx.query_row(
            "INSERT INTO podcasts (
                collection_id, collection_name, artist_name, description, genres,
                primary_genre_name, document, needs_review, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
             ON CONFLICT(collection_id) DO UPDATE SET
                collection_name = excluded.collection_name,
                artist_name = excluded.artist_name,
                description = excluded.description,
                genres = excluded.genres,
                primary_genre_name = excluded.primary_genre_name,
                document = excluded.document,
                needs_review = excluded.needs_review,
                revision = podcasts.revision + 1,
                updated_at = excluded.updated_at
             RETURNING document, needs_review, created_at, updated_at, revision",
            params![
                &key,
                podcast.collection_name.as_deref().unwrap_or_default(),
                podcast.artist_name.as_deref().unwrap_or_default(),
                podcast.description.as_deref().unwrap_or_default(),
                &genres,
                podcast.primary_genre_name.as_deref().unwrap_or_default(),
                &document,
                podcast.collection_id.is_derived(),
                &now,
            ],
            |row| Ok((RawRecord::from_row(row)?, row.get(4)?)),
        )?;

        // Dropping the transaction rolls the write back
        if is_past(deadline) {
            return Err(CatalogError::DeadlineExceeded);
        }
        let record = raw.into_stored()?;
        tx.commit()?;
        Ok(UpsertOutcome {
            record,
            inserted: revision == 1,
        })
    }

    fn get(&self, id: &CollectionId) -> Result<StoredPodcast, CatalogError> {
        let conn = self.lock()?;
        let key = id.storage_key();
        Self::load(&conn, &key)?.ok_or(CatalogError::NotFound(key))
    }

    fn search(&self, query: &CatalogSearchQuery) -> Result<Vec<StoredPodcast>, CatalogError> {
        let Some(fts_query) = fts_match_expression(&query.query) else {
            return Ok(Vec::new());
        };

        let conn = self.lock()?;
        let sql = format!(
            "SELECT {}
             FROM podcasts_fts f
             JOIN podcasts p ON p.id = f.rowid
             WHERE podcasts_fts MATCH ?1
             ORDER BY bm25(podcasts_fts, 10.0, 5.0, 3.0, 2.0), p.id
             LIMIT ?2",
            RECORD_COLUMNS
        );
        Self::query_records(&conn, &sql, params![&fts_query, query.limit])
    }

    fn find_similar(
        &self,
        id: &CollectionId,
        limit: u32,
    ) -> Result<Vec<StoredPodcast>, CatalogError> {
        let conn = self.lock()?;
        let key = id.storage_key();
        let source = Self::load(&conn, &key)?.ok_or_else(|| CatalogError::NotFound(key.clone()))?;

        let genres = serde_json::to_string(&source.podcast.genres)?;
        let primary = source.podcast.primary_genre_name.unwrap_or_default();

        let sql = format!(
            "SELECT {}
             FROM podcasts p
             WHERE p.collection_id != ?1
               AND ((?2 != '' AND p.primary_genre_name = ?2)
                    OR EXISTS (
                        SELECT 1 FROM json_each(p.document, '$.genres') g
                        WHERE g.value IN (SELECT value FROM json_each(?3))
                    ))
             ORDER BY p.created_at DESC, p.id DESC
             LIMIT ?4",
            RECORD_COLUMNS
        );
        Self::query_records(&conn, &sql, params![&key, &primary, &genres, limit])
    }

    fn stats(&self) -> Result<CatalogStats, CatalogError> {
        let conn = self.lock()?;

        let (total_podcasts, needs_review, oldest, newest): (
            u64,
            u64,
            Option<String>,
            Option<String>,
        ) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(needs_review), 0), MIN(created_at), MAX(updated_at)
             FROM podcasts",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;

        Ok(CatalogStats {
            total_podcasts,
            needs_review,
            oldest_entry: oldest.as_deref().map(parse_timestamp).transpose()?,
            newest_entry: newest.as_deref().map(parse_timestamp).transpose()?,
        })
    }
}

/// A row as read from SQLite, before the document is decoded.
struct RawRecord {
    document: String,
    needs_review: bool,
    created_at: String,
    updated_at: String,
}

impl RawRecord {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            document: row.get(0)?,
            needs_review: row.get(1)?,
            created_at: row.get(2)?,
            updated_at: row.get(3)?,
        })
    }

    fn into_stored(self) -> Result<StoredPodcast, CatalogError> {
        Ok(StoredPodcast {
            podcast: serde_json::from_str(&self.document)?,
            needs_review: self.needs_review,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

fn is_past(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}

/// Fixed-width UTC timestamps sort lexicographically.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, CatalogError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CatalogError::Serialization(format!("bad timestamp '{}': {}", raw, e)))
}

/// Turn free text into an FTS5 expression matching every word.
///
/// Each word is quoted so FTS operators in user input are taken literally.
fn fts_match_expression(text: &str) -> Option<String> {
    let terms: Vec<String> = text
        .split_whitespace()
        .map(|word| word.replace('"', ""))
        .filter(|word| !word.is_empty())
        .map(|word| format!("\"{}\"", word))
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" "))
    }
}
