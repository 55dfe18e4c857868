use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use rusqlite_migration::{Migrations, M};
use tokio::sync::watch;

use crate::app::{NewsError, Result};
use crate::domain::ArticleRecord;
use crate::store::Store;

const SELECT_COLUMNS: &str = "SELECT url, source_name, author, title, description, url_to_image,
        published_at, content, retrieved_at FROM articles";

pub struct SqliteStore {
    conn: Mutex<Connection>,
    changes: watch::Sender<u64>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let (changes, _) = watch::channel(0);
        let store = Self {
            conn: Mutex::new(conn),
            changes,
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.lock()?;
        migrations.to_latest(&mut conn)?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            NewsError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.changes.receiver_count()
    }

    fn notify(&self) {
        self.changes.send_modify(|version| *version += 1);
    }

    fn read_record(row: &Row<'_>) -> rusqlite::Result<ArticleRecord> {
        Ok(ArticleRecord {
            url: row.get(0)?,
            source_name: row.get(1)?,
            author: row.get(2)?,
            title: row.get(3)?,
            description: row.get(4)?,
            url_to_image: row.get(5)?,
            published_at: row.get(6)?,
            content: row.get(7)?,
            retrieved_at: row.get(8)?,
        })
    }

    fn insert_valid(tx: &Transaction<'_>, records: &[ArticleRecord]) -> Result<usize> {
        let mut stmt = tx.prepare(
            "INSERT OR REPLACE INTO articles (url, source_name, author, title, description,
                url_to_image, published_at, content, retrieved_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;

        let mut count = 0;
        for record in records {
            if !record.is_valid() {
                tracing::warn!("Refusing to persist article without url or title");
                continue;
            }
            count += stmt.execute(params![
                record.url,
                record.source_name,
                record.author,
                record.title,
                record.description,
                record.url_to_image,
                record.published_at,
                record.content,
                record.retrieved_at
            ])?;
        }

        Ok(count)
    }
}

impl Store for SqliteStore {
    fn insert_or_replace(&self, records: &[ArticleRecord]) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let count = Self::insert_valid(&tx, records)?;
        tx.commit()?;
        drop(conn);

        self.notify();
        Ok(count)
    }

    fn replace_all(&self, records: &[ArticleRecord]) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM articles", [])?;
        let count = Self::insert_valid(&tx, records)?;
        tx.commit()?;
        drop(conn);

        self.notify();
        Ok(count)
    }

    fn delete_all(&self) -> Result<usize> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM articles", [])?;
        drop(conn);

        if deleted > 0 {
            self.notify();
        }
        Ok(deleted)
    }

    fn delete_older_than(&self, timestamp_ms: i64) -> Result<usize> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM articles WHERE retrieved_at < ?1",
            params![timestamp_ms],
        )?;
        drop(conn);

        if deleted > 0 {
            self.notify();
        }
        Ok(deleted)
    }

    fn get_all(&self) -> Result<Vec<ArticleRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "{SELECT_COLUMNS} ORDER BY retrieved_at DESC, published_at DESC"
        ))?;

        let records = stmt
            .query_map([], Self::read_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn get_by_url(&self, url: &str) -> Result<Option<ArticleRecord>> {
        let conn = self.lock()?;
        let record = conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE url = ?1"),
                params![url],
                Self::read_record,
            )
            .optional()?;

        Ok(record)
    }

    fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn changes(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }
}
