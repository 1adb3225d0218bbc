//! SQLite-backed file library implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;
use uuid::Uuid;

use super::{FileLibrary, FileObject, LibraryError, LibraryQuery, NewFileObject};

const SELECT_COLUMNS: &str = "id, user_id, name, mime_type, size_bytes, date_added, processed,
     converted_format, date_processed";

/// SQLite-backed file library.
pub struct SqliteLibrary {
    conn: Mutex<Connection>,
}

impl SqliteLibrary {
    /// Open (or create) the library database at the given path.
    pub fn new(path: &Path) -> Result<Self, LibraryError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory library (useful for testing).
    pub fn in_memory() -> Result<Self, LibraryError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), LibraryError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS files (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                mime_type TEXT NOT NULL,
                size_bytes INTEGER NOT NULL,
                date_added TEXT NOT NULL,
                processed INTEGER NOT NULL DEFAULT 0,
                converted_format TEXT,
                date_processed TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_files_user ON files(user_id);
            CREATE INDEX IF NOT EXISTS idx_files_user_added ON files(user_id, date_added);
            "#,
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, LibraryError> {
        self.conn
            .lock()
            .map_err(|e| LibraryError::Internal(format!("connection lock poisoned: {}", e)))
    }

    fn parse_timestamp(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }

    fn row_to_file(row: &rusqlite::Row) -> rusqlite::Result<FileObject> {
        let date_added: String = row.get(5)?;
        let date_processed: Option<String> = row.get(8)?;
        let size_bytes: i64 = row.get(4)?;

        Ok(FileObject {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            mime_type: row.get(3)?,
            size_bytes: size_bytes.max(0) as u64,
            date_added: Self::parse_timestamp(&date_added),
            processed: row.get(6)?,
            converted_format: row.get(7)?,
            date_processed: date_processed.as_deref().map(Self::parse_timestamp),
        })
    }

    fn get_with(conn: &Connection, user_id: &str, id: &str) -> Result<FileObject, LibraryError> {
        conn.query_row(
            &format!(
                "SELECT {} FROM files WHERE user_id = ?1 AND id = ?2",
                SELECT_COLUMNS
            ),
            params![user_id, id],
            Self::row_to_file,
        )
        .optional()?
        .ok_or_else(|| LibraryError::NotFound(id.to_string()))
    }
}

/// Escape LIKE wildcards so user search text matches literally.
fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

impl FileLibrary for SqliteLibrary {
    fn add(&self, user_id: &str, file: NewFileObject) -> Result<FileObject, LibraryError> {
        let conn = self.lock()?;
        let now = Utc::now();
        let object = FileObject {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: file.name,
            mime_type: file.mime_type,
            size_bytes: file.size_bytes,
            date_added: now,
            processed: false,
            converted_format: None,
            date_processed: None,
        };

        conn.execute(
            "INSERT INTO files (id, user_id, name, mime_type, size_bytes, date_added, processed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)",
            params![
                &object.id,
                &object.user_id,
                &object.name,
                &object.mime_type,
                object.size_bytes as i64,
                now.to_rfc3339(),
            ],
        )?;

        debug!(
            user_id = %user_id,
            file_id = %object.id,
            name = %object.name,
            "Added file to library"
        );
        Ok(object)
    }

    fn get(&self, user_id: &str, id: &str) -> Result<FileObject, LibraryError> {
        let conn = self.lock()?;
        Self::get_with(&conn, user_id, id)
    }

    fn list(&self, user_id: &str, query: &LibraryQuery) -> Result<Vec<FileObject>, LibraryError> {
        let conn = self.lock()?;
        let pattern = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);

        // Column and direction come from closed enums, never from user text.
        let sql = format!(
            "SELECT {} FROM files
             WHERE user_id = ?1 AND (?2 IS NULL OR name LIKE ?2 ESCAPE '\\')
             ORDER BY {} {}, id ASC
             LIMIT ?3",
            SELECT_COLUMNS,
            query.sort.column(),
            query.order.keyword(),
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![user_id, pattern, query.limit as i64],
            Self::row_to_file,
        )?;

        let mut files = Vec::new();
        for row in rows {
            files.push(row?);
        }
        Ok(files)
    }

    fn mark_processed(
        &self,
        user_id: &str,
        id: &str,
        converted_format: &str,
    ) -> Result<FileObject, LibraryError> {
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE files SET processed = 1, converted_format = ?1, date_processed = ?2
             WHERE user_id = ?3 AND id = ?4",
            params![converted_format, Utc::now().to_rfc3339(), user_id, id],
        )?;

        if updated == 0 {
            return Err(LibraryError::NotFound(id.to_string()));
        }
        Self::get_with(&conn, user_id, id)
    }

    fn remove(&self, user_id: &str, id: &str) -> Result<(), LibraryError> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM files WHERE user_id = ?1 AND id = ?2",
            params![user_id, id],
        )?;

        if deleted == 0 {
            return Err(LibraryError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn count(&self, user_id: &str) -> Result<u64, LibraryError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM files WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }
}
