use crate::error::{ReliquaryError, Result};
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;
use tracing::debug;

/// Read-only handle over an asset archive
///
/// An archive is a single SQLite file with one `entries` table mapping
/// logical names to compressed payloads. The handle owns the connection
/// for its whole lifetime; it is never reopened in place, and dropping it
/// (or calling [`Archive::close`]) releases the connection.
///
/// A handle is not safe for concurrent use from multiple threads; open
/// independent handles or serialize access externally.
pub struct Archive {
    pub(crate) conn: Connection,
}

impl Archive {
    /// Open an archive file strictly read-only
    ///
    /// Fails with [`ReliquaryError::InvalidPath`] on an empty path and
    /// with [`ReliquaryError::Sqlite`] if the file cannot be opened. On
    /// failure no partial handle exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(ReliquaryError::InvalidPath("empty path".to_string()));
        }

        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Ok(Self { conn })
    }

    /// Close the archive, releasing the connection
    ///
    /// Dropping the handle has the same effect; `close` additionally
    /// surfaces any error SQLite reports while shutting down.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| ReliquaryError::Sqlite(e))
    }

    /// Check whether a name exists in the archive without loading it
    pub fn contains(&self, name: &str) -> bool {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM entries WHERE name = ?1",
                params![name],
                |row| row.get::<_, i64>(0),
            )
            .map(|count| count > 0)
            .unwrap_or(false)
    }

    /// Total number of entries in the archive
    ///
    /// Returns `-1` if the query cannot be prepared or yields no row.
    pub fn count_entries(&self) -> i64 {
        self.scalar_count("SELECT COUNT(*) FROM entries")
    }

    /// Number of entries carrying a non-empty payload
    ///
    /// Alias-only rows hold no payload and are not counted. Returns `-1`
    /// on query failure.
    pub fn count_payloads(&self) -> i64 {
        self.scalar_count(
            "SELECT COUNT(*) FROM entries WHERE payload IS NOT NULL AND length(payload) > 0",
        )
    }

    /// Number of entries carrying a non-empty alias
    ///
    /// Returns `-1` on query failure.
    pub fn count_aliases(&self) -> i64 {
        self.scalar_count("SELECT COUNT(*) FROM entries WHERE alias IS NOT NULL AND alias != ''")
    }

    fn scalar_count(&self, sql: &str) -> i64 {
        match self.conn.query_row(sql, [], |row| row.get(0)) {
            Ok(count) => count,
            Err(e) => {
                debug!("stat query failed: {}", e);
                -1
            }
        }
    }
}
