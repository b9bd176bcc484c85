//! Local persistence for performance records.
//!
//! The record store is a row-oriented table, one row per discussion topic,
//! with the same columns the group keeps in its spreadsheet:
//!
//! ```text
//! THREAD ID | EVENT | PROPOSED DATE | TIME | LOCATION | PERFORMANCE INFO | CONFIRMED DATE | TIME | STATUS
//! ```
//!
//! Rows are addressed by position. There is no transaction spanning calls:
//! concurrent edits to the same row resolve as last write wins.

mod records;

use std::{fs, io, path::Path, path::PathBuf};

use rusqlite::Connection;

pub use records::{find_record, join_dates, list_records};

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("no row at index {0}")]
    RowOutOfRange(usize),

    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// A column of the record table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    ThreadId,
    Event,
    ProposedDates,
    Location,
    Info,
    ConfirmedDates,
    Status,
}

impl Column {
    pub const COUNT: usize = 7;

    pub const ALL: [Column; Self::COUNT] = [
        Column::ThreadId,
        Column::Event,
        Column::ProposedDates,
        Column::Location,
        Column::Info,
        Column::ConfirmedDates,
        Column::Status,
    ];

    /// The spreadsheet header for this column.
    pub fn header(self) -> &'static str {
        match self {
            Self::ThreadId => "THREAD ID",
            Self::Event => "EVENT",
            Self::ProposedDates => "PROPOSED DATE | TIME",
            Self::Location => "LOCATION",
            Self::Info => "PERFORMANCE INFO",
            Self::ConfirmedDates => "CONFIRMED DATE | TIME",
            Self::Status => "STATUS",
        }
    }

    fn sql_name(self) -> &'static str {
        match self {
            Self::ThreadId => "thread_id",
            Self::Event => "event",
            Self::ProposedDates => "proposed",
            Self::Location => "location",
            Self::Info => "info",
            Self::ConfirmedDates => "confirmed",
            Self::Status => "status",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// One row of cells, indexed by column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: [String; Column::COUNT],
}

impl Row {
    pub fn get(&self, column: Column) -> &str {
        &self.cells[column.index()]
    }

    pub fn set(&mut self, column: Column, value: impl Into<String>) {
        self.cells[column.index()] = value.into();
    }

    pub fn with(mut self, column: Column, value: impl Into<String>) -> Self {
        self.set(column, value);
        self
    }
}

/// The operations the lifecycle needs from a record store.
pub trait RecordStore {
    /// Appends a row after all existing rows.
    fn append_row(&self, row: &Row) -> Result<()>;

    /// Reads every row in insertion order.
    fn rows(&self) -> Result<Vec<Row>>;

    /// Overwrites a single cell of the row at `index`.
    fn update_cell(&self, index: usize, column: Column, value: &str) -> Result<()>;
}

/// SQLite-backed record store.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Opens (or creates) the store at `path`, creating parent directories.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(&path)?)
    }

    /// An ephemeral store, gone when dropped.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    /// Returns the default store path: `~/.encore/records.sqlite`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".encore").join("records.sqlite"))
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS performance (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                thread_id TEXT NOT NULL DEFAULT '',
                event     TEXT NOT NULL DEFAULT '',
                proposed  TEXT NOT NULL DEFAULT '',
                location  TEXT NOT NULL DEFAULT '',
                info      TEXT NOT NULL DEFAULT '',
                confirmed TEXT NOT NULL DEFAULT '',
                status    TEXT NOT NULL DEFAULT ''
            );",
        )?;
        Ok(Self { conn })
    }

    /// Row id of the row at a 0-based position.
    fn row_id(&self, index: usize) -> Result<i64> {
        let offset = i64::try_from(index).map_err(|_| StorageError::RowOutOfRange(index))?;
        match self.conn.query_row(
            "SELECT id FROM performance ORDER BY id LIMIT 1 OFFSET ?1",
            [offset],
            |row| row.get(0),
        ) {
            Ok(id) => Ok(id),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(StorageError::RowOutOfRange(index)),
            Err(e) => Err(e.into()),
        }
    }
}

impl RecordStore for Storage {
    fn append_row(&self, row: &Row) -> Result<()> {
        self.conn.execute(
            "INSERT INTO performance (thread_id, event, proposed, location, info, confirmed, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                row.get(Column::ThreadId),
                row.get(Column::Event),
                row.get(Column::ProposedDates),
                row.get(Column::Location),
                row.get(Column::Info),
                row.get(Column::ConfirmedDates),
                row.get(Column::Status),
            ],
        )?;
        Ok(())
    }

    fn rows(&self) -> Result<Vec<Row>> {
        let mut stmt = self.conn.prepare(
            "SELECT thread_id, event, proposed, location, info, confirmed, status
             FROM performance ORDER BY id",
        )?;
        let rows = stmt.query_map([], |r| {
            let mut row = Row::default();
            for (i, column) in Column::ALL.into_iter().enumerate() {
                row.set(column, r.get::<_, String>(i)?);
            }
            Ok(row)
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn update_cell(&self, index: usize, column: Column, value: &str) -> Result<()> {
        let id = self.row_id(index)?;
        // Column names come from a closed enum, never from input.
        let sql = format!(
            "UPDATE performance SET {} = ?1 WHERE id = ?2",
            column.sql_name()
        );
        self.conn.execute(&sql, rusqlite::params![value, id])?;
        Ok(())
    }
}

/// Opens the store at `path`, or the default location when `None`.
///
/// The path `:memory:` opens an ephemeral store.
pub fn open(path: Option<&Path>) -> Result<Storage> {
    match path {
        Some(p) if p == Path::new(":memory:") => Storage::open_in_memory(),
        Some(p) => Storage::open(p),
        None => {
            let default = Storage::default_path().ok_or_else(|| {
                StorageError::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    "could not determine home directory",
                ))
            })?;
            Storage::open(default)
        }
    }
}
