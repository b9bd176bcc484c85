//! Record mapping: performance records to and from store rows.

use crate::model::{Field, PerformanceRecord, Status, ThreadId};

use super::{Column, RecordStore, Result, Row, StorageError};

impl From<Field> for Column {
    fn from(field: Field) -> Self {
        match field {
            Field::Event => Column::Event,
            Field::ProposedDates => Column::ProposedDates,
            Field::Location => Column::Location,
            Field::Info => Column::Info,
            Field::ConfirmedDates => Column::ConfirmedDates,
            Field::Status => Column::Status,
        }
    }
}

/// Date entries are stored one per line.
pub fn join_dates(dates: &[String]) -> String {
    dates.join("\n")
}

fn split_dates(cell: &str) -> Vec<String> {
    cell.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

impl Row {
    /// Builds the row for a record.
    pub fn from_record(record: &PerformanceRecord) -> Self {
        Row::default()
            .with(Column::ThreadId, record.thread_id.to_string())
            .with(Column::Event, record.event.as_str())
            .with(Column::ProposedDates, join_dates(&record.proposed_dates))
            .with(Column::Location, record.location.as_str())
            .with(Column::Info, record.info.as_str())
            .with(Column::ConfirmedDates, join_dates(&record.confirmed_dates))
            .with(Column::Status, record.status.as_cell())
    }

    /// Reads a record back. Rows with a non-numeric thread id or an unknown
    /// status are corrupt.
    pub fn to_record(&self) -> Result<PerformanceRecord> {
        let thread_id = self
            .get(Column::ThreadId)
            .trim()
            .parse::<ThreadId>()
            .map_err(|e| StorageError::Corrupt(format!("invalid thread id: {e}")))?;
        let status = Status::from_cell(self.get(Column::Status)).ok_or_else(|| {
            StorageError::Corrupt(format!(
                "unknown status for thread {thread_id}: {}",
                self.get(Column::Status)
            ))
        })?;

        Ok(PerformanceRecord {
            thread_id,
            event: self.get(Column::Event).to_string(),
            proposed_dates: split_dates(self.get(Column::ProposedDates)),
            location: self.get(Column::Location).to_string(),
            info: self.get(Column::Info).to_string(),
            confirmed_dates: split_dates(self.get(Column::ConfirmedDates)),
            status,
        })
    }
}

/// Finds the record for a thread with its row index. First match wins.
pub fn find_record<S: RecordStore + ?Sized>(
    store: &S,
    thread_id: ThreadId,
) -> Result<Option<(usize, PerformanceRecord)>> {
    let key = thread_id.to_string();
    let rows = store.rows()?;
    let Some((index, row)) = rows
        .iter()
        .enumerate()
        .find(|(_, row)| row.get(Column::ThreadId).trim() == key)
    else {
        return Ok(None);
    };
    Ok(Some((index, row.to_record()?)))
}

/// All records in store order. Unreadable rows are skipped.
pub fn list_records<S: RecordStore + ?Sized>(store: &S) -> Result<Vec<PerformanceRecord>> {
    Ok(store
        .rows()?
        .iter()
        .filter_map(|row| match row.to_record() {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("skipping row: {e}");
                None
            }
        })
        .collect())
}
