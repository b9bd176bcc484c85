//! Output formatting for CLI display.

use crate::model::PerformanceRecord;
use crate::storage::{Column, Row};

/// One line per record: thread, status, event, then the shown dates.
pub(super) fn format_record_line(record: &PerformanceRecord) -> String {
    let dates = record.announced_dates().join(", ");
    format!(
        "{}  [{}]  {}  ({dates})",
        record.thread_id, record.status, record.event
    )
}

pub(super) fn tsv_header() -> String {
    Column::ALL
        .iter()
        .map(|c| c.header())
        .collect::<Vec<_>>()
        .join("\t")
}

/// Multi-date cells are flattened onto one line.
pub(super) fn format_tsv_row(row: &Row) -> String {
    Column::ALL
        .iter()
        .map(|&c| row.get(c).replace('\n', "; ").replace('\t', " "))
        .collect::<Vec<_>>()
        .join("\t")
}
