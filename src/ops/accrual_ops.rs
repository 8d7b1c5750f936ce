use chrono::Utc;

use crate::model::accrual::{AccrualBook, AccrualEntry, AccrualFilter, AccrualSummary};
use crate::model::status::{AccrualKind, AccrualStatus};

#[derive(Debug, thiserror::Error)]
pub enum AccrualError {
    #[error("accrual not found: {0}")]
    NotFound(String),
}

/// Fields for a new ledger entry; `add_entry` allocates the id and sets the
/// initial status to pending.
#[derive(Debug, Clone)]
pub struct NewAccrual {
    pub date: String,
    pub description: String,
    pub amount: f64,
    pub kind: AccrualKind,
    pub category: String,
    pub vendor: String,
    pub reference: String,
    pub expected_date: Option<String>,
    pub notes: Option<String>,
}

/// Partial update applied to an existing entry; unset fields keep their
/// current values.
#[derive(Debug, Default, Clone)]
pub struct AccrualPatch {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub status: Option<AccrualStatus>,
    pub expected_date: Option<String>,
    pub notes: Option<String>,
}

/// Next id in the `ACC###` sequence: one past the highest numeric suffix
/// already in the book. Ids of removed entries are never reused below the
/// high-water mark.
pub fn next_entry_id(book: &AccrualBook) -> String {
    let high = book
        .entries
        .iter()
        .filter_map(|e| e.entry_id.strip_prefix("ACC")?.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("ACC{:03}", high + 1)
}

/// Append a new entry, returning the replacement book and the allocated id
pub fn add_entry(book: &AccrualBook, new: NewAccrual) -> (AccrualBook, String) {
    let entry_id = next_entry_id(book);
    let mut updated = book.clone();
    updated.entries.push(AccrualEntry {
        entry_id: entry_id.clone(),
        date: new.date,
        description: new.description,
        amount: new.amount,
        kind: new.kind,
        category: new.category,
        status: AccrualStatus::Pending,
        vendor: new.vendor,
        reference: new.reference,
        expected_date: new.expected_date,
        notes: new.notes,
    });
    (updated, entry_id)
}

/// Merge a patch into the entry with the given id
pub fn update_entry(
    book: &AccrualBook,
    entry_id: &str,
    patch: AccrualPatch,
) -> Result<AccrualBook, AccrualError> {
    let mut updated = book.clone();
    let entry = updated
        .entries
        .iter_mut()
        .find(|e| e.entry_id == entry_id)
        .ok_or_else(|| AccrualError::NotFound(entry_id.to_string()))?;

    if let Some(description) = patch.description {
        entry.description = description;
    }
    if let Some(amount) = patch.amount {
        entry.amount = amount;
    }
    if let Some(status) = patch.status {
        entry.status = status;
    }
    if let Some(expected_date) = patch.expected_date {
        entry.expected_date = Some(expected_date);
    }
    if let Some(notes) = patch.notes {
        entry.notes = Some(notes);
    }
    Ok(updated)
}

pub fn set_status(
    book: &AccrualBook,
    entry_id: &str,
    status: AccrualStatus,
) -> Result<AccrualBook, AccrualError> {
    update_entry(
        book,
        entry_id,
        AccrualPatch {
            status: Some(status),
            ..AccrualPatch::default()
        },
    )
}

pub fn remove_entry(book: &AccrualBook, entry_id: &str) -> Result<AccrualBook, AccrualError> {
    if book.find(entry_id).is_none() {
        return Err(AccrualError::NotFound(entry_id.to_string()));
    }
    let mut updated = book.clone();
    updated.entries.retain(|e| e.entry_id != entry_id);
    Ok(updated)
}

/// Select entries matching the filter, preserving ledger order
pub fn filter_entries<'a>(
    book: &'a AccrualBook,
    criteria: &AccrualFilter,
) -> Vec<&'a AccrualEntry> {
    book.entries
        .iter()
        .filter(|e| criteria.matches(e))
        .collect()
}

/// Aggregate the ledger, stamped with the current time in RFC 3339
pub fn accrual_summary(book: &AccrualBook) -> AccrualSummary {
    AccrualSummary {
        total_accruals: book.entries.len(),
        total_amount: book.entries.iter().map(|e| e.amount).sum(),
        pending_count: count_status(book, AccrualStatus::Pending),
        review_count: count_status(book, AccrualStatus::Review),
        exception_count: count_status(book, AccrualStatus::Exception),
        last_updated: Utc::now().to_rfc3339(),
    }
}

fn count_status(book: &AccrualBook, status: AccrualStatus) -> usize {
    book.entries.iter().filter(|e| e.status == status).count()
}
