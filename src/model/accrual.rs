use serde::{Deserialize, Serialize};

use crate::model::status::{AccrualKind, AccrualStatus};

/// One accrual ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccrualEntry {
    pub entry_id: String,
    pub date: String,
    pub description: String,
    pub amount: f64,
    pub kind: AccrualKind,
    pub category: String,
    pub status: AccrualStatus,
    pub vendor: String,
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// The persisted accrual ledger
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccrualBook {
    #[serde(default)]
    pub entries: Vec<AccrualEntry>,
}

impl AccrualBook {
    pub fn find(&self, entry_id: &str) -> Option<&AccrualEntry> {
        self.entries.iter().find(|e| e.entry_id == entry_id)
    }
}

/// Derived accrual totals, recomputed on demand
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccrualSummary {
    pub total_accruals: usize,
    pub total_amount: f64,
    pub pending_count: usize,
    pub review_count: usize,
    pub exception_count: usize,
    /// RFC 3339 timestamp of when the summary was computed
    pub last_updated: String,
}

/// Optional accrual list filters, AND-combined
#[derive(Debug, Clone, Default)]
pub struct AccrualFilter {
    pub status: Option<AccrualStatus>,
    pub kind: Option<AccrualKind>,
    pub category: Option<String>,
    /// Inclusive date range on the entry date, as `YYYY-MM-DD` strings
    pub date_range: Option<(String, String)>,
}

impl AccrualFilter {
    pub fn matches(&self, entry: &AccrualEntry) -> bool {
        if let Some(status) = self.status {
            if entry.status != status {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if entry.kind != kind {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if &entry.category != category {
                return false;
            }
        }
        if let Some((start, end)) = &self.date_range {
            if entry.date.as_str() < start.as_str() || entry.date.as_str() > end.as_str() {
                return false;
            }
        }
        true
    }
}
