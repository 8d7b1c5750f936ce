use serde::{Deserialize, Serialize};

use crate::model::status::{TxnSide, TxnStatus};

/// One bank-side transaction in the reconciliation working set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankTransaction {
    pub transaction_id: String,
    pub date: String,
    pub description: String,
    pub amount: f64,
    pub side: TxnSide,
    pub status: TxnStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub gl_account_matched: bool,
    /// Account number of the matched ledger entry, once matched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gl_account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception_reason: Option<String>,
}

/// One ledger-side entry in the reconciliation working set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlEntry {
    pub entry_id: String,
    pub date: String,
    pub description: String,
    pub amount: f64,
    pub side: TxnSide,
    pub account_number: String,
    pub reference: String,
    /// Bank transaction id this entry is matched to, once matched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_bank_transaction: Option<String>,
    pub status: TxnStatus,
}

/// The persisted reconciliation working set, both sides together
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconWorkspace {
    #[serde(default)]
    pub bank: Vec<BankTransaction>,
    #[serde(default)]
    pub gl: Vec<GlEntry>,
}

/// Derived reconciliation totals and counts, recomputed on demand
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationSummary {
    pub total_debits: f64,
    pub total_credits: f64,
    pub unmatched_gl_entries: usize,
    pub unmatched_bank_transactions: usize,
    pub pending_checks: usize,
    pub exceptions_count: usize,
}
