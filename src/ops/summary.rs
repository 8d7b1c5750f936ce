use serde::Serialize;

use crate::model::accrual::AccrualEntry;
use crate::model::recon::{BankTransaction, GlEntry, ReconWorkspace, ReconciliationSummary};
use crate::model::settlement::SettlementPayment;
use crate::model::status::{AccrualStatus, TaskStatus, TxnSide, TxnStatus};
use crate::model::task::Category;

/// Anything the currency totals run over. The associated status type keeps
/// `total_by_status` honest: bank records filter on transaction status,
/// accruals on accrual status, with no stringly-typed crossover.
pub trait LedgerItem {
    type Status: Copy + PartialEq;

    fn amount(&self) -> f64;
    fn status(&self) -> Self::Status;
}

impl LedgerItem for BankTransaction {
    type Status = TxnStatus;

    fn amount(&self) -> f64 {
        self.amount
    }

    fn status(&self) -> TxnStatus {
        self.status
    }
}

impl LedgerItem for GlEntry {
    type Status = TxnStatus;

    fn amount(&self) -> f64 {
        self.amount
    }

    fn status(&self) -> TxnStatus {
        self.status
    }
}

impl LedgerItem for AccrualEntry {
    type Status = AccrualStatus;

    fn amount(&self) -> f64 {
        self.amount
    }

    fn status(&self) -> AccrualStatus {
        self.status
    }
}

/// Bank and GL records share the side/status surface the list filters use
pub trait TxnRecord: LedgerItem<Status = TxnStatus> {
    fn side(&self) -> TxnSide;
}

impl TxnRecord for BankTransaction {
    fn side(&self) -> TxnSide {
        self.side
    }
}

impl TxnRecord for GlEntry {
    fn side(&self) -> TxnSide {
        self.side
    }
}

// ---------------------------------------------------------------------------
// Filters and totals
// ---------------------------------------------------------------------------

/// Criteria for transaction lists. Unset fields match everything;
/// set fields are AND-combined.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TxnFilter {
    pub status: Option<TxnStatus>,
    pub side: Option<TxnSide>,
}

impl TxnFilter {
    pub fn matches<T: TxnRecord>(&self, item: &T) -> bool {
        self.status.is_none_or(|s| item.status() == s)
            && self.side.is_none_or(|s| item.side() == s)
    }
}

/// Select records matching the filter, preserving input order
pub fn filter<'a, T: TxnRecord>(items: &'a [T], criteria: &TxnFilter) -> Vec<&'a T> {
    items.iter().filter(|item| criteria.matches(*item)).collect()
}

pub fn total<T: LedgerItem>(items: &[T]) -> f64 {
    items.iter().map(|item| item.amount()).sum()
}

pub fn total_by_status<T: LedgerItem>(items: &[T], status: T::Status) -> f64 {
    items
        .iter()
        .filter(|item| item.status() == status)
        .map(|item| item.amount())
        .sum()
}

/// Format `part` as a percentage of `whole` with one decimal place.
///
/// A zero whole yields the literal `"0%"` rather than NaN or Infinity, so
/// the string is always printable.
pub fn percentage(part: f64, whole: f64) -> String {
    if whole == 0.0 {
        "0%".to_string()
    } else {
        format!("{:.1}%", part / whole * 100.0)
    }
}

// ---------------------------------------------------------------------------
// Reconciliation summary
// ---------------------------------------------------------------------------

/// Aggregate the reconciliation working set for the summary panel.
///
/// Read-only; every counter is recomputed from the current lists on each
/// call, so the numbers always reflect the latest match actions.
pub fn reconciliation_summary(workspace: &ReconWorkspace) -> ReconciliationSummary {
    let total_debits = workspace
        .bank
        .iter()
        .filter(|t| t.side == TxnSide::Debit)
        .map(|t| t.amount)
        .sum();
    let total_credits = workspace
        .bank
        .iter()
        .filter(|t| t.side == TxnSide::Credit)
        .map(|t| t.amount)
        .sum();

    ReconciliationSummary {
        total_debits,
        total_credits,
        unmatched_gl_entries: workspace
            .gl
            .iter()
            .filter(|e| e.matched_bank_transaction.is_none())
            .count(),
        unmatched_bank_transactions: workspace
            .bank
            .iter()
            .filter(|t| !t.gl_account_matched)
            .count(),
        pending_checks: workspace
            .bank
            .iter()
            .filter(|t| t.check_number.is_some() && t.status != TxnStatus::Cleared)
            .count(),
        exceptions_count: workspace
            .bank
            .iter()
            .filter(|t| t.status == TxnStatus::Exception)
            .count(),
    }
}

// ---------------------------------------------------------------------------
// Catalog progress
// ---------------------------------------------------------------------------

/// Structured result from `cb summary`, suitable for --json output.
#[derive(Debug, Serialize)]
pub struct CatalogSummary {
    pub total_tasks: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub backlog: usize,
    pub percent_complete: String,
    pub estimated_minutes_total: u32,
    pub estimated_minutes_remaining: u32,
    pub categories: Vec<CategorySummary>,
}

#[derive(Debug, Serialize)]
pub struct CategorySummary {
    pub name: String,
    pub completed: usize,
    pub total: usize,
    pub percent_complete: String,
}

/// Progress rollup across the whole catalog. Estimates count step-level
/// minutes only; substep estimates are a drill-down, not part of the
/// close-plan budget.
pub fn catalog_summary(categories: &[Category]) -> CatalogSummary {
    let mut summary = CatalogSummary {
        total_tasks: 0,
        completed: 0,
        in_progress: 0,
        backlog: 0,
        percent_complete: String::new(),
        estimated_minutes_total: 0,
        estimated_minutes_remaining: 0,
        categories: Vec::with_capacity(categories.len()),
    };

    for category in categories {
        let (done, total) = category.completion();
        summary.categories.push(CategorySummary {
            name: category.name.clone(),
            completed: done,
            total,
            percent_complete: percentage(done as f64, total as f64),
        });

        for task in &category.tasks {
            summary.total_tasks += 1;
            summary.estimated_minutes_total += task.estimated_minutes;
            match task.status {
                TaskStatus::Completed => summary.completed += 1,
                TaskStatus::InProgress => {
                    summary.in_progress += 1;
                    summary.estimated_minutes_remaining += task.estimated_minutes;
                }
                TaskStatus::Backlog => {
                    summary.backlog += 1;
                    summary.estimated_minutes_remaining += task.estimated_minutes;
                }
            }
        }
    }

    summary.percent_complete =
        percentage(summary.completed as f64, summary.total_tasks as f64);
    summary
}

// ---------------------------------------------------------------------------
// Settlement summary
// ---------------------------------------------------------------------------

/// Structured result from `cb settle summary`
#[derive(Debug, Serialize)]
pub struct SettlementSummary {
    pub payment_count: usize,
    pub gross_amount: f64,
    pub total_fees: f64,
    pub net_amount: f64,
    pub refund_count: usize,
    pub refunded_amount: f64,
}

pub fn settlement_summary(payments: &[SettlementPayment]) -> SettlementSummary {
    SettlementSummary {
        payment_count: payments.len(),
        gross_amount: payments.iter().map(|p| p.amount).sum(),
        total_fees: payments.iter().map(|p| p.processor_fee).sum(),
        net_amount: payments.iter().map(|p| p.net_amount).sum(),
        refund_count: payments.iter().filter(|p| p.refunded).count(),
        refunded_amount: payments.iter().map(|p| p.refund_amount).sum(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn txn(id: &str, amount: f64, side: TxnSide, status: TxnStatus) -> BankTransaction {
        BankTransaction {
            transaction_id: id.to_string(),
            date: "2024-03-15".to_string(),
            description: format!("txn {id}"),
            amount,
            side,
            status,
            check_number: None,
            customer_name: None,
            gl_account_matched: false,
            gl_account: None,
            exception_reason: None,
        }
    }

    fn gl(id: &str, amount: f64, matched: Option<&str>) -> GlEntry {
        GlEntry {
            entry_id: id.to_string(),
            date: "2024-03-15".to_string(),
            description: format!("entry {id}"),
            amount,
            side: TxnSide::Debit,
            account_number: "1000".to_string(),
            reference: "REF".to_string(),
            matched_bank_transaction: matched.map(str::to_string),
            status: TxnStatus::Review,
        }
    }

    // --- Filters and totals ---

    #[test]
    fn test_filter_by_status_preserves_order() {
        let txns = vec![
            txn("BT01", 20.0, TxnSide::Debit, TxnStatus::Cleared),
            txn("BT02", 30.0, TxnSide::Debit, TxnStatus::Review),
            txn("BT03", 10.0, TxnSide::Credit, TxnStatus::Cleared),
            txn("BT04", 25.0, TxnSide::Debit, TxnStatus::Cleared),
        ];
        let criteria = TxnFilter {
            status: Some(TxnStatus::Cleared),
            side: None,
        };
        let matched = filter(&txns, &criteria);
        let ids: Vec<&str> = matched.iter().map(|t| t.transaction_id.as_str()).collect();
        assert_eq!(ids, vec!["BT01", "BT03", "BT04"]);
    }

    #[test]
    fn test_filter_criteria_and_combined() {
        let txns = vec![
            txn("BT01", 20.0, TxnSide::Debit, TxnStatus::Cleared),
            txn("BT02", 30.0, TxnSide::Credit, TxnStatus::Cleared),
            txn("BT03", 10.0, TxnSide::Debit, TxnStatus::Review),
        ];
        let criteria = TxnFilter {
            status: Some(TxnStatus::Cleared),
            side: Some(TxnSide::Debit),
        };
        let matched = filter(&txns, &criteria);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].transaction_id, "BT01");
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let txns = vec![
            txn("BT01", 20.0, TxnSide::Debit, TxnStatus::Cleared),
            txn("BT02", 30.0, TxnSide::Credit, TxnStatus::Review),
        ];
        assert_eq!(filter(&txns, &TxnFilter::default()).len(), 2);
    }

    #[test]
    fn test_five_transactions_totaling_one_hundred() {
        // One cleared $20 in a $100 book: the cleared share reads "20.0%"
        let txns = vec![
            txn("BT01", 20.0, TxnSide::Debit, TxnStatus::Cleared),
            txn("BT02", 30.0, TxnSide::Debit, TxnStatus::Review),
            txn("BT03", 10.0, TxnSide::Credit, TxnStatus::Review),
            txn("BT04", 25.0, TxnSide::Debit, TxnStatus::Exception),
            txn("BT05", 15.0, TxnSide::Credit, TxnStatus::Review),
        ];
        let grand_total = total(&txns);
        assert_eq!(grand_total, 100.0);
        let cleared = total_by_status(&txns, TxnStatus::Cleared);
        assert_eq!(cleared, 20.0);
        assert_eq!(percentage(cleared, grand_total), "20.0%");
    }

    #[test]
    fn test_percentage_of_zero_whole_is_printable() {
        assert_eq!(percentage(0.0, 0.0), "0%");
        assert_eq!(percentage(50.0, 0.0), "0%");
    }

    #[test]
    fn test_percentage_of_zero_part_keeps_the_decimal() {
        // Only a zero denominator collapses to the bare "0%" literal
        assert_eq!(percentage(0.0, 2.0), "0.0%");
    }

    #[test]
    fn test_percentage_rounds_to_one_decimal() {
        assert_eq!(percentage(1.0, 3.0), "33.3%");
        assert_eq!(percentage(2.0, 3.0), "66.7%");
        assert_eq!(percentage(100.0, 100.0), "100.0%");
    }

    // --- Reconciliation summary ---

    #[test]
    fn test_reconciliation_summary_counts() {
        let mut matched = txn("BT01", 500.0, TxnSide::Debit, TxnStatus::Cleared);
        matched.gl_account_matched = true;
        matched.gl_account = Some("1001".to_string());
        let mut pending_check = txn("BT02", 120.0, TxnSide::Debit, TxnStatus::Review);
        pending_check.check_number = Some("1002".to_string());
        let mut cleared_check = txn("BT03", 80.0, TxnSide::Debit, TxnStatus::Cleared);
        cleared_check.check_number = Some("1003".to_string());
        cleared_check.gl_account_matched = true;
        let exception = txn("BT04", 210.0, TxnSide::Credit, TxnStatus::Exception);

        let workspace = ReconWorkspace {
            bank: vec![matched, pending_check, cleared_check, exception],
            gl: vec![gl("GL01", 500.0, Some("BT01")), gl("GL02", 75.0, None)],
        };

        let summary = reconciliation_summary(&workspace);
        assert_eq!(summary.total_debits, 700.0);
        assert_eq!(summary.total_credits, 210.0);
        assert_eq!(summary.unmatched_bank_transactions, 2);
        assert_eq!(summary.unmatched_gl_entries, 1);
        assert_eq!(summary.pending_checks, 1);
        assert_eq!(summary.exceptions_count, 1);
    }

    #[test]
    fn test_reconciliation_summary_of_empty_workspace() {
        let summary = reconciliation_summary(&ReconWorkspace::default());
        assert_eq!(summary.total_debits, 0.0);
        assert_eq!(summary.total_credits, 0.0);
        assert_eq!(summary.unmatched_bank_transactions, 0);
        assert_eq!(summary.unmatched_gl_entries, 0);
        assert_eq!(summary.pending_checks, 0);
        assert_eq!(summary.exceptions_count, 0);
    }

    // --- Catalog progress ---

    #[test]
    fn test_catalog_summary_counts_and_minutes() {
        let steps = "\
category,step_number,step_name,description,assigned_to,status,priority,estimated_time_minutes,requires_approval,integration_required,required_integrations
Cash,1,Reconcile cash,d,Pip,Completed,High,10,Yes,No,\"\"
Cash,2,Record transfers,d,Pip,In Progress,High,20,Yes,No,\"\"
AR,1,Record payments,d,Pip,Backlog,High,30,Yes,No,\"\"
AR,2,Record invoices,d,Human,Completed,Medium,15,Yes,No,\"\"
";
        let (categories, _) = crate::parse::parse_catalog(steps, "");
        let summary = catalog_summary(&categories);

        assert_eq!(summary.total_tasks, 4);
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.in_progress, 1);
        assert_eq!(summary.backlog, 1);
        assert_eq!(summary.percent_complete, "50.0%");
        assert_eq!(summary.estimated_minutes_total, 75);
        assert_eq!(summary.estimated_minutes_remaining, 50);

        assert_eq!(summary.categories.len(), 2);
        assert_eq!(summary.categories[0].name, "Cash");
        assert_eq!(summary.categories[0].completed, 1);
        assert_eq!(summary.categories[0].total, 2);
        assert_eq!(summary.categories[0].percent_complete, "50.0%");
    }

    #[test]
    fn test_catalog_summary_of_empty_catalog() {
        let summary = catalog_summary(&[]);
        assert_eq!(summary.total_tasks, 0);
        assert_eq!(summary.percent_complete, "0%");
    }

    // --- Settlement summary ---

    #[test]
    fn test_settlement_summary_totals() {
        let payments = vec![
            SettlementPayment {
                payment_id: "PAY001".to_string(),
                order_id: "ORD001".to_string(),
                payment_date: "2024-03-14".to_string(),
                amount: 100.0,
                currency: "USD".to_string(),
                payment_method: "card".to_string(),
                processor_fee: 3.25,
                net_amount: 96.75,
                status: "settled".to_string(),
                refunded: false,
                refund_amount: 0.0,
                refund_date: None,
            },
            SettlementPayment {
                payment_id: "PAY002".to_string(),
                order_id: "ORD002".to_string(),
                payment_date: "2024-03-14".to_string(),
                amount: 50.0,
                currency: "USD".to_string(),
                payment_method: "card".to_string(),
                processor_fee: 1.75,
                net_amount: 48.25,
                status: "settled".to_string(),
                refunded: true,
                refund_amount: 50.0,
                refund_date: Some("2024-03-15".to_string()),
            },
        ];
        let summary = settlement_summary(&payments);
        assert_eq!(summary.payment_count, 2);
        assert_eq!(summary.gross_amount, 150.0);
        assert_eq!(summary.total_fees, 5.0);
        assert_eq!(summary.net_amount, 145.0);
        assert_eq!(summary.refund_count, 1);
        assert_eq!(summary.refunded_amount, 50.0);
    }

    // --- JSON serialization ---

    #[test]
    fn test_catalog_summary_serializes_to_json() {
        let summary = catalog_summary(&[]);
        let json = serde_json::to_string_pretty(&summary).unwrap();
        assert!(json.contains("\"percent_complete\": \"0%\""));
        assert!(json.contains("\"total_tasks\": 0"));
    }
}
