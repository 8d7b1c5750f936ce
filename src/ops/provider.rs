use crate::model::accrual::{AccrualBook, AccrualEntry};
use crate::model::recon::{BankTransaction, GlEntry, ReconWorkspace};
use crate::model::settlement::SettlementPayment;
use crate::model::status::{AccrualKind, AccrualStatus, TxnSide, TxnStatus};

/// Source of working-set data for the close. The built-in fixtures sit
/// behind this seam so a real bank-feed or ERP export adapter can replace
/// them without touching the engines that consume the data.
pub trait DataProvider {
    fn reconciliation(&self) -> ReconWorkspace;
    fn accruals(&self) -> AccrualBook;
    fn settlements(&self) -> Vec<SettlementPayment>;
}

/// Deterministic sample data for `cb recon seed` and `cb accrual seed`
pub struct FixtureProvider;

// ---------------------------------------------------------------------------
// Reconciliation fixture
// ---------------------------------------------------------------------------

const VENDOR_PAYMENTS: [(&str, f64); 16] = [
    ("Office rent payment - 123 Business Ave", 4500.00),
    ("AWS Cloud Services - Monthly hosting", 1876.50),
    ("Staples - Office supplies and printer cartridges", 439.97),
    ("ADP Payroll - Bi-weekly payroll processing", 12750.00),
    ("Hartford Insurance - Monthly premium", 2150.00),
    ("PG&E - Utility payment", 543.21),
    ("Google Ads - Marketing campaign Mar 2024", 2750.00),
    ("Salesforce - Annual subscription renewal", 15000.00),
    ("Deloitte - Q1 2024 Consulting services", 7500.00),
    ("Adobe Creative Cloud - Team subscription", 479.88),
    ("AT&T - Business phone and internet", 389.99),
    ("WeWork - Conference room booking", 899.00),
    ("QuickBooks - Monthly subscription", 150.00),
    ("Home Depot - Office maintenance supplies", 287.64),
    ("Dell - Laptop purchase IT dept", 2399.98),
    ("Zoom - Annual video conferencing", 1800.00),
];

const BANK_FEES: [(&str, f64); 8] = [
    ("Monthly account maintenance fee", 25.00),
    ("Wire transfer fee", 35.00),
    ("ACH processing fee", 15.00),
    ("Check processing fee", 20.00),
    ("International transaction fee", 45.00),
    ("Overdraft protection fee", 35.00),
    ("Stop payment fee", 30.00),
    ("ATM service fee", 3.50),
];

const CUSTOMER_PAYMENTS: [(&str, f64); 2] = [
    ("Customer payment - Invoice #INV-2024-1234", 5750.00),
    ("Customer deposit - Contract #CON-2024-5678", 8500.00),
];

fn fixture_date(index: usize) -> String {
    format!("2024-03-{:02}", (index % 30) + 1)
}

/// Matched vendor payment: a cleared bank transaction and a cleared GL
/// entry cross-linked to each other.
fn vendor_pair(index: usize) -> (BankTransaction, GlEntry) {
    let (description, amount) = VENDOR_PAYMENTS[index % VENDOR_PAYMENTS.len()];
    let id = format!("{:02}", index + 1);
    let date = fixture_date(index);
    let check_number = format!("10{id}");
    let account = (1000 + index).to_string();

    let bank = BankTransaction {
        transaction_id: format!("BT{id}"),
        date: date.clone(),
        description: description.to_string(),
        amount,
        side: TxnSide::Debit,
        status: TxnStatus::Cleared,
        check_number: Some(check_number.clone()),
        customer_name: None,
        gl_account_matched: true,
        gl_account: Some(account.clone()),
        exception_reason: None,
    };
    let gl = GlEntry {
        entry_id: format!("GL{id}"),
        date,
        description: description.to_string(),
        amount,
        side: TxnSide::Debit,
        account_number: account,
        reference: check_number,
        matched_bank_transaction: Some(format!("BT{id}")),
        status: TxnStatus::Cleared,
    };
    (bank, gl)
}

/// Bank-only fee record awaiting review
fn bank_fee(index: usize) -> BankTransaction {
    let (description, amount) = BANK_FEES[index % BANK_FEES.len()];
    BankTransaction {
        transaction_id: format!("BT{:02}", index + 1),
        date: fixture_date(index),
        description: description.to_string(),
        amount,
        side: TxnSide::Debit,
        status: TxnStatus::Review,
        check_number: None,
        customer_name: None,
        gl_account_matched: false,
        gl_account: None,
        exception_reason: None,
    }
}

/// GL-only customer receipt flagged as an exception
fn customer_payment(index: usize) -> GlEntry {
    let (description, amount) = CUSTOMER_PAYMENTS[index % CUSTOMER_PAYMENTS.len()];
    let id = format!("{:02}", index + 1);
    GlEntry {
        entry_id: format!("GL{id}"),
        date: fixture_date(index),
        description: description.to_string(),
        amount,
        side: TxnSide::Credit,
        account_number: (2000 + index).to_string(),
        reference: format!("INV{id}"),
        matched_bank_transaction: None,
        status: TxnStatus::Exception,
    }
}

// ---------------------------------------------------------------------------
// Accrual fixture
// ---------------------------------------------------------------------------

const ACCRUAL_ROWS: [(&str, f64, AccrualKind, &str, &str, &str); 12] = [
    (
        "Office Rent",
        12000.0,
        AccrualKind::Recurring,
        "ABC Properties",
        "RENT-2024-03",
        "Fixed monthly rent payment due on the 1st",
    ),
    (
        "Legal Retainer Fees",
        5000.0,
        AccrualKind::MonthlyExpense,
        "Smith & Associates",
        "LEGAL-2024-03",
        "Monthly legal services - amount varies based on usage",
    ),
    (
        "IT Support Services",
        3500.0,
        AccrualKind::Recurring,
        "TechCare Solutions",
        "IT-2024-03",
        "Fixed monthly IT support contract",
    ),
    (
        "Utilities - Electricity",
        2800.0,
        AccrualKind::MonthlyExpense,
        "Power Corp",
        "UTIL-2024-03",
        "Monthly electricity charges - varies seasonally",
    ),
    (
        "Office Cleaning Services",
        1500.0,
        AccrualKind::Recurring,
        "CleanPro Services",
        "CLEAN-2024-03",
        "Fixed monthly cleaning contract",
    ),
    (
        "Software Licenses",
        7500.0,
        AccrualKind::Recurring,
        "Various Software Vendors",
        "SW-2024-03",
        "Monthly software subscription fees",
    ),
    (
        "Marketing Services",
        8500.0,
        AccrualKind::MonthlyExpense,
        "Digital Marketing Pro",
        "MKT-2024-03",
        "Monthly marketing services - varies based on campaigns",
    ),
    (
        "Security Services",
        2200.0,
        AccrualKind::Recurring,
        "SecureGuard Inc",
        "SEC-2024-03",
        "Fixed monthly security services contract",
    ),
    (
        "Internet & Telecom",
        1800.0,
        AccrualKind::Recurring,
        "TeleNet Services",
        "TEL-2024-03",
        "Fixed monthly internet and phone services",
    ),
    (
        "Professional Training",
        4500.0,
        AccrualKind::MonthlyExpense,
        "Various Training Providers",
        "TRN-2024-03",
        "Monthly employee training costs - varies by programs",
    ),
    (
        "Insurance Premium",
        3200.0,
        AccrualKind::Recurring,
        "Business Insurers Co",
        "INS-2024-03",
        "Fixed monthly business insurance premium",
    ),
    (
        "Maintenance Services",
        1900.0,
        AccrualKind::MonthlyExpense,
        "Facility Maintenance Co",
        "MAINT-2024-03",
        "Monthly building maintenance - varies based on repairs needed",
    ),
];

// ---------------------------------------------------------------------------
// Settlement fixture
// ---------------------------------------------------------------------------

struct SettlementRow {
    payment_id: &'static str,
    order_id: &'static str,
    payment_date: &'static str,
    amount: f64,
    payment_method: &'static str,
    fee: f64,
    net: f64,
    refund: Option<(f64, &'static str)>,
}

const SETTLEMENT_ROWS: [SettlementRow; 3] = [
    SettlementRow {
        payment_id: "pi_txofkmvx8ksrpp52mw4y1w",
        order_id: "SHF1000112",
        payment_date: "2024-03-15 00:55:00",
        amount: 244.37,
        payment_method: "Credit Card",
        fee: 7.39,
        net: 236.98,
        refund: None,
    },
    SettlementRow {
        payment_id: "pi_yxftimqfcnfyxktxz0tjhc",
        order_id: "SHF1000119",
        payment_date: "2024-03-15 00:48:00",
        amount: 524.56,
        payment_method: "Credit Card",
        fee: 15.51,
        net: 509.05,
        refund: Some((262.28, "2024-03-21 00:48:00")),
    },
    SettlementRow {
        payment_id: "pi_69k70gzqgwdxh7vf12iueo",
        order_id: "SHF1000040",
        payment_date: "2024-03-15 00:47:00",
        amount: 1202.15,
        payment_method: "Shop Pay",
        fee: 35.16,
        net: 1166.99,
        refund: None,
    },
];

// ---------------------------------------------------------------------------
// Provider impl
// ---------------------------------------------------------------------------

impl DataProvider for FixtureProvider {
    /// 16 matched vendor pairs, then 8 fee records on the bank side only,
    /// then 2 customer receipts on the GL side only. Index ranges are
    /// disjoint so every id is unique across the working set.
    fn reconciliation(&self) -> ReconWorkspace {
        let mut workspace = ReconWorkspace::default();
        for i in 0..16 {
            let (bank, gl) = vendor_pair(i);
            workspace.bank.push(bank);
            workspace.gl.push(gl);
        }
        for i in 16..24 {
            workspace.bank.push(bank_fee(i));
        }
        for i in 24..26 {
            workspace.gl.push(customer_payment(i));
        }
        workspace
    }

    fn accruals(&self) -> AccrualBook {
        let entries = ACCRUAL_ROWS
            .iter()
            .enumerate()
            .map(
                |(i, (description, amount, kind, vendor, reference, notes))| AccrualEntry {
                    entry_id: format!("ACC{:03}", i + 1),
                    date: "2024-03-15".to_string(),
                    description: description.to_string(),
                    amount: *amount,
                    kind: *kind,
                    category: "Expense".to_string(),
                    status: AccrualStatus::Pending,
                    vendor: vendor.to_string(),
                    reference: reference.to_string(),
                    expected_date: None,
                    notes: Some(notes.to_string()),
                },
            )
            .collect();
        AccrualBook { entries }
    }

    fn settlements(&self) -> Vec<SettlementPayment> {
        SETTLEMENT_ROWS
            .iter()
            .map(|row| SettlementPayment {
                payment_id: row.payment_id.to_string(),
                order_id: row.order_id.to_string(),
                payment_date: row.payment_date.to_string(),
                amount: row.amount,
                currency: "USD".to_string(),
                payment_method: row.payment_method.to_string(),
                processor_fee: row.fee,
                net_amount: row.net,
                status: "succeeded".to_string(),
                refunded: row.refund.is_some(),
                refund_amount: row.refund.map_or(0.0, |(amount, _)| amount),
                refund_date: row.refund.map(|(_, date)| date.to_string()),
            })
            .collect()
    }
}
