use std::path::PathBuf;

use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::model::accrual::{AccrualBook, AccrualEntry};
use crate::model::config::{CatalogConfig, StatusConfig, UiConfig, WorkspaceConfig, WorkspaceInfo};
use crate::model::recon::{BankTransaction, GlEntry, ReconWorkspace};
use crate::model::status::{AccrualKind, AccrualStatus, Priority, TaskStatus, TxnSide, TxnStatus};
use crate::model::task::{Category, Substep, Task};
use crate::model::workspace::Workspace;
use crate::tui::app::App;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// A workspace that never touches disk.
pub fn test_workspace(categories: Vec<Category>) -> Workspace {
    Workspace {
        root: PathBuf::from("/tmp/close-test"),
        close_dir: PathBuf::from("/tmp/close-test/close"),
        config: WorkspaceConfig {
            workspace: WorkspaceInfo {
                name: "test".to_string(),
            },
            catalog: CatalogConfig::default(),
            status: StatusConfig::default(),
            ui: UiConfig::default(),
        },
        categories,
    }
}

pub fn test_app(categories: Vec<Category>) -> App {
    App::new(
        test_workspace(categories),
        ReconWorkspace::default(),
        AccrualBook::default(),
    )
}

pub fn category(name: &str, tasks: Vec<Task>) -> Category {
    Category {
        name: name.to_string(),
        tasks,
    }
}

pub fn task(category: &str, step: u32, name: &str, substeps: Vec<Substep>) -> Task {
    Task {
        category: category.to_string(),
        step_number: step,
        step_name: name.to_string(),
        description: String::new(),
        assigned_to: "Pip".to_string(),
        status: TaskStatus::Backlog,
        priority: Some(Priority::P1),
        estimated_minutes: 30,
        requires_approval: false,
        integration_required: false,
        required_integrations: Vec::new(),
        prepared_by: "Pip".to_string(),
        reviewed_by: "Not Set".to_string(),
        substeps,
    }
}

pub fn substep(step: u32, sub: u32, name: &str) -> Substep {
    Substep {
        main_step: step,
        main_step_name: String::new(),
        sub_step_number: sub,
        sub_step_name: name.to_string(),
        sub_step_description: String::new(),
        estimated_minutes: 10,
        requires_judgment: false,
        requires_system_access: false,
        requires_external_data: false,
        status: TaskStatus::Backlog,
        assigned_to: "Pip".to_string(),
        prepared_by: "Pip".to_string(),
        reviewed_by: "Not Set".to_string(),
    }
}

/// App with the two-category catalog most view tests use.
pub fn sample_tasks_app() -> App {
    test_app(vec![
        category(
            "Cash",
            vec![
                task("Cash", 1, "Post journals", Vec::new()),
                task(
                    "Cash",
                    2,
                    "Reconcile bank",
                    vec![substep(2, 1, "Pull feed"), substep(2, 2, "Match items")],
                ),
            ],
        ),
        category("Revenue", vec![task("Revenue", 3, "Bill runs", Vec::new())]),
    ])
}

pub fn bank_txn(id: &str, amount: f64, status: TxnStatus) -> BankTransaction {
    BankTransaction {
        transaction_id: id.to_string(),
        date: "2024-03-15".to_string(),
        description: "Wire transfer".to_string(),
        amount,
        side: TxnSide::Debit,
        status,
        check_number: None,
        customer_name: None,
        gl_account_matched: false,
        gl_account: None,
        exception_reason: None,
    }
}

pub fn gl_entry(id: &str, amount: f64, matched_to: Option<&str>) -> GlEntry {
    GlEntry {
        entry_id: id.to_string(),
        date: "2024-03-15".to_string(),
        description: "Cash receipt".to_string(),
        amount,
        side: TxnSide::Debit,
        account_number: "1000".to_string(),
        reference: "JE-100".to_string(),
        matched_bank_transaction: matched_to.map(str::to_string),
        status: TxnStatus::Cleared,
    }
}

/// App on the Recon view with one matched and one unmatched pair.
pub fn sample_recon_app() -> App {
    let mut app = test_app(Vec::new());
    app.recon = ReconWorkspace {
        bank: vec![
            {
                let mut t = bank_txn("BNK-001", 1250.0, TxnStatus::Cleared);
                t.gl_account_matched = true;
                t.gl_account = Some("1000".to_string());
                t
            },
            bank_txn("BNK-002", -45.5, TxnStatus::Review),
        ],
        gl: vec![
            gl_entry("GL-900", 1250.0, Some("BNK-001")),
            gl_entry("GL-901", 77.25, None),
        ],
    };
    app.view = crate::tui::app::View::Recon;
    app
}

pub fn accrual(id: &str, amount: f64, status: AccrualStatus) -> AccrualEntry {
    AccrualEntry {
        entry_id: id.to_string(),
        date: "2024-03-15".to_string(),
        description: "Office rent".to_string(),
        amount,
        kind: AccrualKind::Recurring,
        category: "Expense".to_string(),
        status,
        vendor: "ABC Properties".to_string(),
        reference: "RENT-2024-03".to_string(),
        expected_date: None,
        notes: None,
    }
}

/// App on the Accruals view with three entries across two statuses.
pub fn sample_accruals_app() -> App {
    let mut app = test_app(Vec::new());
    app.accruals = AccrualBook {
        entries: vec![
            accrual("ACC001", 1200.0, AccrualStatus::Pending),
            accrual("ACC002", 3400.0, AccrualStatus::Complete),
            accrual("ACC003", 89.99, AccrualStatus::Pending),
        ],
    };
    app.view = crate::tui::app::View::Accruals;
    app
}
