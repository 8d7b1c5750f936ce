use serde::Serialize;

use crate::model::accrual::AccrualEntry;
use crate::model::recon::{BankTransaction, GlEntry};
use crate::model::settlement::SettlementPayment;
use crate::model::status::{AccrualKind, AccrualStatus, Priority, TaskStatus, TxnSide, TxnStatus};
use crate::model::task::{Category, Substep, Task};
use crate::ops::search::{MatchField, SearchHit};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct CategoryJson {
    pub name: String,
    pub completed: usize,
    pub total: usize,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct TaskJson {
    pub step: u32,
    pub name: String,
    pub description: String,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    pub assigned_to: String,
    pub estimated_minutes: u32,
    pub requires_approval: bool,
    pub integration_required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub integrations: Vec<String>,
    pub prepared_by: String,
    pub reviewed_by: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub substeps: Vec<SubstepJson>,
}

#[derive(Serialize)]
pub struct SubstepJson {
    pub substep: u32,
    pub name: String,
    pub description: String,
    pub status: TaskStatus,
    pub assigned_to: String,
    pub estimated_minutes: u32,
    pub requires_judgment: bool,
    pub requires_system_access: bool,
    pub requires_external_data: bool,
}

#[derive(Serialize)]
pub struct SearchHitJson {
    pub category: String,
    pub step: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substep: Option<u32>,
    pub field: &'static str,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn category_to_json(category: &Category) -> CategoryJson {
    let (completed, total) = category.completion();
    CategoryJson {
        name: category.name.clone(),
        completed,
        total,
        tasks: category.tasks.iter().map(task_to_json).collect(),
    }
}

pub fn task_to_json(task: &Task) -> TaskJson {
    TaskJson {
        step: task.step_number,
        name: task.step_name.clone(),
        description: task.description.clone(),
        status: task.status,
        priority: task.priority,
        assigned_to: task.assigned_to.clone(),
        estimated_minutes: task.estimated_minutes,
        requires_approval: task.requires_approval,
        integration_required: task.integration_required,
        integrations: task.required_integrations.clone(),
        prepared_by: task.prepared_by.clone(),
        reviewed_by: task.reviewed_by.clone(),
        substeps: task.substeps.iter().map(substep_to_json).collect(),
    }
}

pub fn substep_to_json(substep: &Substep) -> SubstepJson {
    SubstepJson {
        substep: substep.sub_step_number,
        name: substep.sub_step_name.clone(),
        description: substep.sub_step_description.clone(),
        status: substep.status,
        assigned_to: substep.assigned_to.clone(),
        estimated_minutes: substep.estimated_minutes,
        requires_judgment: substep.requires_judgment,
        requires_system_access: substep.requires_system_access,
        requires_external_data: substep.requires_external_data,
    }
}

pub fn hit_to_json(categories: &[Category], hit: &SearchHit) -> SearchHitJson {
    SearchHitJson {
        category: hit.category.clone(),
        step: hit.step,
        substep: hit.substep,
        field: field_label(hit.field),
        name: hit_target_name(categories, hit),
    }
}

/// Machine-stable name for the field a search hit landed on
pub fn field_label(field: MatchField) -> &'static str {
    match field {
        MatchField::Category => "category",
        MatchField::StepName => "step_name",
        MatchField::Description => "description",
        MatchField::SubstepName => "substep_name",
        MatchField::SubstepDescription => "substep_description",
    }
}

fn hit_target_name(categories: &[Category], hit: &SearchHit) -> String {
    categories
        .iter()
        .find(|c| c.name == hit.category)
        .and_then(|c| c.tasks.iter().find(|t| t.step_number == hit.step))
        .map(|task| match hit.substep {
            Some(n) => task
                .substep(n)
                .map(|s| s.sub_step_name.clone())
                .unwrap_or_default(),
            None => task.step_name.clone(),
        })
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Format a single task as a one-line summary
pub fn format_task_line(task: &Task) -> String {
    let priority = match task.priority {
        Some(p) => format!("{} ", p.label()),
        None => String::new(),
    };
    format!(
        "[{}] {:>2} {}{} ({}, {}m)",
        task.status.glyph(),
        task.step_number,
        priority,
        task.step_name,
        task.assigned_to,
        task.estimated_minutes
    )
}

/// Format a single substep as a one-line summary
pub fn format_substep_line(substep: &Substep) -> String {
    format!(
        "[{}] {}.{} {} ({}, {}m)",
        substep.status.glyph(),
        substep.main_step,
        substep.sub_step_number,
        substep.sub_step_name,
        substep.assigned_to,
        substep.estimated_minutes
    )
}

/// Format a task with its substeps, indented
pub fn format_task_tree(task: &Task) -> Vec<String> {
    let mut lines = vec![format_task_line(task)];
    for substep in &task.substeps {
        lines.push(format!("  {}", format_substep_line(substep)));
    }
    lines
}

/// Format a category listing header
pub fn format_category_header(category: &Category) -> String {
    let (done, total) = category.completion();
    format!("== {} ({}/{} complete) ==", category.name, done, total)
}

/// Format a category's task listing
pub fn format_category_listing(
    category: &Category,
    status_filter: Option<TaskStatus>,
    assignee_filter: Option<&str>,
) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format_category_header(category));
    lines.push(String::new());

    let filter = |task: &&Task| -> bool {
        if let Some(sf) = status_filter {
            if task.status != sf {
                return false;
            }
        }
        if let Some(af) = assignee_filter {
            if task.assigned_to != af {
                return false;
            }
        }
        true
    };

    for task in category.tasks.iter().filter(filter) {
        lines.extend(format_task_tree(task));
    }
    lines
}

/// Format detailed task view
pub fn format_task_detail(task: &Task) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format_task_line(task));
    lines.push(format!("category: {}", task.category));
    if !task.description.is_empty() {
        lines.push(format!("description: {}", task.description));
    }
    lines.push(format!("status: {}", task.status.label()));
    lines.push(format!(
        "approval required: {}",
        yes_no(task.requires_approval)
    ));
    if task.integration_required {
        lines.push(format!(
            "integrations: {}",
            task.required_integrations.join(", ")
        ));
    }
    lines.push(format!("prepared by: {}", task.prepared_by));
    lines.push(format!("reviewed by: {}", task.reviewed_by));

    if !task.substeps.is_empty() {
        lines.push(String::new());
        lines.push("substeps:".to_string());
        for substep in &task.substeps {
            lines.push(format!("  {}", format_substep_line(substep)));
        }
    }
    lines
}

/// Format detailed substep view
pub fn format_substep_detail(substep: &Substep) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format_substep_line(substep));
    lines.push(format!(
        "part of: {} {}",
        substep.main_step, substep.main_step_name
    ));
    if !substep.sub_step_description.is_empty() {
        lines.push(format!("description: {}", substep.sub_step_description));
    }
    lines.push(format!("status: {}", substep.status.label()));
    lines.push(format!("judgment: {}", yes_no(substep.requires_judgment)));
    lines.push(format!(
        "system access: {}",
        yes_no(substep.requires_system_access)
    ));
    lines.push(format!(
        "external data: {}",
        yes_no(substep.requires_external_data)
    ));
    lines
}

/// Format a search hit as `Cash/1 step_name: Reconcile operating account`
pub fn format_search_hit(categories: &[Category], hit: &SearchHit) -> String {
    let location = match hit.substep {
        Some(n) => format!("{}/{}.{}", hit.category, hit.step, n),
        None => format!("{}/{}", hit.category, hit.step),
    };
    format!(
        "{} {}: {}",
        location,
        field_label(hit.field),
        hit_target_name(categories, hit)
    )
}

// ---------------------------------------------------------------------------
// Money rows
// ---------------------------------------------------------------------------

/// Format a currency amount as `$1,234.56`
pub fn format_money(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let mut dollars = (cents / 100).to_string();
    let mut grouped = String::new();
    while dollars.len() > 3 {
        let split = dollars.len() - 3;
        grouped = format!(",{}{}", &dollars[split..], grouped);
        dollars.truncate(split);
    }
    let sign = if negative { "-" } else { "" };
    format!("{}${}{}.{:02}", sign, dollars, grouped, cents % 100)
}

/// A bank amount with its flow direction: debits are outflows
fn format_flow(amount: f64, side: TxnSide) -> String {
    match side {
        TxnSide::Debit => format!("-{}", format_money(amount)),
        TxnSide::Credit => format_money(amount),
    }
}

/// One bank-feed row for `cb recon list`
pub fn format_bank_line(txn: &BankTransaction) -> String {
    format!(
        "{}  {}  {:>12}  {:<9}  {}",
        txn.transaction_id,
        txn.date,
        format_flow(txn.amount, txn.side),
        txn.status.label(),
        txn.description
    )
}

/// One GL-extract row for `cb recon list`
pub fn format_gl_line(entry: &GlEntry) -> String {
    format!(
        "{}  {}  {}  {:>12}  {:<9}  {}",
        entry.entry_id,
        entry.date,
        entry.account_number,
        format_flow(entry.amount, entry.side),
        entry.status.label(),
        entry.description
    )
}

/// One ledger row for `cb accrual list`
pub fn format_accrual_line(entry: &AccrualEntry) -> String {
    format!(
        "{}  {}  {:>12}  {:<9}  {:<15}  {}",
        entry.entry_id,
        entry.date,
        format_money(entry.amount),
        entry.status.label(),
        entry.kind.label(),
        entry.description
    )
}

/// One payment row for `cb settle list`
pub fn format_settlement_line(payment: &SettlementPayment) -> String {
    let refund = if payment.refunded {
        format!("  refunded {}", format_money(payment.refund_amount))
    } else {
        String::new()
    };
    format!(
        "{}  {}  {:>10}  fee {:>8}  net {:>10}{}",
        payment.payment_id,
        payment.payment_date,
        format_money(payment.amount),
        format_money(payment.processor_fee),
        format_money(payment.net_amount),
        refund
    )
}

// ---------------------------------------------------------------------------
// CLI argument parsing
// ---------------------------------------------------------------------------

/// Parse a status argument into TaskStatus
pub fn parse_task_status(s: &str) -> Result<TaskStatus, String> {
    match s {
        "backlog" => Ok(TaskStatus::Backlog),
        "in-progress" => Ok(TaskStatus::InProgress),
        "completed" => Ok(TaskStatus::Completed),
        _ => Err(format!(
            "unknown status '{}' (expected: backlog, in-progress, completed)",
            s
        )),
    }
}

pub fn parse_txn_status(s: &str) -> Result<TxnStatus, String> {
    TxnStatus::from_label(s).ok_or_else(|| {
        format!(
            "unknown status '{}' (expected: cleared, review, exception)",
            s
        )
    })
}

pub fn parse_accrual_status(s: &str) -> Result<AccrualStatus, String> {
    AccrualStatus::from_label(s).ok_or_else(|| {
        format!(
            "unknown status '{}' (expected: pending, complete, review, exception)",
            s
        )
    })
}

pub fn parse_accrual_kind(s: &str) -> Result<AccrualKind, String> {
    match s {
        "recurring" => Ok(AccrualKind::Recurring),
        "po-issued" => Ok(AccrualKind::PoIssued),
        "monthly-expense" => Ok(AccrualKind::MonthlyExpense),
        _ => Err(format!(
            "unknown kind '{}' (expected: recurring, po-issued, monthly-expense)",
            s
        )),
    }
}
