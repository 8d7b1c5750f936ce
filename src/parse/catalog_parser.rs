use indexmap::IndexMap;

use crate::model::status::{Priority, TaskStatus};
use crate::model::task::{Category, Substep, Task};
use crate::parse::csv::parse_records;

/// Steps header, bit-exact from the catalog source
pub const STEPS_HEADER: [&str; 11] = [
    "category",
    "step_number",
    "step_name",
    "description",
    "assigned_to",
    "status",
    "priority",
    "estimated_time_minutes",
    "requires_approval",
    "integration_required",
    "required_integrations",
];

/// Substeps header, bit-exact from the catalog source
pub const SUBSTEPS_HEADER: [&str; 11] = [
    "main_step",
    "main_step_name",
    "sub_step_number",
    "sub_step_name",
    "sub_step_description",
    "estimated_time_minutes",
    "requires_judgment",
    "requires_system_access",
    "requires_external_data",
    "status",
    "assigned_to",
];

/// A degraded-but-not-rejected parse condition, with its source row
/// (1-based, counting the header as row 1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anomaly {
    pub row: usize,
    pub field: String,
    pub message: String,
}

impl Anomaly {
    fn new(row: usize, field: &str, message: impl Into<String>) -> Self {
        Anomaly {
            row,
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Resolve column positions from a header row. Missing columns are reported
/// once; rows then read missing columns as empty cells.
struct Columns {
    index: IndexMap<String, usize>,
}

impl Columns {
    fn from_header(header: &[String], expected: &[&str], anomalies: &mut Vec<Anomaly>) -> Columns {
        let mut index = IndexMap::new();
        for (i, name) in header.iter().enumerate() {
            index.entry(name.trim().to_string()).or_insert(i);
        }
        for name in expected {
            if !index.contains_key(*name) {
                anomalies.push(Anomaly::new(1, name, "column missing from header"));
            }
        }
        Columns { index }
    }

    fn cell<'a>(&self, row: &'a [String], name: &str) -> &'a str {
        self.index
            .get(name)
            .and_then(|&i| row.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Parse an integer cell, degrading to 0 with an anomaly instead of
/// rejecting the row.
fn parse_u32_cell(cell: &str, row: usize, field: &str, anomalies: &mut Vec<Anomaly>) -> u32 {
    match cell.trim().parse::<u32>() {
        Ok(n) => n,
        Err(_) => {
            anomalies.push(Anomaly::new(
                row,
                field,
                format!("not an integer: {:?}", cell),
            ));
            0
        }
    }
}

/// Only the exact literal `Yes` is true
fn parse_yes(cell: &str) -> bool {
    cell == "Yes"
}

fn parse_status_cell(cell: &str, row: usize, anomalies: &mut Vec<Anomaly>) -> TaskStatus {
    match TaskStatus::from_label(cell) {
        Some(status) => status,
        None => {
            anomalies.push(Anomaly::new(
                row,
                "status",
                format!("unknown status {:?}, defaulting to Backlog", cell),
            ));
            TaskStatus::Backlog
        }
    }
}

fn parse_priority_cell(cell: &str, row: usize, anomalies: &mut Vec<Anomaly>) -> Option<Priority> {
    if cell.is_empty() {
        return None;
    }
    let priority = Priority::from_label(cell);
    if priority.is_none() {
        anomalies.push(Anomaly::new(
            row,
            "priority",
            format!("unknown priority {:?}", cell),
        ));
    }
    priority
}

/// Unquote and split an integrations cell into trimmed names. Handles the
/// quoted-empty form the catalog source emits for "none".
pub fn split_integrations(cell: &str) -> Vec<String> {
    if cell.is_empty() || cell == "\"\"" {
        return Vec::new();
    }
    cell.split(',')
        .map(|part| part.replace('"', "").trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Parse the steps CSV into categories.
///
/// Categories keep first-appearance order; tasks within a category sort
/// ascending by step number (stable, so equal numbers keep input order).
/// Rows never reject: bad cells degrade to defaults and surface as
/// anomalies for the caller to log.
pub fn parse_steps(text: &str) -> (Vec<Category>, Vec<Anomaly>) {
    let mut anomalies = Vec::new();
    let mut records = parse_records(text).into_iter();

    let Some(header) = records.next() else {
        return (Vec::new(), anomalies);
    };
    let columns = Columns::from_header(&header, &STEPS_HEADER, &mut anomalies);

    let mut by_category: IndexMap<String, Vec<Task>> = IndexMap::new();
    for (i, record) in records.enumerate() {
        let row = i + 2;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let category = columns.cell(&record, "category").to_string();
        let assigned_to = columns.cell(&record, "assigned_to").to_string();
        let task = Task {
            category: category.clone(),
            step_number: parse_u32_cell(
                columns.cell(&record, "step_number"),
                row,
                "step_number",
                &mut anomalies,
            ),
            step_name: columns.cell(&record, "step_name").to_string(),
            description: columns.cell(&record, "description").to_string(),
            status: parse_status_cell(columns.cell(&record, "status"), row, &mut anomalies),
            priority: parse_priority_cell(columns.cell(&record, "priority"), row, &mut anomalies),
            estimated_minutes: parse_u32_cell(
                columns.cell(&record, "estimated_time_minutes"),
                row,
                "estimated_time_minutes",
                &mut anomalies,
            ),
            requires_approval: parse_yes(columns.cell(&record, "requires_approval")),
            integration_required: parse_yes(columns.cell(&record, "integration_required")),
            required_integrations: split_integrations(
                columns.cell(&record, "required_integrations"),
            ),
            prepared_by: Task::derive_prepared_by(&assigned_to),
            reviewed_by: Task::derive_reviewed_by(&assigned_to),
            assigned_to,
            substeps: Vec::new(),
        };
        by_category.entry(category).or_default().push(task);
    }

    let categories = by_category
        .into_iter()
        .map(|(name, mut tasks)| {
            tasks.sort_by_key(|t| t.step_number);
            Category { name, tasks }
        })
        .collect();

    (categories, anomalies)
}

/// Parse the substeps CSV into a flat substep list, same degradation rules
/// as `parse_steps`.
pub fn parse_substeps(text: &str) -> (Vec<Substep>, Vec<Anomaly>) {
    let mut anomalies = Vec::new();
    let mut records = parse_records(text).into_iter();

    let Some(header) = records.next() else {
        return (Vec::new(), anomalies);
    };
    let columns = Columns::from_header(&header, &SUBSTEPS_HEADER, &mut anomalies);

    let mut substeps = Vec::new();
    for (i, record) in records.enumerate() {
        let row = i + 2;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let assigned_to = columns.cell(&record, "assigned_to").to_string();
        substeps.push(Substep {
            main_step: parse_u32_cell(
                columns.cell(&record, "main_step"),
                row,
                "main_step",
                &mut anomalies,
            ),
            main_step_name: columns.cell(&record, "main_step_name").to_string(),
            sub_step_number: parse_u32_cell(
                columns.cell(&record, "sub_step_number"),
                row,
                "sub_step_number",
                &mut anomalies,
            ),
            sub_step_name: columns.cell(&record, "sub_step_name").to_string(),
            sub_step_description: columns.cell(&record, "sub_step_description").to_string(),
            estimated_minutes: parse_u32_cell(
                columns.cell(&record, "estimated_time_minutes"),
                row,
                "estimated_time_minutes",
                &mut anomalies,
            ),
            requires_judgment: parse_yes(columns.cell(&record, "requires_judgment")),
            requires_system_access: parse_yes(columns.cell(&record, "requires_system_access")),
            requires_external_data: parse_yes(columns.cell(&record, "requires_external_data")),
            status: parse_status_cell(columns.cell(&record, "status"), row, &mut anomalies),
            prepared_by: Task::derive_prepared_by(&assigned_to),
            reviewed_by: Task::derive_reviewed_by(&assigned_to),
            assigned_to,
        });
    }

    (substeps, anomalies)
}

/// Attach substeps to their parent tasks.
///
/// A substep's parent is the first task matching both its step number and
/// step name; if none, the first task matching the step name alone. Orphans
/// are dropped with an anomaly. Attached lists sort by substep number.
pub fn attach_substeps(categories: &mut [Category], substeps: Vec<Substep>) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();

    'next: for substep in substeps {
        for category in categories.iter_mut() {
            if let Some(task) = category.tasks.iter_mut().find(|t| {
                t.step_number == substep.main_step && t.step_name == substep.main_step_name
            }) {
                task.substeps.push(substep);
                continue 'next;
            }
        }
        for category in categories.iter_mut() {
            if let Some(task) = category
                .tasks
                .iter_mut()
                .find(|t| t.step_name == substep.main_step_name)
            {
                task.substeps.push(substep);
                continue 'next;
            }
        }
        anomalies.push(Anomaly::new(
            0,
            "main_step",
            format!(
                "substep {} {:?} has no parent task {:?}",
                substep.sub_step_number, substep.sub_step_name, substep.main_step_name
            ),
        ));
    }

    for category in categories.iter_mut() {
        for task in &mut category.tasks {
            task.substeps.sort_by_key(|s| s.sub_step_number);
        }
    }

    anomalies
}

/// Parse both blobs and attach, the full loader pipeline
pub fn parse_catalog(steps_text: &str, substeps_text: &str) -> (Vec<Category>, Vec<Anomaly>) {
    let (mut categories, mut anomalies) = parse_steps(steps_text);
    let (substeps, substep_anomalies) = parse_substeps(substeps_text);
    anomalies.extend(substep_anomalies);
    anomalies.extend(attach_substeps(&mut categories, substeps));
    (categories, anomalies)
}
