use serde::{Deserialize, Serialize};

use crate::model::status::{Priority, TaskStatus};

/// Assignee identifier for the automation agent
pub const AGENT_ASSIGNEE: &str = "Pip";
/// Assignee identifier for manual steps
pub const HUMAN_ASSIGNEE: &str = "Human";
/// Sentinel for an unassigned accountability field
pub const NOT_SET: &str = "Not Set";

/// One step of the close checklist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Owning category name (back-reference)
    pub category: String,
    /// Sort key, unique within a category
    pub step_number: u32,
    pub step_name: String,
    pub description: String,
    pub assigned_to: String,
    pub status: TaskStatus,
    pub priority: Option<Priority>,
    pub estimated_minutes: u32,
    pub requires_approval: bool,
    pub integration_required: bool,
    /// Integration names, already unquoted and trimmed
    pub required_integrations: Vec<String>,
    /// Derived accountability placeholders, display only
    pub prepared_by: String,
    pub reviewed_by: String,
    /// Child actions, sorted by substep number
    pub substeps: Vec<Substep>,
}

impl Task {
    /// Derived `prepared_by` value: the agent prepares its own steps,
    /// everything else starts unset.
    pub fn derive_prepared_by(assigned_to: &str) -> String {
        if assigned_to == AGENT_ASSIGNEE {
            AGENT_ASSIGNEE.to_string()
        } else {
            NOT_SET.to_string()
        }
    }

    /// Derived `reviewed_by` value: human-assigned steps are self-reviewed,
    /// everything else starts unset.
    pub fn derive_reviewed_by(assigned_to: &str) -> String {
        if assigned_to == HUMAN_ASSIGNEE {
            HUMAN_ASSIGNEE.to_string()
        } else {
            NOT_SET.to_string()
        }
    }

    /// Find a substep by its number
    pub fn substep(&self, substep_number: u32) -> Option<&Substep> {
        self.substeps
            .iter()
            .find(|s| s.sub_step_number == substep_number)
    }
}

/// A child action under one task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Substep {
    /// Parent task's step number, as carried by the catalog source
    pub main_step: u32,
    /// Parent task's step name
    pub main_step_name: String,
    /// Sort key, unique within the parent
    pub sub_step_number: u32,
    pub sub_step_name: String,
    pub sub_step_description: String,
    pub estimated_minutes: u32,
    pub requires_judgment: bool,
    pub requires_system_access: bool,
    pub requires_external_data: bool,
    pub status: TaskStatus,
    pub assigned_to: String,
    pub prepared_by: String,
    pub reviewed_by: String,
}

/// A named grouping of close tasks, e.g. "Cash" or "AR"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    /// Tasks sorted ascending by step number
    pub tasks: Vec<Task>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Category {
            name: name.into(),
            tasks: Vec::new(),
        }
    }

    /// Counts of (completed, total) tasks in this category
    pub fn completion(&self) -> (usize, usize) {
        let done = self
            .tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count();
        (done, self.tasks.len())
    }
}

/// What the detail panel is showing: a task or one of its substeps.
/// Explicit discriminant instead of probing for a substep list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetailItem {
    TaskDetail { step: u32 },
    SubstepDetail { step: u32, substep: u32 },
}

impl DetailItem {
    /// The step number the detail is anchored to
    pub fn step(&self) -> u32 {
        match self {
            DetailItem::TaskDetail { step } => *step,
            DetailItem::SubstepDetail { step, .. } => *step,
        }
    }
}

/// Find the first task with the given step number, scanning categories in
/// order. Step numbers repeat across categories, so first match wins.
pub fn find_task<'a>(categories: &'a [Category], step: u32) -> Option<(&'a Category, &'a Task)> {
    for category in categories {
        if let Some(task) = category.tasks.iter().find(|t| t.step_number == step) {
            return Some((category, task));
        }
    }
    None
}

/// Find the first task with the given step number that owns the given
/// substep number.
pub fn find_substep<'a>(
    categories: &'a [Category],
    step: u32,
    substep: u32,
) -> Option<(&'a Task, &'a Substep)> {
    for category in categories {
        for task in category.tasks.iter().filter(|t| t.step_number == step) {
            if let Some(sub) = task.substep(substep) {
                return Some((task, sub));
            }
        }
    }
    None
}
