use crate::model::status::TaskStatus;
use crate::model::task::Category;

/// What a status update is aimed at. The explicit variant replaces the
/// catalog source's `(is_subtask, subtask_id)` flag pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTarget {
    Task { step: u32 },
    Substep { step: u32, substep: u32 },
}

/// Substep-to-parent propagation, injectable so call sites never branch
/// on policy.
pub trait RollupPolicy {
    /// Called after a substep of `task` changed status
    fn after_substep_change(&self, task: &mut crate::model::task::Task);

    fn name(&self) -> &'static str;
}

/// Observed catalog behavior: substep status never touches the parent
pub struct Independent;

impl RollupPolicy for Independent {
    fn after_substep_change(&self, _task: &mut crate::model::task::Task) {}

    fn name(&self) -> &'static str {
        "independent"
    }
}

/// All substeps Completed marks the parent Completed. One direction only;
/// un-completing a substep never demotes the parent.
pub struct CompleteParent;

impl RollupPolicy for CompleteParent {
    fn after_substep_change(&self, task: &mut crate::model::task::Task) {
        if !task.substeps.is_empty()
            && task
                .substeps
                .iter()
                .all(|s| s.status == TaskStatus::Completed)
        {
            task.status = TaskStatus::Completed;
        }
    }

    fn name(&self) -> &'static str {
        "complete-parent"
    }
}

/// Look up a policy by its config/CLI name
pub fn rollup_policy(name: &str) -> Option<Box<dyn RollupPolicy>> {
    match name {
        "independent" => Some(Box::new(Independent)),
        "complete-parent" => Some(Box::new(CompleteParent)),
        _ => None,
    }
}

/// What an update actually touched, with the prior status for reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangedEntity {
    Task {
        category: String,
        step: u32,
        from: TaskStatus,
    },
    Substep {
        category: String,
        step: u32,
        substep: u32,
        from: TaskStatus,
        /// Parent status after the rollup policy ran
        parent_status: TaskStatus,
    },
}

/// Result of a status update: the replacement category list plus what
/// changed. A lookup miss returns the input unchanged and no change record.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    pub categories: Vec<Category>,
    pub changed: Option<ChangedEntity>,
}

/// Apply a status change, returning a fresh category list in which only the
/// addressed task or substep (and, under a rollup policy, its parent)
/// differs from the input.
///
/// Target resolution scans categories in order and takes the first task
/// with the given step number; substep targets take the first such task
/// that also owns the substep number. Any status may be set from any other.
/// A miss is a no-op, never an error.
pub fn update_status(
    categories: &[Category],
    target: StatusTarget,
    new_status: TaskStatus,
    policy: &dyn RollupPolicy,
) -> UpdateOutcome {
    let mut updated = categories.to_vec();

    let changed = match target {
        StatusTarget::Task { step } => updated.iter_mut().find_map(|category| {
            let task = category.tasks.iter_mut().find(|t| t.step_number == step)?;
            let from = task.status;
            task.status = new_status;
            Some(ChangedEntity::Task {
                category: category.name.clone(),
                step,
                from,
            })
        }),
        StatusTarget::Substep { step, substep } => updated.iter_mut().find_map(|category| {
            let task = category
                .tasks
                .iter_mut()
                .find(|t| t.step_number == step && t.substep(substep).is_some())?;
            let sub = task
                .substeps
                .iter_mut()
                .find(|s| s.sub_step_number == substep)?;
            let from = sub.status;
            sub.status = new_status;
            policy.after_substep_change(task);
            Some(ChangedEntity::Substep {
                category: category.name.clone(),
                step,
                substep,
                from,
                parent_status: task.status,
            })
        }),
    };

    UpdateOutcome {
        categories: updated,
        changed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_catalog;
    use pretty_assertions::assert_eq;

    fn sample_categories() -> Vec<Category> {
        let steps = "\
category,step_number,step_name,description,assigned_to,status,priority,estimated_time_minutes,requires_approval,integration_required,required_integrations
Cash,1,Reconcile cash,d,Pip,Backlog,High,10,Yes,No,\"\"
Cash,2,Record transfers,d,Pip,Backlog,High,10,Yes,No,\"\"
AR,1,Record payments,d,Pip,Backlog,High,10,Yes,No,\"\"
AR,2,Record invoices,d,Human,In Progress,Medium,15,Yes,No,\"\"
";
        let substeps = "\
main_step,main_step_name,sub_step_number,sub_step_name,sub_step_description,estimated_time_minutes,requires_judgment,requires_system_access,requires_external_data,status,assigned_to
1,Reconcile cash,1,Pull statement,d,5,No,No,No,Backlog,Pip
1,Reconcile cash,2,Compare balances,d,10,No,No,No,Backlog,Pip
";
        let (categories, anomalies) = parse_catalog(steps, substeps);
        assert!(anomalies.is_empty());
        categories
    }

    fn substep_statuses(categories: &[Category]) -> Vec<TaskStatus> {
        categories[0].tasks[0]
            .substeps
            .iter()
            .map(|s| s.status)
            .collect()
    }

    #[test]
    fn test_task_update_changes_exactly_one() {
        let categories = sample_categories();
        let outcome = update_status(
            &categories,
            StatusTarget::Task { step: 2 },
            TaskStatus::Completed,
            &Independent,
        );

        // First step-2 task in category order is Cash/2
        assert_eq!(
            outcome.changed,
            Some(ChangedEntity::Task {
                category: "Cash".to_string(),
                step: 2,
                from: TaskStatus::Backlog,
            })
        );
        assert_eq!(
            outcome.categories[0].tasks[1].status,
            TaskStatus::Completed
        );

        // Everything else is structurally equal to the input
        let mut expected = categories.clone();
        expected[0].tasks[1].status = TaskStatus::Completed;
        assert_eq!(outcome.categories, expected);
    }

    #[test]
    fn test_task_update_leaves_substeps_alone() {
        let categories = sample_categories();
        let outcome = update_status(
            &categories,
            StatusTarget::Task { step: 1 },
            TaskStatus::Completed,
            &Independent,
        );
        assert_eq!(
            substep_statuses(&outcome.categories),
            vec![TaskStatus::Backlog, TaskStatus::Backlog]
        );
    }

    #[test]
    fn test_substep_update_leaves_parent_alone() {
        let categories = sample_categories();
        let outcome = update_status(
            &categories,
            StatusTarget::Substep {
                step: 1,
                substep: 1,
            },
            TaskStatus::Completed,
            &Independent,
        );
        assert_eq!(
            substep_statuses(&outcome.categories),
            vec![TaskStatus::Completed, TaskStatus::Backlog]
        );
        assert_eq!(outcome.categories[0].tasks[0].status, TaskStatus::Backlog);

        let mut expected = categories.clone();
        expected[0].tasks[0].substeps[0].status = TaskStatus::Completed;
        assert_eq!(outcome.categories, expected);
    }

    #[test]
    fn test_missing_task_is_a_noop() {
        let categories = sample_categories();
        let outcome = update_status(
            &categories,
            StatusTarget::Task { step: 99 },
            TaskStatus::Completed,
            &Independent,
        );
        assert_eq!(outcome.changed, None);
        assert_eq!(outcome.categories, categories);
    }

    #[test]
    fn test_missing_substep_is_a_noop() {
        let categories = sample_categories();
        let outcome = update_status(
            &categories,
            StatusTarget::Substep {
                step: 1,
                substep: 9,
            },
            TaskStatus::Completed,
            &Independent,
        );
        assert_eq!(outcome.changed, None);
        assert_eq!(outcome.categories, categories);
    }

    #[test]
    fn test_substep_target_skips_tasks_without_it() {
        // AR/1 has no substeps; Cash/1 owns substep 2. The substep target
        // must land on the owner even though AR/1 shares the step number.
        let mut categories = sample_categories();
        categories.swap(0, 1);
        let outcome = update_status(
            &categories,
            StatusTarget::Substep {
                step: 1,
                substep: 2,
            },
            TaskStatus::InProgress,
            &Independent,
        );
        match outcome.changed {
            Some(ChangedEntity::Substep {
                ref category,
                substep,
                ..
            }) => {
                assert_eq!(category, "Cash");
                assert_eq!(substep, 2);
            }
            other => panic!("expected substep change, got {:?}", other),
        }
    }

    #[test]
    fn test_free_transitions() {
        let categories = sample_categories();
        // Completed straight back to Backlog, no intermediate state required
        let outcome = update_status(
            &categories,
            StatusTarget::Task { step: 2 },
            TaskStatus::Completed,
            &Independent,
        );
        let outcome = update_status(
            &outcome.categories,
            StatusTarget::Task { step: 2 },
            TaskStatus::Backlog,
            &Independent,
        );
        assert_eq!(outcome.categories, categories);
    }

    #[test]
    fn test_complete_parent_rollup() {
        let categories = sample_categories();
        let outcome = update_status(
            &categories,
            StatusTarget::Substep {
                step: 1,
                substep: 1,
            },
            TaskStatus::Completed,
            &CompleteParent,
        );
        // One substep left incomplete: parent untouched
        assert_eq!(outcome.categories[0].tasks[0].status, TaskStatus::Backlog);

        let outcome = update_status(
            &outcome.categories,
            StatusTarget::Substep {
                step: 1,
                substep: 2,
            },
            TaskStatus::Completed,
            &CompleteParent,
        );
        assert_eq!(outcome.categories[0].tasks[0].status, TaskStatus::Completed);
        match outcome.changed {
            Some(ChangedEntity::Substep { parent_status, .. }) => {
                assert_eq!(parent_status, TaskStatus::Completed);
            }
            other => panic!("expected substep change, got {:?}", other),
        }
    }

    #[test]
    fn test_rollup_never_demotes() {
        let categories = sample_categories();
        let outcome = update_status(
            &categories,
            StatusTarget::Task { step: 1 },
            TaskStatus::Completed,
            &CompleteParent,
        );
        let outcome = update_status(
            &outcome.categories,
            StatusTarget::Substep {
                step: 1,
                substep: 1,
            },
            TaskStatus::InProgress,
            &CompleteParent,
        );
        assert_eq!(outcome.categories[0].tasks[0].status, TaskStatus::Completed);
    }

    #[test]
    fn test_rollup_policy_lookup() {
        assert_eq!(rollup_policy("independent").map(|p| p.name()), Some("independent"));
        assert_eq!(
            rollup_policy("complete-parent").map(|p| p.name()),
            Some("complete-parent")
        );
        assert!(rollup_policy("cascade").is_none());
    }

    #[test]
    fn test_tasks_without_substeps_never_rolled_up() {
        // An empty substep list must not count as "all complete"
        let steps = "\
category,step_number,step_name,description,assigned_to,status,priority,estimated_time_minutes,requires_approval,integration_required,required_integrations
Cash,1,Solo task,d,Pip,Backlog,High,10,Yes,No,\"\"
";
        let (categories, _) = parse_catalog(steps, "");
        let mut task = categories[0].tasks[0].clone();
        CompleteParent.after_substep_change(&mut task);
        assert_eq!(task.status, TaskStatus::Backlog);
    }
}
