use std::collections::HashMap;

use serde::Serialize;

use crate::model::task::Substep;
use crate::parse::{attach_substeps, parse_steps, parse_substeps};

/// Structured result from `cb check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<CheckError>,
    pub warnings: Vec<CheckWarning>,
}

/// A consistency error (something that should be fixed in the snapshot).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum CheckError {
    /// Two rows in one category share a step number, so status updates and
    /// lookups can only ever reach the first of them
    #[serde(rename = "duplicate_step")]
    DuplicateStep {
        category: String,
        step: u32,
        count: usize,
    },
    /// A substep row names a parent that no step row provides; the loader
    /// drops it
    #[serde(rename = "orphan_substep")]
    OrphanSubstep {
        main_step: u32,
        main_step_name: String,
        sub_step: u32,
        sub_step_name: String,
    },
}

/// A consistency warning (the loader degrades these rather than rejecting).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum CheckWarning {
    /// A cell the loader coerced to a default: unknown status or priority
    /// label, unparseable integer, missing column
    #[serde(rename = "parse_anomaly")]
    ParseAnomaly {
        file: String,
        row: usize,
        field: String,
        message: String,
    },
    /// A step with no time estimate, either written as 0 or degraded to it
    #[serde(rename = "zero_estimate")]
    ZeroEstimate {
        category: String,
        step: u32,
        step_name: String,
    },
}

// ---------------------------------------------------------------------------
// Main check entry point
// ---------------------------------------------------------------------------

/// Validate the catalog snapshot files and return structured results.
///
/// This is a read-only operation over the raw CSV text. It re-parses from
/// scratch because the in-memory model has already had its defaults applied
/// and can no longer show what the file actually said.
///
/// Checks performed:
/// 1. No duplicate step numbers within a category
/// 2. Every substep row attaches to a parent step
/// 3. Warnings for coerced cells (unknown labels, bad integers)
/// 4. Warnings for steps with a zero time estimate
pub fn check_catalog(steps_text: &str, substeps_text: &str) -> CheckResult {
    let mut result = CheckResult::default();

    let (mut categories, step_anomalies) = parse_steps(steps_text);
    let (substeps, substep_anomalies) = parse_substeps(substeps_text);

    for anomaly in &step_anomalies {
        result.warnings.push(CheckWarning::ParseAnomaly {
            file: "steps".to_string(),
            row: anomaly.row,
            field: anomaly.field.clone(),
            message: anomaly.message.clone(),
        });
    }
    for anomaly in &substep_anomalies {
        result.warnings.push(CheckWarning::ParseAnomaly {
            file: "substeps".to_string(),
            row: anomaly.row,
            field: anomaly.field.clone(),
            message: anomaly.message.clone(),
        });
    }

    // Orphans are found by attaching a copy and seeing what never landed;
    // this keeps the check on the loader's real attachment rule instead of
    // a reimplementation of it.
    let parsed_substeps = substeps.clone();
    attach_substeps(&mut categories, substeps);
    for substep in &parsed_substeps {
        if !is_attached(&categories, substep) {
            result.errors.push(CheckError::OrphanSubstep {
                main_step: substep.main_step,
                main_step_name: substep.main_step_name.clone(),
                sub_step: substep.sub_step_number,
                sub_step_name: substep.sub_step_name.clone(),
            });
        }
    }

    for category in &categories {
        let mut counts: HashMap<u32, usize> = HashMap::new();
        for task in &category.tasks {
            *counts.entry(task.step_number).or_default() += 1;
        }
        let mut duplicates: Vec<_> = counts.into_iter().filter(|(_, n)| *n > 1).collect();
        duplicates.sort_by_key(|(step, _)| *step);
        for (step, count) in duplicates {
            result.errors.push(CheckError::DuplicateStep {
                category: category.name.clone(),
                step,
                count,
            });
        }

        for task in &category.tasks {
            if task.estimated_minutes == 0 {
                result.warnings.push(CheckWarning::ZeroEstimate {
                    category: category.name.clone(),
                    step: task.step_number,
                    step_name: task.step_name.clone(),
                });
            }
        }
    }

    result.valid = result.errors.is_empty();
    result
}

fn is_attached(categories: &[crate::model::task::Category], substep: &Substep) -> bool {
    categories
        .iter()
        .flat_map(|c| c.tasks.iter())
        .flat_map(|t| t.substeps.iter())
        .any(|s| {
            s.main_step == substep.main_step
                && s.sub_step_number == substep.sub_step_number
                && s.sub_step_name == substep.sub_step_name
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const STEPS_HEADER: &str = "category,step_number,step_name,description,assigned_to,status,priority,estimated_time_minutes,requires_approval,integration_required,required_integrations\n";
    const SUBSTEPS_HEADER: &str = "main_step,main_step_name,sub_step_number,sub_step_name,sub_step_description,estimated_time_minutes,requires_judgment,requires_system_access,requires_external_data,status,assigned_to\n";

    fn steps_csv(rows: &str) -> String {
        format!("{STEPS_HEADER}{rows}")
    }

    fn substeps_csv(rows: &str) -> String {
        format!("{SUBSTEPS_HEADER}{rows}")
    }

    // --- Duplicate steps ---

    #[test]
    fn test_check_duplicate_step_in_category() {
        let steps = steps_csv(
            "\
Cash,1,First,d,Pip,Backlog,High,10,Yes,No,\"\"
Cash,1,Shadowed twin,d,Pip,Backlog,High,10,Yes,No,\"\"
",
        );
        let result = check_catalog(&steps, SUBSTEPS_HEADER);
        assert!(!result.valid);
        assert!(matches!(
            &result.errors[0],
            CheckError::DuplicateStep { category, step: 1, count: 2 } if category == "Cash"
        ));
    }

    #[test]
    fn test_check_same_step_across_categories_is_fine() {
        let steps = steps_csv(
            "\
Cash,1,First,d,Pip,Backlog,High,10,Yes,No,\"\"
AR,1,Also first,d,Pip,Backlog,High,10,Yes,No,\"\"
",
        );
        let result = check_catalog(&steps, SUBSTEPS_HEADER);
        assert!(result.valid);
    }

    // --- Orphan substeps ---

    #[test]
    fn test_check_orphan_substep() {
        let steps = steps_csv("Cash,1,Reconcile,d,Pip,Backlog,High,10,Yes,No,\"\"\n");
        let substeps =
            substeps_csv("7,No Such Step,1,Dangling,d,5,No,No,No,Backlog,Pip\n");
        let result = check_catalog(&steps, &substeps);
        assert!(!result.valid);
        assert!(matches!(
            &result.errors[0],
            CheckError::OrphanSubstep { main_step: 7, sub_step: 1, sub_step_name, .. }
                if sub_step_name == "Dangling"
        ));
    }

    #[test]
    fn test_check_attached_substep_is_not_an_orphan() {
        let steps = steps_csv("Cash,1,Reconcile,d,Pip,Backlog,High,10,Yes,No,\"\"\n");
        let substeps = substeps_csv("1,Reconcile,1,Pull statement,d,5,No,No,No,Backlog,Pip\n");
        let result = check_catalog(&steps, &substeps);
        assert!(result.valid);
        assert!(result.errors.is_empty());
    }

    // --- Warnings ---

    #[test]
    fn test_warn_unknown_status_label() {
        let steps = steps_csv("Cash,1,Reconcile,d,Pip,Not Started,High,10,Yes,No,\"\"\n");
        let result = check_catalog(&steps, SUBSTEPS_HEADER);
        assert!(result.valid); // coercions are warnings, not errors
        assert!(result.warnings.iter().any(|w| matches!(
            w,
            CheckWarning::ParseAnomaly { field, row: 2, .. } if field == "status"
        )));
    }

    #[test]
    fn test_warn_zero_estimate() {
        let steps = steps_csv("Cash,1,Reconcile,d,Pip,Backlog,High,0,Yes,No,\"\"\n");
        let result = check_catalog(&steps, SUBSTEPS_HEADER);
        assert!(result.warnings.iter().any(|w| matches!(
            w,
            CheckWarning::ZeroEstimate { step: 1, .. }
        )));
    }

    #[test]
    fn test_warn_unparseable_estimate_twice() {
        // A bad integer cell degrades to 0, so it shows up both as the
        // coercion and as the zero estimate it produced
        let steps = steps_csv("Cash,1,Reconcile,d,Pip,Backlog,High,soon,Yes,No,\"\"\n");
        let result = check_catalog(&steps, SUBSTEPS_HEADER);
        assert!(result.warnings.iter().any(|w| matches!(
            w,
            CheckWarning::ParseAnomaly { field, .. } if field == "estimated_time_minutes"
        )));
        assert!(result.warnings.iter().any(|w| matches!(
            w,
            CheckWarning::ZeroEstimate { .. }
        )));
    }

    // --- Clean catalog ---

    #[test]
    fn test_check_clean_catalog() {
        let steps = steps_csv(
            "\
Cash,1,Reconcile,d,Pip,Backlog,High,10,Yes,No,\"\"
Cash,2,Transfers,d,Human,In Progress,Medium,15,Yes,No,\"\"
",
        );
        let substeps = substeps_csv("1,Reconcile,1,Pull statement,d,5,No,No,No,Backlog,Pip\n");
        let result = check_catalog(&steps, &substeps);
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    // --- JSON serialization ---

    #[test]
    fn test_check_result_serializes_to_json() {
        let steps = steps_csv(
            "\
Cash,1,First,d,Pip,Backlog,High,10,Yes,No,\"\"
Cash,1,Twin,d,Pip,Backlog,High,10,Yes,No,\"\"
",
        );
        let result = check_catalog(&steps, SUBSTEPS_HEADER);
        let json = serde_json::to_string_pretty(&result).unwrap();
        assert!(json.contains("duplicate_step"));
        assert!(json.contains("\"valid\": false"));
    }
}
