use crate::model::status::Priority;
use crate::model::task::{Category, Substep};
use crate::parse::catalog_parser::{STEPS_HEADER, SUBSTEPS_HEADER};
use crate::parse::csv::{escape_field, write_record};

fn priority_cell(priority: Option<Priority>) -> String {
    match priority {
        Some(Priority::P1) => "High".to_string(),
        Some(Priority::P2) => "Medium".to_string(),
        Some(Priority::P3) => "Low".to_string(),
        Some(Priority::P4) => "4".to_string(),
        None => String::new(),
    }
}

fn yes_no(value: bool) -> String {
    if value { "Yes" } else { "No" }.to_string()
}

/// Serialize categories back to steps CSV text, trailing newline included.
///
/// Statuses and priorities emit in canonical label form, so a snapshot
/// written after a fetch normalizes whatever the endpoint sent. The
/// integrations column is always quoted, matching the catalog source's
/// dialect (`""` for none).
pub fn serialize_steps(categories: &[Category]) -> String {
    let mut out = STEPS_HEADER.join(",");
    out.push('\n');
    for category in categories {
        for task in &category.tasks {
            let row = write_record(&[
                task.category.clone(),
                task.step_number.to_string(),
                task.step_name.clone(),
                task.description.clone(),
                task.assigned_to.clone(),
                task.status.label().to_string(),
                priority_cell(task.priority),
                task.estimated_minutes.to_string(),
                yes_no(task.requires_approval),
                yes_no(task.integration_required),
            ]);
            out.push_str(&row);
            out.push(',');
            out.push_str(&escape_field(&task.required_integrations.join(","), true));
            out.push('\n');
        }
    }
    out
}

/// Serialize every attached substep back to substeps CSV text
pub fn serialize_substeps(categories: &[Category]) -> String {
    let mut out = SUBSTEPS_HEADER.join(",");
    out.push('\n');
    for category in categories {
        for task in &category.tasks {
            for substep in &task.substeps {
                out.push_str(&substep_row(substep));
                out.push('\n');
            }
        }
    }
    out
}

fn substep_row(substep: &Substep) -> String {
    write_record(&[
        substep.main_step.to_string(),
        substep.main_step_name.clone(),
        substep.sub_step_number.to_string(),
        substep.sub_step_name.clone(),
        substep.sub_step_description.clone(),
        substep.estimated_minutes.to_string(),
        yes_no(substep.requires_judgment),
        yes_no(substep.requires_system_access),
        yes_no(substep.requires_external_data),
        substep.status.label().to_string(),
        substep.assigned_to.clone(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::catalog_parser::{parse_steps, parse_substeps};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_steps_round_trip() {
        let source = "\
category,step_number,step_name,description,assigned_to,status,priority,estimated_time_minutes,requires_approval,integration_required,required_integrations
Cash,1,Reconcile cash accounts,Reconcile cash accounts with statements,Pip,Backlog,High,10,Yes,Yes,\"Bank\"
Cash,2,Record transfers,Process intercompany transfers,Pip,In Progress,High,10,Yes,No,\"\"
AR,1,Record customer payments,Process outstanding payments,Human,Completed,Medium,15,No,Yes,\"NetSuite,Ramp\"
";
        let (categories, anomalies) = parse_steps(source);
        assert!(anomalies.is_empty());
        assert_eq!(serialize_steps(&categories), source);
    }

    #[test]
    fn test_substeps_round_trip() {
        let steps = "\
category,step_number,step_name,description,assigned_to,status,priority,estimated_time_minutes,requires_approval,integration_required,required_integrations
Cash,1,Reconcile cash,d,Pip,Backlog,High,10,Yes,No,\"\"
";
        let subs = "\
main_step,main_step_name,sub_step_number,sub_step_name,sub_step_description,estimated_time_minutes,requires_judgment,requires_system_access,requires_external_data,status,assigned_to
1,Reconcile cash,1,Pull statement,Download the statement,5,Yes,No,No,Backlog,Pip
1,Reconcile cash,2,Compare balances,Tie out totals,10,No,Yes,Yes,In Progress,Human
";
        let (mut categories, _) = parse_steps(steps);
        let (substeps, _) = parse_substeps(subs);
        crate::parse::catalog_parser::attach_substeps(&mut categories, substeps);
        assert_eq!(serialize_substeps(&categories), subs);
    }

    #[test]
    fn test_description_with_comma_gets_quoted() {
        let source = "\
category,step_number,step_name,description,assigned_to,status,priority,estimated_time_minutes,requires_approval,integration_required,required_integrations
Cash,1,Record JE,\"Get statement, then record the JE\",Pip,Backlog,High,10,Yes,No,\"\"
";
        let (categories, _) = parse_steps(source);
        assert_eq!(
            categories[0].tasks[0].description,
            "Get statement, then record the JE"
        );
        assert_eq!(serialize_steps(&categories), source);
    }

    #[test]
    fn test_unset_priority_emits_empty() {
        let source = "\
category,step_number,step_name,description,assigned_to,status,priority,estimated_time_minutes,requires_approval,integration_required,required_integrations
Cash,1,A,d,Pip,Backlog,,10,Yes,No,\"\"
";
        let (categories, _) = parse_steps(source);
        assert_eq!(categories[0].tasks[0].priority, None);
        assert_eq!(serialize_steps(&categories), source);
    }
}
