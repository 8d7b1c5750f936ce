mod init;
pub use init::cmd_init;

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

/// Global override for workspace directory (set by -C flag)
static WORKSPACE_DIR_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::audit::{self, AuditCategory, AuditEntry};
use crate::io::catalog_client;
use crate::io::config_io;
use crate::io::lock::FileLock;
use crate::io::workspace_io::{self, WorkspaceError};
use crate::model::accrual::AccrualFilter;
use crate::model::workspace::Workspace;
use crate::model::task::{find_substep, find_task};
use crate::ops::provider::{DataProvider, FixtureProvider};
use crate::ops::{accrual_ops, check, recon_ops, search, status_ops, summary};
use crate::parse::parse_catalog;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;

    // Store -C override for load_workspace_cwd()
    if let Some(ref dir) = cli.workspace_dir {
        let abs = std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?;
        WORKSPACE_DIR_OVERRIDE.lock().unwrap().replace(abs);
    }

    match cli.command {
        // Bare `cb` launches the TUI from main.rs
        None => Ok(()),
        Some(cmd) => match cmd {
            // Init is handled in main.rs before workspace discovery
            Commands::Init(args) => cmd_init(args),

            // Read commands
            Commands::List(args) => cmd_list(args, json),
            Commands::Show(args) => cmd_show(args, json),
            Commands::Summary => cmd_summary(json),
            Commands::Search(args) => cmd_search(args, json),
            Commands::Check => cmd_check(json),

            // Write commands
            Commands::Fetch => cmd_fetch(json),
            Commands::Status(args) => cmd_status(args, json),

            // Working sets
            Commands::Recon(args) => cmd_recon(args, json),
            Commands::Accrual(args) => cmd_accrual(args, json),
            Commands::Settle(args) => cmd_settle(args, json),

            // Workspace plumbing
            Commands::Config(args) => cmd_config(args),
            Commands::Audit(args) => cmd_audit(args, json),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_workspace_cwd() -> Result<Workspace, WorkspaceError> {
    let start = match WORKSPACE_DIR_OVERRIDE.lock().unwrap().as_ref() {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().map_err(WorkspaceError::IoError)?,
    };
    let root = workspace_io::discover_workspace(&start)?;
    workspace_io::load_workspace(&root)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid timestamp '{}': {} (expected ISO-8601)", s, e).into())
}

// ---------------------------------------------------------------------------
// Read command handlers
// ---------------------------------------------------------------------------

fn cmd_list(args: ListArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = load_workspace_cwd()?;
    let status_filter = args
        .status
        .as_deref()
        .map(parse_task_status)
        .transpose()
        .map_err(Box::<dyn std::error::Error>::from)?;
    let assignee_filter = args.assignee.as_deref();

    if json {
        let mut results = Vec::new();
        for category in &workspace.categories {
            if let Some(ref name) = args.category
                && !category.name.eq_ignore_ascii_case(name)
            {
                continue;
            }
            let mut cj = category_to_json(category);
            cj.tasks.retain(|t| {
                status_filter.is_none_or(|s| t.status == s)
                    && assignee_filter.is_none_or(|a| t.assigned_to == a)
            });
            results.push(cj);
        }
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        let mut first = true;
        for category in &workspace.categories {
            if let Some(ref name) = args.category
                && !category.name.eq_ignore_ascii_case(name)
            {
                continue;
            }
            if !first {
                println!();
            }
            first = false;
            for line in format_category_listing(category, status_filter, assignee_filter) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

fn cmd_show(args: ShowArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = load_workspace_cwd()?;

    match args.substep {
        Some(n) => {
            let (_, substep) = find_substep(&workspace.categories, args.step, n)
                .ok_or_else(|| format!("substep not found: {}.{}", args.step, n))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&substep_to_json(substep))?);
            } else {
                for line in format_substep_detail(substep) {
                    println!("{}", line);
                }
            }
        }
        None => {
            let (_, task) = find_task(&workspace.categories, args.step)
                .ok_or_else(|| format!("step not found: {}", args.step))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&task_to_json(task))?);
            } else {
                for line in format_task_detail(task) {
                    println!("{}", line);
                }
            }
        }
    }
    Ok(())
}

fn cmd_summary(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = load_workspace_cwd()?;
    let progress = summary::catalog_summary(&workspace.categories);

    if json {
        println!("{}", serde_json::to_string_pretty(&progress)?);
    } else {
        println!(
            "{} of {} tasks complete ({}); {} in progress, {} backlog",
            progress.completed,
            progress.total_tasks,
            progress.percent_complete,
            progress.in_progress,
            progress.backlog
        );
        println!(
            "{} of {} estimated minutes remaining",
            progress.estimated_minutes_remaining, progress.estimated_minutes_total
        );
        if !progress.categories.is_empty() {
            println!();
            for cat in &progress.categories {
                println!(
                    "  {} {}/{} ({})",
                    cat.name, cat.completed, cat.total, cat.percent_complete
                );
            }
        }
    }
    Ok(())
}

fn cmd_search(args: SearchArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = load_workspace_cwd()?;
    let re = search::compile_query(&args.query)?;
    let hits = search::search_catalog(&workspace.categories, &re);

    if json {
        let out: Vec<SearchHitJson> = hits
            .iter()
            .map(|h| hit_to_json(&workspace.categories, h))
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for hit in &hits {
            println!("{}", format_search_hit(&workspace.categories, hit));
        }
    }
    Ok(())
}

fn cmd_check(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = load_workspace_cwd()?;
    // Re-read the raw snapshots; the loaded model has already had its
    // defaults applied and can no longer show what the files said
    let steps_text = std::fs::read_to_string(workspace.steps_path()).unwrap_or_default();
    let substeps_text = std::fs::read_to_string(workspace.substeps_path()).unwrap_or_default();
    let result = check::check_catalog(&steps_text, &substeps_text);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        if !result.errors.is_empty() {
            println!("Errors:");
            for err in &result.errors {
                match err {
                    check::CheckError::DuplicateStep {
                        category,
                        step,
                        count,
                    } => {
                        println!("  [{}] step {} appears {} times", category, step, count);
                    }
                    check::CheckError::OrphanSubstep {
                        main_step,
                        main_step_name,
                        sub_step,
                        sub_step_name,
                    } => {
                        println!(
                            "  substep {}.{} \"{}\" names a missing parent step \"{}\"",
                            main_step, sub_step, sub_step_name, main_step_name
                        );
                    }
                }
            }
        }
        if !result.warnings.is_empty() {
            if !result.errors.is_empty() {
                println!();
            }
            println!("Warnings:");
            for warn in &result.warnings {
                match warn {
                    check::CheckWarning::ParseAnomaly {
                        file,
                        row,
                        field,
                        message,
                    } => {
                        println!("  [{}:{}] {}: {}", file, row, field, message);
                    }
                    check::CheckWarning::ZeroEstimate {
                        category,
                        step,
                        step_name,
                    } => {
                        println!(
                            "  [{}] step {} \"{}\" has no time estimate",
                            category, step, step_name
                        );
                    }
                }
            }
        }
        if result.valid {
            println!("✓ catalog is consistent");
        } else {
            println!("✗ catalog has errors");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write command handlers
// ---------------------------------------------------------------------------

fn cmd_fetch(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut workspace = load_workspace_cwd()?;
    let endpoint = workspace.config.catalog.endpoint.clone().ok_or(
        "no catalog endpoint configured (set one with `cb config set-endpoint <URL>`)",
    )?;

    let _lock = FileLock::acquire_default(&workspace.close_dir)?;

    let payload = match catalog_client::fetch_catalog(&endpoint) {
        Ok(p) => p,
        Err(e) => {
            // A failed fetch leaves the snapshot alone but must not be silent
            audit::log_audit(
                &workspace.close_dir,
                AuditEntry {
                    timestamp: Utc::now(),
                    category: AuditCategory::Fetch,
                    description: "catalog fetch failed".to_string(),
                    fields: vec![("Endpoint".to_string(), endpoint.clone())],
                    body: e.to_string(),
                },
            );
            return Err(format!("catalog fetch failed: {}", e).into());
        }
    };

    let (categories, anomalies) = parse_catalog(&payload.steps, &payload.substeps);
    audit::log_anomalies(&workspace.close_dir, &endpoint, &anomalies);

    workspace.categories = categories;
    workspace_io::save_catalog(&workspace)?;

    let task_count: usize = workspace.categories.iter().map(|c| c.tasks.len()).sum();
    let substep_count: usize = workspace
        .categories
        .iter()
        .flat_map(|c| c.tasks.iter())
        .map(|t| t.substeps.len())
        .sum();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "endpoint": endpoint,
                "categories": workspace.categories.len(),
                "tasks": task_count,
                "substeps": substep_count,
                "degraded_rows": anomalies.len(),
            }))?
        );
    } else {
        println!(
            "fetched {} tasks in {} categories ({} substeps)",
            task_count,
            workspace.categories.len(),
            substep_count
        );
        if !anomalies.is_empty() {
            println!("  {} row(s) degraded — see `cb audit`", anomalies.len());
        }
    }
    Ok(())
}

fn cmd_status(args: StatusArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut workspace = load_workspace_cwd()?;
    let _lock = FileLock::acquire_default(&workspace.close_dir)?;

    let new_status =
        parse_task_status(&args.status).map_err(Box::<dyn std::error::Error>::from)?;

    let policy_name = args
        .rollup
        .clone()
        .unwrap_or_else(|| workspace.config.status.rollup.clone());
    let policy = status_ops::rollup_policy(&policy_name).ok_or_else(|| {
        format!(
            "unknown rollup policy '{}' (expected: independent, complete-parent)",
            policy_name
        )
    })?;

    let target = match args.substep {
        Some(n) => status_ops::StatusTarget::Substep {
            step: args.step,
            substep: n,
        },
        None => status_ops::StatusTarget::Task { step: args.step },
    };

    let outcome =
        status_ops::update_status(&workspace.categories, target, new_status, policy.as_ref());

    // The engine treats a lookup miss as a no-op; the CLI reports it
    let changed = match outcome.changed {
        Some(c) => c,
        None => {
            return Err(match args.substep {
                Some(n) => format!("substep not found: {}.{}", args.step, n).into(),
                None => format!("step not found: {}", args.step).into(),
            });
        }
    };

    workspace.categories = outcome.categories;
    workspace_io::save_catalog(&workspace)?;

    if json {
        let value = match &changed {
            status_ops::ChangedEntity::Task {
                category,
                step,
                from,
            } => serde_json::json!({
                "category": category,
                "step": step,
                "from": from,
                "to": new_status,
            }),
            status_ops::ChangedEntity::Substep {
                category,
                step,
                substep,
                from,
                parent_status,
            } => serde_json::json!({
                "category": category,
                "step": step,
                "substep": substep,
                "from": from,
                "to": new_status,
                "parent_status": parent_status,
            }),
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        match &changed {
            status_ops::ChangedEntity::Task {
                category,
                step,
                from,
            } => {
                println!(
                    "{}/{}: {} → {}",
                    category,
                    step,
                    from.label(),
                    new_status.label()
                );
            }
            status_ops::ChangedEntity::Substep {
                category,
                step,
                substep,
                from,
                parent_status,
            } => {
                println!(
                    "{}/{}.{}: {} → {}",
                    category,
                    step,
                    substep,
                    from.label(),
                    new_status.label()
                );
                if new_status == crate::model::status::TaskStatus::Completed
                    && *parent_status == crate::model::status::TaskStatus::Completed
                    && policy.name() == "complete-parent"
                {
                    println!("  step {} completed", step);
                }
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Reconciliation handlers
// ---------------------------------------------------------------------------

fn cmd_recon(args: ReconCmd, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    match args.action {
        ReconAction::Seed => cmd_recon_seed(json),
        ReconAction::List(list_args) => cmd_recon_list(list_args, json),
        ReconAction::Match(match_args) => cmd_recon_match(match_args, json),
        ReconAction::Summary => cmd_recon_summary(json),
    }
}

fn cmd_recon_seed(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = load_workspace_cwd()?;
    let _lock = FileLock::acquire_default(&workspace.close_dir)?;

    let recon = FixtureProvider.reconciliation();
    workspace_io::save_recon(&workspace, &recon)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "bank_transactions": recon.bank.len(),
                "gl_entries": recon.gl.len(),
            }))?
        );
    } else {
        println!(
            "seeded {} bank transactions and {} GL entries",
            recon.bank.len(),
            recon.gl.len()
        );
    }
    Ok(())
}

fn cmd_recon_list(args: ReconListArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = load_workspace_cwd()?;
    let recon = workspace_io::load_recon(&workspace)?;

    let status_filter = args
        .status
        .as_deref()
        .map(parse_txn_status)
        .transpose()
        .map_err(Box::<dyn std::error::Error>::from)?;
    let criteria = summary::TxnFilter {
        status: status_filter,
        side: None,
    };

    let (show_bank, show_gl) = match args.side.as_deref() {
        None => (true, true),
        Some("bank") => (true, false),
        Some("gl") => (false, true),
        Some(other) => {
            return Err(format!("unknown side '{}' (expected: bank, gl)", other).into());
        }
    };

    if json {
        let mut out = serde_json::Map::new();
        if show_bank {
            out.insert(
                "bank".to_string(),
                serde_json::to_value(summary::filter(&recon.bank, &criteria))?,
            );
        }
        if show_gl {
            out.insert(
                "gl".to_string(),
                serde_json::to_value(summary::filter(&recon.gl, &criteria))?,
            );
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::Value::Object(out))?
        );
    } else {
        if show_bank {
            println!("== Bank feed ==");
            for txn in summary::filter(&recon.bank, &criteria) {
                println!("{}", format_bank_line(txn));
            }
        }
        if show_gl {
            if show_bank {
                println!();
            }
            println!("== GL extract ==");
            for entry in summary::filter(&recon.gl, &criteria) {
                println!("{}", format_gl_line(entry));
            }
        }
    }
    Ok(())
}

fn cmd_recon_match(args: ReconMatchArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = load_workspace_cwd()?;
    let _lock = FileLock::acquire_default(&workspace.close_dir)?;

    let recon = workspace_io::load_recon(&workspace)?;
    let outcome = recon_ops::match_transaction(&recon, &args.bank, &args.gl);

    if !outcome.matched {
        if !recon.bank.iter().any(|t| t.transaction_id == args.bank) {
            return Err(format!("bank transaction not found: {}", args.bank).into());
        }
        return Err(format!("GL entry not found: {}", args.gl).into());
    }

    workspace_io::save_recon(&workspace, &outcome.workspace)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "bank": args.bank,
                "gl": args.gl,
                "matched": true,
            }))?
        );
    } else {
        println!("matched {} → {}", args.bank, args.gl);
    }
    Ok(())
}

fn cmd_recon_summary(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = load_workspace_cwd()?;
    let recon = workspace_io::load_recon(&workspace)?;
    let totals = summary::reconciliation_summary(&recon);

    if json {
        println!("{}", serde_json::to_string_pretty(&totals)?);
    } else {
        println!("debits:  {}", format_money(totals.total_debits));
        println!("credits: {}", format_money(totals.total_credits));
        println!(
            "unmatched: {} bank, {} GL",
            totals.unmatched_bank_transactions, totals.unmatched_gl_entries
        );
        println!("pending checks: {}", totals.pending_checks);
        println!("exceptions: {}", totals.exceptions_count);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Accrual handlers
// ---------------------------------------------------------------------------

fn cmd_accrual(args: AccrualCmd, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    match args.action {
        AccrualAction::Seed => cmd_accrual_seed(json),
        AccrualAction::List(list_args) => cmd_accrual_list(list_args, json),
        AccrualAction::Add(add_args) => cmd_accrual_add(add_args, json),
        AccrualAction::SetStatus(set_args) => cmd_accrual_set_status(set_args, json),
        AccrualAction::Rm(rm_args) => cmd_accrual_rm(rm_args),
    }
}

fn cmd_accrual_seed(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = load_workspace_cwd()?;
    let _lock = FileLock::acquire_default(&workspace.close_dir)?;

    let book = FixtureProvider.accruals();
    workspace_io::save_accruals(&workspace, &book)?;

    let total: f64 = book.entries.iter().map(|e| e.amount).sum();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "entries": book.entries.len(),
                "total_amount": total,
            }))?
        );
    } else {
        println!(
            "seeded {} accruals ({} total)",
            book.entries.len(),
            format_money(total)
        );
    }
    Ok(())
}

fn cmd_accrual_list(args: AccrualListArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = load_workspace_cwd()?;
    let book = workspace_io::load_accruals(&workspace)?;

    let criteria = AccrualFilter {
        status: args
            .status
            .as_deref()
            .map(parse_accrual_status)
            .transpose()
            .map_err(Box::<dyn std::error::Error>::from)?,
        kind: args
            .kind
            .as_deref()
            .map(parse_accrual_kind)
            .transpose()
            .map_err(Box::<dyn std::error::Error>::from)?,
        ..Default::default()
    };
    let entries = accrual_ops::filter_entries(&book, &criteria);

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for entry in &entries {
            println!("{}", format_accrual_line(entry));
        }
        let total: f64 = entries.iter().map(|e| e.amount).sum();
        println!("{} entries, {} total", entries.len(), format_money(total));
    }
    Ok(())
}

fn cmd_accrual_add(args: AccrualAddArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = load_workspace_cwd()?;
    let _lock = FileLock::acquire_default(&workspace.close_dir)?;

    let kind = parse_accrual_kind(&args.kind).map_err(Box::<dyn std::error::Error>::from)?;
    let date = args
        .date
        .unwrap_or_else(|| Utc::now().format("%Y-%m-%d").to_string());

    let book = workspace_io::load_accruals(&workspace)?;
    let (updated, id) = accrual_ops::add_entry(
        &book,
        accrual_ops::NewAccrual {
            date,
            description: args.description,
            amount: args.amount,
            kind,
            category: args.category,
            vendor: args.vendor.unwrap_or_default(),
            reference: args.reference.unwrap_or_default(),
            expected_date: args.expected,
            notes: args.notes,
        },
    );
    workspace_io::save_accruals(&workspace, &updated)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "entry_id": id }))?
        );
    } else {
        println!("{}", id);
    }
    Ok(())
}

fn cmd_accrual_set_status(
    args: AccrualSetStatusArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = load_workspace_cwd()?;
    let _lock = FileLock::acquire_default(&workspace.close_dir)?;

    let status = parse_accrual_status(&args.status).map_err(Box::<dyn std::error::Error>::from)?;
    let book = workspace_io::load_accruals(&workspace)?;
    let updated = accrual_ops::set_status(&book, &args.id, status)?;
    workspace_io::save_accruals(&workspace, &updated)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "entry_id": args.id,
                "status": status,
            }))?
        );
    } else {
        println!("{} → {}", args.id, status.label());
    }
    Ok(())
}

fn cmd_accrual_rm(args: AccrualRmArgs) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = load_workspace_cwd()?;
    let _lock = FileLock::acquire_default(&workspace.close_dir)?;

    let book = workspace_io::load_accruals(&workspace)?;
    let updated = accrual_ops::remove_entry(&book, &args.id)?;
    workspace_io::save_accruals(&workspace, &updated)?;

    println!("removed {}", args.id);
    Ok(())
}

// ---------------------------------------------------------------------------
// Settlement handlers
// ---------------------------------------------------------------------------

fn cmd_settle(args: SettleCmd, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    match args.action {
        SettleAction::List(list_args) => cmd_settle_list(list_args, json),
        SettleAction::Summary => cmd_settle_summary(json),
    }
}

fn cmd_settle_list(args: SettleListArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    // The settlement feed is provider-backed; no workspace file to read
    let mut payments = FixtureProvider.settlements();
    if args.refunded {
        payments.retain(|p| p.refunded);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&payments)?);
    } else {
        for payment in &payments {
            println!("{}", format_settlement_line(payment));
        }
    }
    Ok(())
}

fn cmd_settle_summary(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let payments = FixtureProvider.settlements();
    let totals = summary::settlement_summary(&payments);

    if json {
        println!("{}", serde_json::to_string_pretty(&totals)?);
    } else {
        println!(
            "{} payments, {} gross",
            totals.payment_count,
            format_money(totals.gross_amount)
        );
        println!(
            "fees {}, net {}",
            format_money(totals.total_fees),
            format_money(totals.net_amount)
        );
        println!(
            "{} refunded ({})",
            totals.refund_count,
            format_money(totals.refunded_amount)
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Config and audit handlers
// ---------------------------------------------------------------------------

fn cmd_config(args: ConfigCmd) -> Result<(), Box<dyn std::error::Error>> {
    match args.action {
        ConfigAction::SetEndpoint(set_args) => {
            let workspace = load_workspace_cwd()?;
            let _lock = FileLock::acquire_default(&workspace.close_dir)?;

            let (_, mut doc) = config_io::read_config(&workspace.close_dir)?;
            config_io::set_endpoint(&mut doc, &set_args.url);
            config_io::write_config(&workspace.close_dir, &doc)?;

            println!("catalog endpoint → {}", set_args.url);
            Ok(())
        }
    }
}

fn cmd_audit(args: AuditCmd, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = load_workspace_cwd()?;

    match args.action {
        Some(AuditAction::Prune(prune_args)) => {
            let before = prune_args
                .before
                .as_deref()
                .map(parse_timestamp)
                .transpose()?;
            let removed = audit::prune_audit(&workspace.close_dir, before, prune_args.all)?;
            println!("pruned {} entries", removed);
            Ok(())
        }
        Some(AuditAction::Path) => {
            println!("{}", audit::audit_log_path(&workspace.close_dir).display());
            Ok(())
        }
        None => {
            let since = args.since.as_deref().map(parse_timestamp).transpose()?;
            let limit = args.limit.or(Some(10));
            let entries = audit::read_audit_entries(&workspace.close_dir, limit, since);

            if json {
                let values: Vec<serde_json::Value> =
                    entries.iter().map(|e| e.to_json()).collect();
                println!("{}", serde_json::to_string_pretty(&values)?);
            } else if entries.is_empty() {
                println!("audit log is empty");
            } else {
                for entry in &entries {
                    print!("{}", entry.to_display_markdown());
                }
                if let Some(s) = audit::audit_summary(&workspace.close_dir)
                    && s.entry_count > entries.len()
                {
                    println!(
                        "({} of {} entries — use --limit to see more)",
                        entries.len(),
                        s.entry_count
                    );
                }
            }
            Ok(())
        }
    }
}
