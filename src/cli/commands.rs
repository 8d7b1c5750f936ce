use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cb", about = concat!("[=] closeboard v", env!("CARGO_PKG_VERSION"), " - the daily close on one screen"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different workspace directory
    #[arg(short = 'C', long = "workspace-dir", global = true)]
    pub workspace_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new close workspace in the current directory
    Init(InitArgs),
    /// Fetch the task catalog from the configured endpoint
    Fetch,
    /// List close tasks by category
    List(ListArgs),
    /// Show task details with substeps
    Show(ShowArgs),
    /// Change a task or substep status
    Status(StatusArgs),
    /// Show close progress
    Summary,
    /// Search tasks and substeps by text
    Search(SearchArgs),
    /// Validate the catalog snapshot
    Check,
    /// Bank reconciliation working set
    Recon(ReconCmd),
    /// Accrual ledger
    Accrual(AccrualCmd),
    /// Settlement report
    Settle(SettleCmd),
    /// Edit workspace configuration
    Config(ConfigCmd),
    /// View or manage the audit log
    Audit(AuditCmd),
}

// ---------------------------------------------------------------------------
// Init args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Workspace name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Catalog endpoint URL to write into close.toml
    #[arg(long)]
    pub endpoint: Option<String>,
    /// Reinitialize even if close/ already exists
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Catalog command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArgs {
    /// Category to list (default: all categories)
    pub category: Option<String>,
    /// Filter by status (backlog, in-progress, completed)
    #[arg(long)]
    pub status: Option<String>,
    /// Filter by assignee
    #[arg(long)]
    pub assignee: Option<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Step number to show
    pub step: u32,
    /// Show a single substep of the step instead
    #[arg(long)]
    pub substep: Option<u32>,
}

#[derive(Args)]
pub struct StatusArgs {
    /// Step number
    pub step: u32,
    /// New status (backlog, in-progress, completed)
    pub status: String,
    /// Target a substep of the step instead
    #[arg(long)]
    pub substep: Option<u32>,
    /// Substep rollup policy (independent, complete-parent)
    #[arg(long)]
    pub rollup: Option<String>,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Text to search for (case-insensitive substring)
    pub query: String,
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ReconCmd {
    #[command(subcommand)]
    pub action: ReconAction,
}

#[derive(Subcommand)]
pub enum ReconAction {
    /// Load the sample bank feed and GL extract into the workspace
    Seed,
    /// List bank transactions and GL entries
    List(ReconListArgs),
    /// Match a bank transaction to a GL entry
    Match(ReconMatchArgs),
    /// Show reconciliation totals
    Summary,
}

#[derive(Args)]
pub struct ReconListArgs {
    /// Restrict to one side (bank, gl)
    #[arg(long)]
    pub side: Option<String>,
    /// Filter by status (cleared, review, exception)
    #[arg(long)]
    pub status: Option<String>,
}

#[derive(Args)]
pub struct ReconMatchArgs {
    /// Bank transaction id
    pub bank: String,
    /// GL entry id
    pub gl: String,
}

// ---------------------------------------------------------------------------
// Accruals
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AccrualCmd {
    #[command(subcommand)]
    pub action: AccrualAction,
}

#[derive(Subcommand)]
pub enum AccrualAction {
    /// Load the sample accrual book into the workspace
    Seed,
    /// List accrual entries
    List(AccrualListArgs),
    /// Add an accrual entry
    Add(AccrualAddArgs),
    /// Change an entry's status
    SetStatus(AccrualSetStatusArgs),
    /// Remove an entry
    Rm(AccrualRmArgs),
}

#[derive(Args)]
pub struct AccrualListArgs {
    /// Filter by status (pending, complete, review, exception)
    #[arg(long)]
    pub status: Option<String>,
    /// Filter by kind (recurring, po-issued, monthly-expense)
    #[arg(long)]
    pub kind: Option<String>,
}

#[derive(Args)]
pub struct AccrualAddArgs {
    /// Description of the accrued expense
    pub description: String,
    /// Amount to accrue
    pub amount: f64,
    /// Accrual date (default: today)
    #[arg(long)]
    pub date: Option<String>,
    /// Kind (recurring, po-issued, monthly-expense)
    #[arg(long, default_value = "monthly-expense")]
    pub kind: String,
    /// Expense category
    #[arg(long, default_value = "Expense")]
    pub category: String,
    /// Vendor name
    #[arg(long)]
    pub vendor: Option<String>,
    /// Reference (PO number, invoice, contract)
    #[arg(long)]
    pub reference: Option<String>,
    /// Date the invoice is expected
    #[arg(long)]
    pub expected: Option<String>,
    /// Free-form note
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args)]
pub struct AccrualSetStatusArgs {
    /// Entry id (e.g. ACC003)
    pub id: String,
    /// New status (pending, complete, review, exception)
    pub status: String,
}

#[derive(Args)]
pub struct AccrualRmArgs {
    /// Entry id to remove
    pub id: String,
}

// ---------------------------------------------------------------------------
// Settlements
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct SettleCmd {
    #[command(subcommand)]
    pub action: SettleAction,
}

#[derive(Subcommand)]
pub enum SettleAction {
    /// List settlement payments
    List(SettleListArgs),
    /// Show settlement totals
    Summary,
}

#[derive(Args)]
pub struct SettleListArgs {
    /// Show only refunded payments
    #[arg(long)]
    pub refunded: bool,
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Set the catalog endpoint URL in close.toml
    SetEndpoint(SetEndpointArgs),
}

#[derive(Args)]
pub struct SetEndpointArgs {
    /// Endpoint URL (e.g. http://localhost:3000/api/tasks)
    pub url: String,
}

// ---------------------------------------------------------------------------
// Audit log
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AuditCmd {
    #[command(subcommand)]
    pub action: Option<AuditAction>,
    /// Maximum number of entries to show (default: 10)
    #[arg(long)]
    pub limit: Option<usize>,
    /// Show entries after this timestamp (ISO-8601)
    #[arg(long)]
    pub since: Option<String>,
}

#[derive(Subcommand)]
pub enum AuditAction {
    /// Remove old entries
    Prune(AuditPruneArgs),
    /// Print the absolute path to the audit log
    Path,
}

#[derive(Args)]
pub struct AuditPruneArgs {
    /// Remove entries older than this timestamp (default: 30 days ago)
    #[arg(long)]
    pub before: Option<String>,
    /// Remove all entries
    #[arg(long)]
    pub all: bool,
}
