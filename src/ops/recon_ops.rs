use crate::model::recon::{BankTransaction, GlEntry, ReconWorkspace};
use crate::model::status::TxnStatus;

/// Result of a match action: the replacement working set plus whether a
/// pairing was actually applied. A lookup miss on either id returns the
/// input unchanged with `matched = false`.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    pub workspace: ReconWorkspace,
    pub matched: bool,
}

/// Pair a bank transaction with a GL entry.
///
/// Returns a fresh working set in which the bank record is cleared, flagged
/// GL-matched, and stamped with the entry's account number, and the GL entry
/// is cleared and back-linked to the bank transaction id. Both ids must
/// resolve; otherwise nothing changes. Re-matching an already matched pair
/// rewrites the same values, so the action is idempotent.
pub fn match_transaction(
    workspace: &ReconWorkspace,
    bank_id: &str,
    gl_id: &str,
) -> MatchOutcome {
    let bank_idx = workspace
        .bank
        .iter()
        .position(|t| t.transaction_id == bank_id);
    let gl_idx = workspace.gl.iter().position(|e| e.entry_id == gl_id);

    let (Some(bank_idx), Some(gl_idx)) = (bank_idx, gl_idx) else {
        return MatchOutcome {
            workspace: workspace.clone(),
            matched: false,
        };
    };

    let mut updated = workspace.clone();
    let account_number = updated.gl[gl_idx].account_number.clone();

    let bank = &mut updated.bank[bank_idx];
    bank.status = TxnStatus::Cleared;
    bank.gl_account_matched = true;
    bank.gl_account = Some(account_number);

    let entry = &mut updated.gl[gl_idx];
    entry.status = TxnStatus::Cleared;
    entry.matched_bank_transaction = Some(bank_id.to_string());

    MatchOutcome {
        workspace: updated,
        matched: true,
    }
}

/// GL entry back-linked to the given bank transaction, if any
pub fn linked_gl_entry<'a>(
    workspace: &'a ReconWorkspace,
    bank_id: &str,
) -> Option<&'a GlEntry> {
    workspace
        .gl
        .iter()
        .find(|e| e.matched_bank_transaction.as_deref() == Some(bank_id))
}

/// Bank transaction a GL entry points at through its back-link, if any
pub fn linked_bank_transaction<'a>(
    workspace: &'a ReconWorkspace,
    gl_id: &str,
) -> Option<&'a BankTransaction> {
    let entry = workspace.gl.iter().find(|e| e.entry_id == gl_id)?;
    let bank_id = entry.matched_bank_transaction.as_deref()?;
    workspace
        .bank
        .iter()
        .find(|t| t.transaction_id == bank_id)
}
