use serde::{Deserialize, Serialize};

/// Lifecycle status shared by tasks and substeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Backlog,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// The display label, matching the catalog's status column
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Backlog => "Backlog",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }

    /// The glyph shown in list rows
    pub fn glyph(self) -> char {
        match self {
            TaskStatus::Backlog => '○',
            TaskStatus::InProgress => '◐',
            TaskStatus::Completed => '●',
        }
    }

    /// Parse a catalog status label. Only the three canonical labels parse;
    /// anything else (the common fixture value `Not Started` included) is
    /// unknown and the caller picks a default.
    pub fn from_label(s: &str) -> Option<TaskStatus> {
        match s {
            "Backlog" => Some(TaskStatus::Backlog),
            "In Progress" => Some(TaskStatus::InProgress),
            "Completed" => Some(TaskStatus::Completed),
            _ => None,
        }
    }

    /// All statuses in lifecycle order, for pickers and filters
    pub fn all() -> [TaskStatus; 3] {
        [
            TaskStatus::Backlog,
            TaskStatus::InProgress,
            TaskStatus::Completed,
        ]
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Backlog
    }
}

/// Task priority, ordinal 1 (most urgent) through 4
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    P1,
    P2,
    P3,
    P4,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Priority::P1 => "P1",
            Priority::P2 => "P2",
            Priority::P3 => "P3",
            Priority::P4 => "P4",
        }
    }

    /// Parse a catalog priority cell. Accepts the label forms used by the
    /// catalog source (`High`/`Medium`/`Low`) and plain ordinals.
    pub fn from_label(s: &str) -> Option<Priority> {
        match s {
            "High" | "1" | "P1" => Some(Priority::P1),
            "Medium" | "2" | "P2" => Some(Priority::P2),
            "Low" | "3" | "P3" => Some(Priority::P3),
            "4" | "P4" => Some(Priority::P4),
            _ => None,
        }
    }
}

/// Debit or credit side of a money movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxnSide {
    Debit,
    Credit,
}

impl TxnSide {
    pub fn label(self) -> &'static str {
        match self {
            TxnSide::Debit => "debit",
            TxnSide::Credit => "credit",
        }
    }

    pub fn from_label(s: &str) -> Option<TxnSide> {
        match s {
            "debit" => Some(TxnSide::Debit),
            "credit" => Some(TxnSide::Credit),
            _ => None,
        }
    }
}

/// Reconciliation status of a bank transaction or GL entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxnStatus {
    Cleared,
    Review,
    Exception,
}

impl TxnStatus {
    pub fn label(self) -> &'static str {
        match self {
            TxnStatus::Cleared => "cleared",
            TxnStatus::Review => "review",
            TxnStatus::Exception => "exception",
        }
    }

    pub fn from_label(s: &str) -> Option<TxnStatus> {
        match s {
            "cleared" => Some(TxnStatus::Cleared),
            "review" => Some(TxnStatus::Review),
            "exception" => Some(TxnStatus::Exception),
            _ => None,
        }
    }
}

/// Accrual entry status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccrualStatus {
    Pending,
    Complete,
    Review,
    Exception,
}

impl AccrualStatus {
    pub fn label(self) -> &'static str {
        match self {
            AccrualStatus::Pending => "pending",
            AccrualStatus::Complete => "complete",
            AccrualStatus::Review => "review",
            AccrualStatus::Exception => "exception",
        }
    }

    pub fn from_label(s: &str) -> Option<AccrualStatus> {
        match s {
            "pending" => Some(AccrualStatus::Pending),
            "complete" => Some(AccrualStatus::Complete),
            "review" => Some(AccrualStatus::Review),
            "exception" => Some(AccrualStatus::Exception),
            _ => None,
        }
    }
}

/// Accrual entry kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccrualKind {
    Recurring,
    PoIssued,
    MonthlyExpense,
}

impl AccrualKind {
    pub fn label(self) -> &'static str {
        match self {
            AccrualKind::Recurring => "Recurring",
            AccrualKind::PoIssued => "PO issued",
            AccrualKind::MonthlyExpense => "Monthly expense",
        }
    }

    pub fn from_label(s: &str) -> Option<AccrualKind> {
        match s {
            "Recurring" => Some(AccrualKind::Recurring),
            "PO issued" => Some(AccrualKind::PoIssued),
            "Monthly expense" => Some(AccrualKind::MonthlyExpense),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_label_round_trip() {
        for status in TaskStatus::all() {
            assert_eq!(TaskStatus::from_label(status.label()), Some(status));
        }
    }

    #[test]
    fn test_status_unknown_labels() {
        assert_eq!(TaskStatus::from_label("Not Started"), None);
        assert_eq!(TaskStatus::from_label("backlog"), None);
        assert_eq!(TaskStatus::from_label(""), None);
    }

    #[test]
    fn test_priority_labels() {
        assert_eq!(Priority::from_label("High"), Some(Priority::P1));
        assert_eq!(Priority::from_label("Medium"), Some(Priority::P2));
        assert_eq!(Priority::from_label("Low"), Some(Priority::P3));
        assert_eq!(Priority::from_label("4"), Some(Priority::P4));
        assert_eq!(Priority::from_label("Urgent"), None);
        assert_eq!(Priority::from_label(""), None);
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::P1 < Priority::P2);
        assert!(Priority::P3 < Priority::P4);
    }

    #[test]
    fn test_txn_status_round_trip() {
        for s in [TxnStatus::Cleared, TxnStatus::Review, TxnStatus::Exception] {
            assert_eq!(TxnStatus::from_label(s.label()), Some(s));
        }
        assert_eq!(TxnStatus::from_label("Cleared"), None);
    }

    #[test]
    fn test_accrual_kind_labels() {
        assert_eq!(
            AccrualKind::from_label("PO issued"),
            Some(AccrualKind::PoIssued)
        );
        assert_eq!(
            AccrualKind::from_label("Monthly expense"),
            Some(AccrualKind::MonthlyExpense)
        );
        assert_eq!(AccrualKind::from_label("po issued"), None);
    }
}
