use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;

use crate::parse::Anomaly;

/// Maximum size of the audit log before inline trimming (1 MB).
const MAX_LOG_SIZE: u64 = 1_048_576;

/// Default number of days before entries are prunable.
pub const PRUNE_AGE_DAYS: i64 = 30;

/// Self-documenting header written at the top of a new audit log.
const FILE_HEADER: &str = "\
<!-- closeboard audit log — append-only degradation record
     This file captures rows Closeboard had to skip or coerce,
     failed catalog fetches, and writes that didn't land.
     If a step went missing from the board, check here.
     View with: cb audit
     Prune old entries: cb audit prune
     Safe to delete if empty or stale. -->

---
";

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// Category of an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditCategory {
    Fetch,
    Parse,
    Conflict,
    Write,
}

impl fmt::Display for AuditCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AuditCategory::Fetch => "fetch",
            AuditCategory::Parse => "parse",
            AuditCategory::Conflict => "conflict",
            AuditCategory::Write => "write",
        };
        f.write_str(label)
    }
}

impl FromStr for AuditCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s {
            "fetch" => Ok(AuditCategory::Fetch),
            "parse" => Ok(AuditCategory::Parse),
            "conflict" => Ok(AuditCategory::Conflict),
            "write" => Ok(AuditCategory::Write),
            _ => Err(()),
        }
    }
}

/// A single entry in the audit log.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub category: AuditCategory,
    pub description: String,
    pub fields: Vec<(String, String)>,
    pub body: String,
}

impl fmt::Display for AuditEntry {
    /// Render in the on-disk markdown shape: a `##` header line, `Key: value`
    /// fields, the raw payload in a text fence, and a `---` terminator.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "## {} — {}: {}",
            self.timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            self.category,
            self.description,
        )?;
        writeln!(f)?;
        for (key, value) in &self.fields {
            writeln!(f, "{}: {}", key, value)?;
        }
        if !self.body.is_empty() {
            writeln!(f)?;
            writeln!(f, "```text")?;
            write!(f, "{}", self.body)?;
            if !self.body.ends_with('\n') {
                writeln!(f)?;
            }
            writeln!(f, "```")?;
        }
        writeln!(f)?;
        writeln!(f, "---")
    }
}

impl AuditEntry {
    /// Serialize to JSON value for `cb audit --json`.
    pub fn to_json(&self) -> serde_json::Value {
        let fields: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();

        serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            "category": self.category.to_string(),
            "description": self.description,
            "fields": fields,
            "body": self.body,
        })
    }

    /// Format as human-readable raw markdown for display.
    pub fn to_display_markdown(&self) -> String {
        self.to_string()
    }
}

/// Summary info about the audit log.
#[derive(Debug, Clone)]
pub struct AuditSummary {
    pub entry_count: usize,
    pub oldest: Option<DateTime<Utc>>,
}

/// Return the path to the audit log file.
pub fn audit_log_path(close_dir: &Path) -> PathBuf {
    close_dir.join(".audit.log")
}

// ---------------------------------------------------------------------------
// Atomic file write
// ---------------------------------------------------------------------------

/// Write `content` to `path` atomically: fill a sibling temp file, then
/// rename it over the target.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut tmp = NamedTempFile::new_in(path.parent().unwrap_or(Path::new(".")))?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Append an audit entry to the log. Errors are swallowed and printed to stderr.
pub fn log_audit(close_dir: &Path, entry: AuditEntry) {
    if let Err(e) = append_entry(close_dir, &entry) {
        eprintln!("warning: could not write to audit log: {}", e);
    }
}

fn append_entry(close_dir: &Path, entry: &AuditEntry) -> io::Result<()> {
    let path = audit_log_path(close_dir);

    if let Ok(meta) = std::fs::metadata(&path)
        && meta.len() > MAX_LOG_SIZE
    {
        try_inline_trim(&path);
    }

    // Missing file and empty file both get the header first
    let needs_header = std::fs::metadata(&path).map_or(true, |m| m.len() == 0);

    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    if needs_header {
        file.write_all(FILE_HEADER.as_bytes())?;
    }
    write!(file, "{}", entry)?;
    Ok(())
}

/// Log a batch of loader anomalies under a single parse entry.
/// No-op when the batch is empty.
pub fn log_anomalies(close_dir: &Path, source: &str, anomalies: &[Anomaly]) {
    if anomalies.is_empty() {
        return;
    }
    let body = anomalies
        .iter()
        .map(|a| format!("row {} [{}]: {}", a.row, a.field, a.message))
        .collect::<Vec<_>>()
        .join("\n");
    log_audit(
        close_dir,
        AuditEntry {
            timestamp: Utc::now(),
            category: AuditCategory::Parse,
            description: format!("{} row(s) degraded", anomalies.len()),
            fields: vec![("Source".to_string(), source.to_string())],
            body,
        },
    );
}

// ---------------------------------------------------------------------------
// Log scanning
// ---------------------------------------------------------------------------

/// A raw entry block in the log: the parsed header plus the byte span of the
/// whole block. Reading materializes blocks into entries; pruning splices
/// the kept spans back together untouched.
struct RawBlock<'a> {
    timestamp: DateTime<Utc>,
    category: AuditCategory,
    description: &'a str,
    text: &'a str,
}

/// Split the log into its preamble (the file header comment) and entry
/// blocks, oldest first. A block runs from its `## ` header line to the next
/// one; text fences are tracked so a `## ` line inside a captured payload
/// never starts a new entry.
fn scan_log(content: &str) -> (&str, Vec<RawBlock<'_>>) {
    let mut blocks = Vec::new();
    let mut preamble_len = None;
    let mut open: Option<(usize, DateTime<Utc>, AuditCategory, &str)> = None;
    let mut in_fence = false;

    let mut offset = 0;
    for raw in content.split_inclusive('\n') {
        let start = offset;
        offset += raw.len();
        let line = raw.trim_end_matches('\n');

        if in_fence {
            in_fence = line != "```";
            continue;
        }
        if line.starts_with("```") {
            in_fence = true;
            continue;
        }
        if let Some((timestamp, category, description)) = parse_header(line) {
            if let Some((block_start, ts, cat, desc)) = open {
                blocks.push(RawBlock {
                    timestamp: ts,
                    category: cat,
                    description: desc,
                    text: &content[block_start..start],
                });
            } else {
                preamble_len = Some(start);
            }
            open = Some((start, timestamp, category, description));
        }
    }
    if let Some((block_start, ts, cat, desc)) = open {
        blocks.push(RawBlock {
            timestamp: ts,
            category: cat,
            description: desc,
            text: &content[block_start..],
        });
    }

    let preamble = &content[..preamble_len.unwrap_or(content.len())];
    (preamble, blocks)
}

/// Parse an entry header line: `## <timestamp> — <category>: <description>`
fn parse_header(line: &str) -> Option<(DateTime<Utc>, AuditCategory, &str)> {
    let rest = line.strip_prefix("## ")?;
    let (stamp, rest) = rest.split_once(" — ")?;
    let timestamp = DateTime::parse_from_rfc3339(stamp)
        .ok()?
        .with_timezone(&Utc);
    let (category, description) = rest.split_once(": ")?;
    Some((timestamp, category.parse().ok()?, description))
}

impl RawBlock<'_> {
    /// Walk the block's lines after the header, collecting `Key: value`
    /// fields and the fenced body. Stops at the `---` terminator.
    fn into_entry(self) -> AuditEntry {
        let mut fields = Vec::new();
        let mut body_lines: Vec<&str> = Vec::new();
        let mut in_fence = false;

        for line in self.text.lines().skip(1) {
            if in_fence {
                if line == "```" {
                    in_fence = false;
                } else {
                    body_lines.push(line);
                }
            } else if line.starts_with("```") {
                in_fence = true;
            } else if line == "---" {
                break;
            } else if let Some((key, value)) = line.trim().split_once(": ") {
                fields.push((key.to_string(), value.to_string()));
            }
        }

        AuditEntry {
            timestamp: self.timestamp,
            category: self.category,
            description: self.description.to_string(),
            fields,
            body: body_lines.join("\n"),
        }
    }
}

// ---------------------------------------------------------------------------
// Reading entries
// ---------------------------------------------------------------------------

/// Read audit entries from the log file, most recent first.
pub fn read_audit_entries(
    close_dir: &Path,
    limit: Option<usize>,
    since: Option<DateTime<Utc>>,
) -> Vec<AuditEntry> {
    let content = match std::fs::read_to_string(audit_log_path(close_dir)) {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };
    let (_, blocks) = scan_log(&content);
    blocks
        .into_iter()
        .rev()
        .filter(|b| since.is_none_or(|s| b.timestamp >= s))
        .take(limit.unwrap_or(usize::MAX))
        .map(RawBlock::into_entry)
        .collect()
}

/// Get a summary of the audit log.
pub fn audit_summary(close_dir: &Path) -> Option<AuditSummary> {
    let content = std::fs::read_to_string(audit_log_path(close_dir)).ok()?;
    let (_, blocks) = scan_log(&content);
    let oldest = blocks.first().map(|b| b.timestamp)?;
    Some(AuditSummary {
        entry_count: blocks.len(),
        oldest: Some(oldest),
    })
}

// ---------------------------------------------------------------------------
// Pruning
// ---------------------------------------------------------------------------

/// Take an exclusive flock on the log. With `wait` the lock is retried for
/// about a second before giving up.
fn lock_log(file: &File, wait: bool) -> bool {
    use std::os::unix::io::AsRawFd;
    let fd = file.as_raw_fd();
    let attempts = if wait { 10 } else { 1 };
    for attempt in 0..attempts {
        if unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) } == 0 {
            return true;
        }
        if attempt + 1 < attempts {
            std::thread::sleep(std::time::Duration::from_millis(100));
        }
    }
    false
}

/// Rebuild the log keeping the preamble and every block at or after
/// `cutoff`. Returns the rebuilt content and the number of blocks dropped.
fn retain_since(content: &str, cutoff: DateTime<Utc>) -> (String, usize) {
    let (preamble, blocks) = scan_log(content);
    let mut kept = String::from(preamble);
    let mut removed = 0;
    for block in &blocks {
        if block.timestamp >= cutoff {
            kept.push_str(block.text);
        } else {
            removed += 1;
        }
    }
    (kept, removed)
}

/// Trim old entries when the log has outgrown MAX_LOG_SIZE. Skipped quietly
/// when another process holds the lock.
fn try_inline_trim(path: &Path) {
    let Ok(mut file) = OpenOptions::new().read(true).write(true).open(path) else {
        return;
    };
    if !lock_log(&file, false) {
        return; // another writer is trimming
    }

    let mut content = String::new();
    if file.read_to_string(&mut content).is_err() {
        return;
    }

    let cutoff = Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS);
    let (kept, removed) = retain_since(&content, cutoff);
    if removed > 0 {
        let _ = std::fs::write(path, kept);
    }
    // Lock released on drop
}

/// Prune entries from the audit log.
/// Returns the number of entries removed.
pub fn prune_audit(close_dir: &Path, before: Option<DateTime<Utc>>, all: bool) -> io::Result<usize> {
    let path = audit_log_path(close_dir);
    if !path.exists() {
        return Ok(0);
    }

    let file = OpenOptions::new().read(true).write(true).open(&path)?;
    if !lock_log(&file, true) {
        return Err(io::Error::new(
            io::ErrorKind::WouldBlock,
            "audit log is in use, try again later",
        ));
    }

    let content = std::fs::read_to_string(&path)?;

    if all {
        let (_, blocks) = scan_log(&content);
        std::fs::write(&path, FILE_HEADER)?;
        return Ok(blocks.len());
    }

    let cutoff = before.unwrap_or_else(|| Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS));
    let (kept, removed) = retain_since(&content, cutoff);
    std::fs::write(&path, kept)?;
    Ok(removed)

    // Lock released on drop
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use tempfile::TempDir;

    fn make_entry(category: AuditCategory, desc: &str, body: &str) -> AuditEntry {
        AuditEntry {
            timestamp: Utc::now(),
            category,
            description: desc.to_string(),
            fields: vec![
                ("Source".to_string(), "data/steps.csv".to_string()),
                ("Step".to_string(), "14".to_string()),
            ],
            body: body.to_string(),
        }
    }

    #[test]
    fn test_entry_formatting() {
        let entry = make_entry(AuditCategory::Parse, "skipped short row", "some content");
        let md = entry.to_string();
        assert!(md.contains("## "));
        assert!(md.contains("parse: skipped short row"));
        assert!(md.contains("Source: data/steps.csv"));
        assert!(md.contains("```text"));
        assert!(md.contains("some content"));
        assert!(md.ends_with("---\n"));
    }

    #[test]
    fn test_log_and_read() {
        let tmp = TempDir::new().unwrap();
        let close_dir = tmp.path().join("close");
        std::fs::create_dir_all(&close_dir).unwrap();

        log_audit(
            &close_dir,
            make_entry(AuditCategory::Parse, "test1", "body1"),
        );
        log_audit(
            &close_dir,
            make_entry(AuditCategory::Write, "test2", "body2"),
        );

        let entries = read_audit_entries(&close_dir, None, None);
        assert_eq!(entries.len(), 2);
        // Most recent first
        assert_eq!(entries[0].description, "test2");
        assert_eq!(entries[1].description, "test1");
    }

    #[test]
    fn test_read_with_limit() {
        let tmp = TempDir::new().unwrap();
        let close_dir = tmp.path().join("close");
        std::fs::create_dir_all(&close_dir).unwrap();

        for i in 0..5 {
            log_audit(
                &close_dir,
                make_entry(
                    AuditCategory::Parse,
                    &format!("entry{}", i),
                    &format!("body{}", i),
                ),
            );
        }

        let entries = read_audit_entries(&close_dir, Some(2), None);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].description, "entry4");
        assert_eq!(entries[1].description, "entry3");
    }

    #[test]
    fn test_prune_all() {
        let tmp = TempDir::new().unwrap();
        let close_dir = tmp.path().join("close");
        std::fs::create_dir_all(&close_dir).unwrap();

        log_audit(&close_dir, make_entry(AuditCategory::Parse, "test", "body"));

        let count = prune_audit(&close_dir, None, true).unwrap();
        assert_eq!(count, 1);

        let entries = read_audit_entries(&close_dir, None, None);
        assert!(entries.is_empty());

        // File should still exist with header
        let path = audit_log_path(&close_dir);
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("closeboard audit log"));
    }

    #[test]
    fn test_audit_summary() {
        let tmp = TempDir::new().unwrap();
        let close_dir = tmp.path().join("close");
        std::fs::create_dir_all(&close_dir).unwrap();

        assert!(audit_summary(&close_dir).is_none());

        log_audit(&close_dir, make_entry(AuditCategory::Write, "test", "body"));

        let summary = audit_summary(&close_dir).unwrap();
        assert_eq!(summary.entry_count, 1);
        assert!(summary.oldest.is_some());
    }

    #[test]
    fn test_atomic_write() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test.txt");

        atomic_write(&path, b"hello world").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello world");

        // Overwrite
        atomic_write(&path, b"goodbye").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "goodbye");
    }

    #[test]
    fn test_entry_to_json() {
        let entry = make_entry(AuditCategory::Parse, "skipped short row", "content");
        let json = entry.to_json();
        assert_eq!(json["category"], "parse");
        assert_eq!(json["description"], "skipped short row");
        assert_eq!(json["body"], "content");
        assert!(json["fields"]["Source"].as_str().is_some());
    }

    #[test]
    fn test_parse_header() {
        let result = parse_header("## 2026-02-10T14:32:05Z — parse: skipped short row");
        assert!(result.is_some());
        let (ts, cat, desc) = result.unwrap();
        assert_eq!(cat, AuditCategory::Parse);
        assert_eq!(desc, "skipped short row");
        assert_eq!(ts.year(), 2026);
    }

    #[test]
    fn test_parse_header_invalid() {
        assert!(parse_header("not a valid header").is_none());
        assert!(parse_header("## 2026-02-10T14:32:05Z — unknown: desc").is_none());
        assert!(parse_header("2026-02-10T14:32:05Z — parse: no prefix").is_none());
    }

    #[test]
    fn test_audit_log_path() {
        let path = audit_log_path(Path::new("/tmp/close"));
        assert_eq!(path, PathBuf::from("/tmp/close/.audit.log"));
    }

    #[test]
    fn test_empty_body_entry() {
        let entry = AuditEntry {
            timestamp: Utc::now(),
            category: AuditCategory::Conflict,
            description: "stale status write".to_string(),
            fields: vec![("Step".to_string(), "7".to_string())],
            body: String::new(),
        };
        let md = entry.to_string();
        assert!(!md.contains("```"));
        assert!(md.contains("conflict: stale status write"));
    }

    #[test]
    fn test_round_trip_parse() {
        let tmp = TempDir::new().unwrap();
        let close_dir = tmp.path().join("close");
        std::fs::create_dir_all(&close_dir).unwrap();

        let original = AuditEntry {
            timestamp: Utc::now(),
            category: AuditCategory::Write,
            description: "rename failed".to_string(),
            fields: vec![
                ("Target".to_string(), "data/steps.csv".to_string()),
                ("Error".to_string(), "Permission denied".to_string()),
            ],
            body: "Step Number,Step Name\n1,Lock the subledgers\n".to_string(),
        };

        log_audit(&close_dir, original.clone());

        let entries = read_audit_entries(&close_dir, None, None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, AuditCategory::Write);
        assert_eq!(entries[0].description, "rename failed");
        assert_eq!(entries[0].fields.len(), 2);
        assert_eq!(entries[0].body, "Step Number,Step Name\n1,Lock the subledgers");
    }

    #[test]
    fn test_body_with_heading_line_stays_one_entry() {
        let tmp = TempDir::new().unwrap();
        let close_dir = tmp.path().join("close");
        std::fs::create_dir_all(&close_dir).unwrap();

        // A captured payload may itself contain markdown headings; the fence
        // keeps them from being read back as new entries
        let entry = AuditEntry {
            timestamp: Utc::now(),
            category: AuditCategory::Write,
            description: "notes write failed".to_string(),
            fields: vec![],
            body: "# Close Notes\n\n## 2026-01-01T00:00:00Z — parse: decoy\n".to_string(),
        };
        log_audit(&close_dir, entry);

        let entries = read_audit_entries(&close_dir, None, None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].description, "notes write failed");
        assert!(entries[0].body.contains("decoy"));
    }

    #[test]
    fn test_file_header_created_on_first_write() {
        let tmp = TempDir::new().unwrap();
        let close_dir = tmp.path().join("close");
        std::fs::create_dir_all(&close_dir).unwrap();

        log_audit(&close_dir, make_entry(AuditCategory::Parse, "test", "body"));

        let content = std::fs::read_to_string(audit_log_path(&close_dir)).unwrap();
        assert!(content.starts_with("<!-- closeboard audit log"));
        assert!(content.contains("---\n"));
    }

    #[test]
    fn test_category_display() {
        assert_eq!(AuditCategory::Fetch.to_string(), "fetch");
        assert_eq!(AuditCategory::Parse.to_string(), "parse");
        assert_eq!(AuditCategory::Conflict.to_string(), "conflict");
        assert_eq!(AuditCategory::Write.to_string(), "write");
    }

    #[test]
    fn test_prune_before_cutoff() {
        let tmp = TempDir::new().unwrap();
        let close_dir = tmp.path().join("close");
        std::fs::create_dir_all(&close_dir).unwrap();

        // Create an entry with a timestamp in the past
        let old_entry = AuditEntry {
            timestamp: Utc::now() - chrono::Duration::days(60),
            category: AuditCategory::Parse,
            description: "old entry".to_string(),
            fields: vec![],
            body: "old content".to_string(),
        };
        log_audit(&close_dir, old_entry);

        // Create a recent entry
        let new_entry = AuditEntry {
            timestamp: Utc::now(),
            category: AuditCategory::Write,
            description: "new entry".to_string(),
            fields: vec![],
            body: "new content".to_string(),
        };
        log_audit(&close_dir, new_entry);

        // Prune entries older than 30 days
        let cutoff = Utc::now() - chrono::Duration::days(30);
        let removed = prune_audit(&close_dir, Some(cutoff), false).unwrap();
        assert_eq!(removed, 1);

        let entries = read_audit_entries(&close_dir, None, None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].description, "new entry");
    }

    #[test]
    fn test_prune_no_log_file() {
        let tmp = TempDir::new().unwrap();
        let close_dir = tmp.path().join("close");
        std::fs::create_dir_all(&close_dir).unwrap();

        // Prune when no log file exists should return 0
        let removed = prune_audit(&close_dir, None, true).unwrap();
        assert_eq!(removed, 0);
    }

    #[test]
    fn test_read_since_filter() {
        let tmp = TempDir::new().unwrap();
        let close_dir = tmp.path().join("close");
        std::fs::create_dir_all(&close_dir).unwrap();

        let old_entry = AuditEntry {
            timestamp: Utc::now() - chrono::Duration::days(10),
            category: AuditCategory::Parse,
            description: "older".to_string(),
            fields: vec![],
            body: String::new(),
        };
        log_audit(&close_dir, old_entry);

        let new_entry = AuditEntry {
            timestamp: Utc::now(),
            category: AuditCategory::Write,
            description: "newer".to_string(),
            fields: vec![],
            body: String::new(),
        };
        log_audit(&close_dir, new_entry);

        // A 5-day cutoff lands between the two
        let since = Utc::now() - chrono::Duration::days(5);
        let entries = read_audit_entries(&close_dir, None, Some(since));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].description, "newer");
    }

    #[test]
    fn test_retain_since_preserves_header() {
        let content = format!(
            "{}\n## {} — parse: old\n\nBody\n\n---\n## {} — write: new\n\nBody2\n\n---\n",
            FILE_HEADER,
            (Utc::now() - chrono::Duration::days(60))
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        );

        let cutoff = Utc::now() - chrono::Duration::days(30);
        let (kept, removed) = retain_since(&content, cutoff);

        assert_eq!(removed, 1);
        // Header should still be present
        assert!(kept.contains("closeboard audit log"));
        // Old entry should be removed
        assert!(!kept.contains("parse: old"));
        // New entry should remain
        assert!(kept.contains("write: new"));
    }

    #[test]
    fn test_retain_since_keeps_block_text_verbatim() {
        let tmp = TempDir::new().unwrap();
        let close_dir = tmp.path().join("close");
        std::fs::create_dir_all(&close_dir).unwrap();

        let old_entry = AuditEntry {
            timestamp: Utc::now() - chrono::Duration::days(60),
            category: AuditCategory::Parse,
            description: "old".to_string(),
            fields: vec![],
            body: String::new(),
        };
        log_audit(&close_dir, old_entry);
        log_audit(&close_dir, make_entry(AuditCategory::Write, "new", "payload"));

        let path = audit_log_path(&close_dir);
        let before = std::fs::read_to_string(&path).unwrap();
        let kept_block = before.split("## ").nth(2).unwrap().to_string();

        prune_audit(&close_dir, None, false).unwrap();

        // The surviving entry's bytes are untouched, not re-rendered
        let after = std::fs::read_to_string(&path).unwrap();
        assert!(after.starts_with(FILE_HEADER));
        assert!(after.ends_with(&format!("## {}", kept_block)));
        assert!(!after.contains("parse: old"));
    }

    #[test]
    fn test_log_anomalies_batch() {
        let tmp = TempDir::new().unwrap();
        let close_dir = tmp.path().join("close");
        std::fs::create_dir_all(&close_dir).unwrap();

        let anomalies = vec![
            Anomaly {
                row: 3,
                field: "Priority".to_string(),
                message: "unrecognized value \"Urgent\", defaulting to 3".to_string(),
            },
            Anomaly {
                row: 7,
                field: "Step Number".to_string(),
                message: "not an integer: \"x\"".to_string(),
            },
        ];
        log_anomalies(&close_dir, "data/steps.csv", &anomalies);

        let entries = read_audit_entries(&close_dir, None, None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, AuditCategory::Parse);
        assert_eq!(entries[0].description, "2 row(s) degraded");
        assert_eq!(entries[0].fields[0].1, "data/steps.csv");
        assert!(entries[0].body.contains("row 3 [Priority]"));
        assert!(entries[0].body.contains("row 7 [Step Number]"));
    }

    #[test]
    fn test_log_anomalies_empty_is_noop() {
        let tmp = TempDir::new().unwrap();
        let close_dir = tmp.path().join("close");
        std::fs::create_dir_all(&close_dir).unwrap();

        log_anomalies(&close_dir, "data/steps.csv", &[]);
        assert!(!audit_log_path(&close_dir).exists());
    }

    #[test]
    fn test_multiple_fields_round_trip() {
        let tmp = TempDir::new().unwrap();
        let close_dir = tmp.path().join("close");
        std::fs::create_dir_all(&close_dir).unwrap();

        let entry = AuditEntry {
            timestamp: Utc::now(),
            category: AuditCategory::Write,
            description: "multi-field test".to_string(),
            fields: vec![
                ("Source".to_string(), "data/steps.csv".to_string()),
                ("Target".to_string(), "data/substeps.csv".to_string()),
                ("Error".to_string(), "Permission denied".to_string()),
            ],
            body: String::new(),
        };
        log_audit(&close_dir, entry);

        let entries = read_audit_entries(&close_dir, None, None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].fields.len(), 3);
        assert_eq!(entries[0].fields[0].0, "Source");
        assert_eq!(entries[0].fields[1].0, "Target");
        assert_eq!(entries[0].fields[2].0, "Error");
        assert_eq!(entries[0].fields[2].1, "Permission denied");
    }

    #[test]
    fn test_read_nonexistent_returns_empty() {
        let tmp = TempDir::new().unwrap();
        let close_dir = tmp.path().join("nonexistent");
        let entries = read_audit_entries(&close_dir, None, None);
        assert!(entries.is_empty());
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("fetch".parse(), Ok(AuditCategory::Fetch));
        assert_eq!("parse".parse(), Ok(AuditCategory::Parse));
        assert_eq!("conflict".parse(), Ok(AuditCategory::Conflict));
        assert_eq!("write".parse(), Ok(AuditCategory::Write));
        assert!("unknown".parse::<AuditCategory>().is_err());
    }
}
