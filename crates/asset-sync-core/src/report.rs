use crate::scanner::WalkFailure;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Converted,
    Skipped,
    Failed,
    Matched,
    Unmatched,
    Orphaned,
    Renamed,
    Conflict,
    NonCanonical,
    Found,
}

impl ItemStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ItemStatus::Converted => "converted",
            ItemStatus::Skipped => "skipped",
            ItemStatus::Failed => "failed",
            ItemStatus::Matched => "matched",
            ItemStatus::Unmatched => "unmatched",
            ItemStatus::Orphaned => "orphaned",
            ItemStatus::Renamed => "renamed",
            ItemStatus::Conflict => "conflict",
            ItemStatus::NonCanonical => "non-canonical",
            ItemStatus::Found => "found",
        }
    }

    /// Statuses a human has to look at.
    pub fn needs_attention(&self) -> bool {
        matches!(
            self,
            ItemStatus::Failed
                | ItemStatus::Unmatched
                | ItemStatus::Orphaned
                | ItemStatus::Conflict
                | ItemStatus::NonCanonical
        )
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A situation the pipeline refuses to resolve on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Conflict {
    /// Several product folders normalize to the same key.
    DuplicateFolderKey { key: String, folders: Vec<String> },
    /// Several image-less records normalize to the key of one folder.
    DuplicateRecordKey { key: String, record_ids: Vec<String> },
    /// A rename target already exists as a different entry.
    RenameTargetExists { source: String, target: String },
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conflict::DuplicateFolderKey { key, folders } => {
                write!(f, "folders share key '{}': {}", key, folders.join(", "))
            }
            Conflict::DuplicateRecordKey { key, record_ids } => {
                write!(f, "records share key '{}': {}", key, record_ids.join(", "))
            }
            Conflict::RenameTargetExists { source, target } => {
                write!(f, "cannot rename {}: {} already exists", source, target)
            }
        }
    }
}

/// Per-run totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub converted: usize,
    pub removed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub orphaned: usize,
    pub renamed: usize,
    pub conflicts: usize,
    pub non_canonical: usize,
    pub found: usize,
}

impl Counts {
    fn bump(&mut self, status: ItemStatus) {
        let slot = match status {
            ItemStatus::Converted => &mut self.converted,
            ItemStatus::Skipped => &mut self.skipped,
            ItemStatus::Failed => &mut self.failed,
            ItemStatus::Matched => &mut self.matched,
            ItemStatus::Unmatched => &mut self.unmatched,
            ItemStatus::Orphaned => &mut self.orphaned,
            ItemStatus::Renamed => &mut self.renamed,
            ItemStatus::Conflict => &mut self.conflicts,
            ItemStatus::NonCanonical => &mut self.non_canonical,
            ItemStatus::Found => &mut self.found,
        };
        *slot += 1;
    }

    fn labelled(&self) -> [(&'static str, usize); 11] {
        [
            ("found", self.found),
            ("converted", self.converted),
            ("removed", self.removed),
            ("renamed", self.renamed),
            ("matched", self.matched),
            ("skipped", self.skipped),
            ("unmatched", self.unmatched),
            ("orphaned", self.orphaned),
            ("conflicts", self.conflicts),
            ("non-canonical", self.non_canonical),
            ("failed", self.failed),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportItem {
    pub status: ItemStatus,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl fmt::Display for ReportItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{} -> {} ({})", self.subject, self.status, detail),
            None => write!(f, "{} -> {}", self.subject, self.status),
        }
    }
}

/// Everything one tool invocation did, item by item.
///
/// The text form lists every item in the order it was recorded, then the
/// non-zero totals, so two runs over the same tree print the same summary.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub tool: String,
    pub root: String,
    pub counts: Counts,
    pub items: Vec<ReportItem>,
}

impl RunReport {
    pub fn new(tool: impl Into<String>, root: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            root: root.into(),
            counts: Counts::default(),
            items: Vec::new(),
        }
    }

    pub fn record(&mut self, status: ItemStatus, subject: impl Into<String>, detail: Option<String>) {
        self.counts.bump(status);
        self.items.push(ReportItem {
            status,
            subject: subject.into(),
            detail,
        });
    }

    pub fn record_conflict(&mut self, subject: impl Into<String>, conflict: &Conflict) {
        self.record(ItemStatus::Conflict, subject, Some(conflict.to_string()));
    }

    /// Counts a deleted source file. Deletions ride along with a conversion
    /// item rather than getting a line of their own.
    pub fn count_removed(&mut self) {
        self.counts.removed += 1;
    }

    /// One `Failed` line per entry the walk had to skip.
    pub fn record_walk_failures(&mut self, failures: Vec<WalkFailure>) {
        for failure in failures {
            self.record(
                ItemStatus::Failed,
                failure.relative_path,
                Some(format!("unreadable, skipped: {}", failure.reason)),
            );
        }
    }

    pub fn items_with(&self, status: ItemStatus) -> impl Iterator<Item = &ReportItem> {
        self.items.iter().filter(move |item| item.status == status)
    }

    pub fn needs_attention(&self) -> bool {
        self.items.iter().any(|item| item.status.needs_attention())
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} summary for {}", self.tool, self.root)?;
        for item in &self.items {
            writeln!(f, "  {}", item)?;
        }

        let totals: Vec<String> = self
            .counts
            .labelled()
            .iter()
            .filter(|(_, n)| *n > 0)
            .map(|(label, n)| format!("{}: {}", label, n))
            .collect();
        if totals.is_empty() {
            write!(f, "Done. Nothing to do.")
        } else {
            write!(f, "Done. {}", totals.join(", "))
        }
    }
}
