use crate::catalog::CatalogRecord;
use crate::report::{ItemStatus, RunReport};
use serde::Serialize;

/// Storage roots older catalog entries were written against, longest first.
const LEGACY_ROOTS: &[&str] = &[
    "/storage/uploads/products/",
    "/storage/products/",
    "/storage/uploads/",
    "/storage/",
    "uploads/",
];

/// Rewrite an image URL so it sits under `prefix`.
///
/// Relative paths and paths under an older storage root are re-rooted; casing
/// is kept as-is because it has to match the files on disk. URLs with a
/// scheme point somewhere else entirely and are returned unchanged.
pub fn normalize_image_url(url: &str, prefix: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if url.contains("://") || url.starts_with(&format!("{}/", prefix)) {
        return url.to_string();
    }

    let mut rest = url;
    for root in LEGACY_ROOTS {
        if let Some(stripped) = rest.strip_prefix(root) {
            rest = stripped;
            break;
        }
    }
    format!("{}/{}", prefix, rest.trim_start_matches('/'))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlChange {
    pub from: String,
    pub to: String,
}

/// A record whose image list is not in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlAudit {
    pub record_id: String,
    pub record_name: String,
    pub changes: Vec<UrlChange>,
    /// The full list as it should read, original order preserved.
    pub normalized: Vec<String>,
}

/// Records that would change under [`normalize_image_url`]. Read-only: the
/// result is advice for whoever maintains the catalog.
pub fn audit_image_urls(records: &[CatalogRecord], prefix: &str) -> Vec<UrlAudit> {
    records
        .iter()
        .filter_map(|record| {
            let normalized: Vec<String> = record
                .images
                .iter()
                .map(|url| normalize_image_url(url, prefix))
                .collect();
            let changes: Vec<UrlChange> = record
                .images
                .iter()
                .zip(&normalized)
                .filter(|(from, to)| from != to)
                .map(|(from, to)| UrlChange {
                    from: from.clone(),
                    to: to.clone(),
                })
                .collect();
            if changes.is_empty() {
                return None;
            }
            Some(UrlAudit {
                record_id: record.id.clone(),
                record_name: record.name.clone(),
                changes,
                normalized,
            })
        })
        .collect()
}

pub fn write_audit(audits: &[UrlAudit], report: &mut RunReport) {
    for audit in audits {
        for change in &audit.changes {
            report.record(
                ItemStatus::NonCanonical,
                format!("{} [{}]", audit.record_name, audit.record_id),
                Some(format!("{} => {}", change.from, change.to)),
            );
        }
    }
}
