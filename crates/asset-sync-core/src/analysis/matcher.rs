use crate::catalog::CatalogRecord;
use crate::normalize::{normalize, NormalizedKey};
use crate::report::{Conflict, ItemStatus, RunReport};
use crate::scanner::ProductFolder;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchOutcome {
    /// The record already lists images; nothing to do.
    AlreadyHasImages,
    /// Exactly one folder carries the record's key.
    Matched {
        folder: String,
        proposed_images: Vec<String>,
    },
    Unmatched,
    /// More than one candidate; left for a human to decide.
    Ambiguous { folders: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub record_id: String,
    pub record_name: String,
    pub key: NormalizedKey,
    pub outcome: MatchOutcome,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MatchReport {
    /// One entry per record, in input order.
    pub results: Vec<MatchResult>,
    /// Relative paths of product folders no record names, sorted.
    pub orphans: Vec<String>,
    pub conflicts: Vec<Conflict>,
}

/// Join product folders and catalog records on their normalized names.
///
/// Both sides are indexed once, so the cost is linear in folders plus
/// records. Ties are never broken: a record whose key hits several folders,
/// or several image-less records hitting one folder, come back as
/// [`MatchOutcome::Ambiguous`] together with a [`Conflict`].
pub fn match_catalog(
    folders: &[ProductFolder],
    records: &[CatalogRecord],
    url_prefix: &str,
) -> MatchReport {
    let mut folder_index: HashMap<NormalizedKey, Vec<&ProductFolder>> = HashMap::new();
    for folder in folders {
        folder_index.entry(normalize(&folder.name)).or_default().push(folder);
    }

    let record_keys: Vec<NormalizedKey> = records.iter().map(|r| normalize(&r.name)).collect();

    let mut pending_by_key: HashMap<&NormalizedKey, Vec<&CatalogRecord>> = HashMap::new();
    for (record, key) in records.iter().zip(&record_keys) {
        if !record.has_images() {
            pending_by_key.entry(key).or_default().push(record);
        }
    }

    let mut conflicts = Vec::new();

    let mut shared_folder_keys: Vec<(&NormalizedKey, &Vec<&ProductFolder>)> = folder_index
        .iter()
        .filter(|(_, folders)| folders.len() > 1)
        .collect();
    shared_folder_keys.sort_by(|a, b| a.0.cmp(b.0));
    for (key, folders) in shared_folder_keys {
        conflicts.push(Conflict::DuplicateFolderKey {
            key: key.to_string(),
            folders: folders.iter().map(|f| f.relative_path.clone()).collect(),
        });
    }

    let mut shared_record_keys: Vec<(&&NormalizedKey, &Vec<&CatalogRecord>)> = pending_by_key
        .iter()
        .filter(|(key, records)| records.len() > 1 && folder_index.contains_key(**key))
        .collect();
    shared_record_keys.sort_by(|a, b| a.0.cmp(b.0));
    for (key, records) in shared_record_keys {
        conflicts.push(Conflict::DuplicateRecordKey {
            key: key.to_string(),
            record_ids: records.iter().map(|r| r.id.clone()).collect(),
        });
    }

    let mut results = Vec::with_capacity(records.len());
    for (record, key) in records.iter().zip(&record_keys) {
        let outcome = if record.has_images() {
            MatchOutcome::AlreadyHasImages
        } else {
            let candidates = folder_index.get(key).map(Vec::as_slice).unwrap_or(&[]);
            let competing = pending_by_key.get(key).map_or(0, Vec::len);
            match candidates {
                [] => MatchOutcome::Unmatched,
                [folder] if competing <= 1 => MatchOutcome::Matched {
                    folder: folder.relative_path.clone(),
                    proposed_images: proposed_images(folder, url_prefix),
                },
                _ => MatchOutcome::Ambiguous {
                    folders: candidates.iter().map(|f| f.relative_path.clone()).collect(),
                },
            }
        };
        debug!("Record {} '{}' -> {:?}", record.id, record.name, outcome);
        results.push(MatchResult {
            record_id: record.id.clone(),
            record_name: record.name.clone(),
            key: key.clone(),
            outcome,
        });
    }

    let claimed: HashSet<&NormalizedKey> = record_keys.iter().collect();
    let mut orphans: Vec<String> = folder_index
        .iter()
        .filter(|(key, _)| !claimed.contains(key))
        .flat_map(|(_, folders)| folders.iter().map(|f| f.relative_path.clone()))
        .collect();
    orphans.sort();

    MatchReport {
        results,
        orphans,
        conflicts,
    }
}

/// URLs the catalog would list for `folder`, in file-name order.
fn proposed_images(folder: &ProductFolder, url_prefix: &str) -> Vec<String> {
    let prefix = url_prefix.trim_end_matches('/');
    folder
        .images
        .iter()
        .map(|image| format!("{}/{}/{}", prefix, folder.relative_path, image.file_name()))
        .collect()
}

impl MatchReport {
    pub fn matched(&self) -> impl Iterator<Item = &MatchResult> {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, MatchOutcome::Matched { .. }))
    }

    /// Append one line per record, orphan and conflict to `report`.
    pub fn write_to(&self, report: &mut RunReport) {
        for result in &self.results {
            let name = &result.record_name;
            match &result.outcome {
                MatchOutcome::AlreadyHasImages => report.record(
                    ItemStatus::Skipped,
                    name.as_str(),
                    Some("already has images".to_string()),
                ),
                MatchOutcome::Matched {
                    folder,
                    proposed_images,
                } => report.record(
                    ItemStatus::Matched,
                    name.as_str(),
                    Some(format!("{}, {} images", folder, proposed_images.len())),
                ),
                MatchOutcome::Unmatched => report.record(
                    ItemStatus::Unmatched,
                    name.as_str(),
                    Some(format!("id {}, no folder named '{}'", result.record_id, result.key)),
                ),
                MatchOutcome::Ambiguous { folders } => report.record(
                    ItemStatus::Conflict,
                    name.as_str(),
                    Some(format!("id {}, candidates: {}", result.record_id, folders.join(", "))),
                ),
            }
        }

        for orphan in &self.orphans {
            report.record(
                ItemStatus::Orphaned,
                orphan.as_str(),
                Some("no catalog record".to_string()),
            );
        }

        for conflict in &self.conflicts {
            let subject = match conflict {
                Conflict::DuplicateFolderKey { key, .. }
                | Conflict::DuplicateRecordKey { key, .. } => key.clone(),
                Conflict::RenameTargetExists { source, .. } => source.clone(),
            };
            report.record_conflict(subject, conflict);
        }
    }
}
