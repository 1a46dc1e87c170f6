//! Worklist expansion of nested manifests.
//!
//! [`ManifestExtractor::extract`] seeds its result with a copy of the input
//! manifest and walks it with a cursor. PACKAGE entries and layout JSON
//! entries are fetched and the records they yield are appended to the same
//! list, so the cursor reaches them later in the same pass: input
//! entries are processed in input order, discovered ones level by level
//! after them.
//!
//! Nothing here fails: fetch failures and identifier/path conflicts are
//! collected in the returned [`ExtractionResult`].

use log::{debug, warn};
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::manifest::fetch::ManifestFetch;
use crate::manifest::layout::LayoutScanner;
use crate::resources::loaderconfig::LoaderConfig;
use crate::resources::resourcerecord::{ResourceRecord, ResourceType};

/// A package or layout that could not be fetched.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub file: String,
    #[serde(rename = "statusText")]
    pub status_text: String,
}

/// Same id, different path: the incoming record was dropped.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DuplicatedKey {
    pub file: String,
    pub key: String,
}

/// Same path, different id: informational, the record was still inserted.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DuplicatedPath {
    pub file: String,
    pub path: String,
}

/// Flat resource list plus everything that went wrong producing it.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub resources: Vec<ResourceRecord>,
    pub errors: Vec<FetchFailure>,
    pub duplicated_keys: Vec<DuplicatedKey>,
    pub duplicated_paths: Vec<DuplicatedPath>,
}

impl ExtractionResult {
    /// Whether any conflict was found that the manifest author must fix.
    pub fn has_conflicts(&self) -> bool {
        !self.duplicated_keys.is_empty()
    }
}

/// Position lookups over the growing resource list.
#[derive(Default)]
struct WorkIndex {
    by_id: FxHashMap<String, usize>,
    by_path: FxHashMap<String, usize>,
}

impl WorkIndex {
    fn note(&mut self, record: &ResourceRecord, pos: usize) {
        self.by_id.entry(record.id.clone()).or_insert(pos);
        self.by_path.entry(record.path.clone()).or_insert(pos);
    }
}

/// Resolves packages and layouts into a flat resource list.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestExtractor {
    scanner: LayoutScanner,
}

impl Default for ManifestExtractor {
    fn default() -> Self {
        Self::from_config(&LoaderConfig::default())
    }
}

impl ManifestExtractor {
    pub fn new(scanner: LayoutScanner) -> Self {
        ManifestExtractor { scanner }
    }

    /// Extractor using the configured path templates.
    pub fn from_config(config: &LoaderConfig) -> Self {
        Self::new(LayoutScanner::new(
            config.internal_root.clone(),
            config.font_base.clone(),
        ))
    }

    /// Expand `manifest` into a flat, id-unique resource list.
    ///
    /// Consumed PACKAGE entries stay in the list; loaders skip them.
    pub async fn extract<F: ManifestFetch>(
        &self,
        manifest: &[ResourceRecord],
        fetch: &mut F,
    ) -> ExtractionResult {
        let mut result = ExtractionResult {
            resources: manifest.to_vec(),
            ..ExtractionResult::default()
        };
        let mut index = WorkIndex::default();
        for (pos, record) in result.resources.iter().enumerate() {
            index.note(record, pos);
        }

        let mut cursor = 0;
        while cursor < result.resources.len() {
            let entry = result.resources[cursor].clone();
            cursor += 1;

            if entry.kind == ResourceType::Package {
                let records = match fetch.fetch(&entry.id, &entry.path).await {
                    Ok(payload) => serde_json::from_value::<Vec<ResourceRecord>>(payload)
                        .map_err(|e| format!("Invalid package: {}", e)),
                    Err(status) => Err(status),
                };
                match records {
                    Ok(records) => {
                        debug!("Package {} yields {} records", entry.path, records.len());
                        merge_package(&mut result, &mut index, &entry.path, records);
                    }
                    Err(status) => record_failure(&mut result, &entry.path, status),
                }
            } else if entry.is_layout() {
                match fetch.fetch(&entry.id, &entry.path).await {
                    Ok(layout) => {
                        let records = self.scanner.scan(&layout, entry.category);
                        debug!("Layout {} references {} assets", entry.path, records.len());
                        merge_layout(&mut result, &mut index, records);
                    }
                    Err(status) => record_failure(&mut result, &entry.path, status),
                }
            }
        }

        result
    }
}

fn record_failure(result: &mut ExtractionResult, file: &str, status_text: String) {
    warn!("Can not resolve {}: {}", file, status_text);
    result.errors.push(FetchFailure {
        file: file.to_string(),
        status_text,
    });
}

fn insert(result: &mut ExtractionResult, index: &mut WorkIndex, record: ResourceRecord) {
    index.note(&record, result.resources.len());
    result.resources.push(record);
}

fn merge_package(
    result: &mut ExtractionResult,
    index: &mut WorkIndex,
    file: &str,
    records: Vec<ResourceRecord>,
) {
    for record in records {
        if let Some(&pos) = index.by_id.get(&record.id) {
            let existing = &mut result.resources[pos];
            if existing.path != record.path {
                warn!("duplicated key {} in {}", record.id, file);
                result.duplicated_keys.push(DuplicatedKey {
                    file: file.to_string(),
                    key: record.id,
                });
            } else {
                existing.category = existing.category.merge(record.category);
            }
            continue;
        }

        if index.by_path.contains_key(&record.path) {
            debug!("duplicated path {} in {}", record.path, file);
            result.duplicated_paths.push(DuplicatedPath {
                file: file.to_string(),
                path: record.path.clone(),
            });
        }
        insert(result, index, record);
    }
}

fn merge_layout(result: &mut ExtractionResult, index: &mut WorkIndex, records: Vec<ResourceRecord>) {
    for record in records {
        match index.by_id.get(&record.id) {
            Some(&pos) => {
                let existing = &mut result.resources[pos];
                existing.category = existing.category.merge(record.category);
            }
            None => insert(result, index, record),
        }
    }
}
