//! Resource catalog: the record store specialised to [`ResourceRecord`].
//!
//! Holds every resource the game knows about and answers the category/type
//! queries the boot sequence and loaders need.

use std::ops::{Deref, DerefMut};
use std::path::Path;

use log::info;

use crate::resources::masterregistry::Master;
use crate::resources::recordstore::RecordStore;
use crate::resources::resourcerecord::{ResourceCategory, ResourceRecord, ResourceType};

/// Catalog of known resources, registered in the
/// [`MasterRegistry`](crate::resources::masterregistry::MasterRegistry) as
/// `"resource"`.
#[derive(Debug, Default, Clone)]
pub struct ResourceCatalog {
    store: RecordStore<ResourceRecord>,
}

impl Master for ResourceCatalog {
    const NAME: &'static str = "resource";
}

impl Deref for ResourceCatalog {
    type Target = RecordStore<ResourceRecord>;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

impl DerefMut for ResourceCatalog {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.store
    }
}

impl ResourceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records whose category is one of `categories`, in catalog order.
    pub fn get_by_category(&self, categories: &[ResourceCategory]) -> Vec<ResourceRecord> {
        self.get_all()
            .iter()
            .filter(|r| categories.contains(&r.category))
            .cloned()
            .collect()
    }

    /// Records of exactly `kind`, in catalog order.
    pub fn get_by_type(&self, kind: ResourceType) -> Vec<ResourceRecord> {
        self.get_all()
            .iter()
            .filter(|r| r.kind == kind)
            .cloned()
            .collect()
    }

    /// Parse a manifest array and store every record.
    ///
    /// Returns the number of records accepted; duplicates are logged by the
    /// underlying store and skipped.
    pub fn load_json_str(&mut self, json: &str) -> Result<usize, String> {
        let records: Vec<ResourceRecord> =
            serde_json::from_str(json).map_err(|e| format!("Invalid manifest: {}", e))?;
        let accepted = records
            .into_iter()
            .map(|record| self.store.store(record))
            .filter(|accepted| *accepted)
            .count();
        Ok(accepted)
    }

    /// [`load_json_str`](Self::load_json_str) on the contents of a file.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<usize, String> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read manifest {:?}: {}", path, e))?;
        let accepted = self.load_json_str(&json)?;
        info!("Loaded {} resource records from {:?}", accepted, path);
        Ok(accepted)
    }
}
