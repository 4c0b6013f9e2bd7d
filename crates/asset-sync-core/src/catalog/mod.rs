pub mod sqlite;

use crate::error::Error;
use serde::{Deserialize, Serialize};

pub use sqlite::SqliteCatalog;

/// A product as the catalog store knows it. The pipeline only reads `name` and
/// `images`; it never writes a record back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl CatalogRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, images: Vec<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            images,
        }
    }

    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }
}

/// Read access to active catalog records.
///
/// An `Err` means the store could not be queried at all and is fatal for the
/// calling tool.
pub trait CatalogSource {
    fn active_records(&self) -> Result<Vec<CatalogRecord>, Error>;
}

/// Fixed, in-memory record set.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    records: Vec<CatalogRecord>,
}

impl StaticCatalog {
    pub fn new(records: Vec<CatalogRecord>) -> Self {
        Self { records }
    }
}

impl CatalogSource for StaticCatalog {
    fn active_records(&self) -> Result<Vec<CatalogRecord>, Error> {
        Ok(self.records.clone())
    }
}
