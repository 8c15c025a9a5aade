//! Store option types
//!
//! Options accepted by [`DocumentStore::find`](super::DocumentStore::find):
//! - `SortSpec`: field + direction
//! - `FindOptions`: sort, limit and skip, passed to the store unchanged

use bson::Document;
use serde::{Deserialize, Serialize};

/// Sort direction for a single field
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// MongoDB sort value (1 or -1)
    pub fn as_i32(&self) -> i32 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }
}

/// Sort on one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Sort document in MongoDB form, e.g. `{"_id": 1}`
    pub fn to_document(&self) -> Document {
        let mut sort = Document::new();
        sort.insert(self.field.clone(), self.direction.as_i32());
        sort
    }
}

/// Options for a `find` call
///
/// `limit` and `skip` are not interpreted by this crate; they go to the store
/// exactly as given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub sort: Option<SortSpec>,
    pub limit: Option<i64>,
    pub skip: Option<u64>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Page through results with optional limit and skip
    pub fn page(limit: Option<i64>, skip: Option<u64>) -> Self {
        Self {
            sort: None,
            limit,
            skip,
        }
    }
}
