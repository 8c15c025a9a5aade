//! In-Memory Store
//!
//! A [`DocumentStore`] holding collections in memory. It understands the
//! part of the MongoDB predicate language this crate emits:
//!
//! ```text
//! { field: literal }                       equality
//! { field: { $eq | $ne | $gt | $gte | $lt | $lte: value } }
//! { field: { $in: [values...] } }
//! ```
//!
//! Comparisons follow MongoDB type bracketing: numbers compare across
//! Double/Int32/Int64, other values only compare with the same BSON type.
//! Any other operator is rejected with [`StoreError::Command`].

use async_trait::async_trait;
use bson::{Bson, Document};
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::error::{StoreError, StoreResult};
use super::types::{FindOptions, SortDirection};
use super::DocumentStore;

/// Collections of documents held in memory, in insertion order
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with one pre-populated collection
    pub fn with_collection(name: impl Into<String>, documents: Vec<Document>) -> Self {
        let mut collections = HashMap::new();
        collections.insert(name.into(), documents);
        Self {
            collections: RwLock::new(collections),
        }
    }

    /// Append documents to a collection, creating it if needed
    pub async fn insert_many(&self, collection: &str, documents: impl IntoIterator<Item = Document>) {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
    }

    /// Number of documents in a collection
    pub async fn len(&self, collection: &str) -> usize {
        let collections = self.collections.read().await;
        collections.get(collection).map(Vec::len).unwrap_or(0)
    }

    async fn matching(&self, collection: &str, predicate: &Document) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut matched = Vec::new();
        for document in documents {
            if matches(document, predicate).map_err(|e| StoreError::command(collection, e))? {
                matched.push(document.clone());
            }
        }
        Ok(matched)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: &str,
        predicate: Document,
        options: FindOptions,
    ) -> StoreResult<Vec<Document>> {
        let mut documents = self.matching(collection, &predicate).await?;

        if let Some(sort) = &options.sort {
            documents.sort_by(|a, b| {
                let ordering = compare_for_sort(a.get(&sort.field), b.get(&sort.field));
                match sort.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        let skip = options.skip.unwrap_or(0) as usize;
        let documents = documents.into_iter().skip(skip);

        // MongoDB treats 0 as "no limit" and a negative limit as its absolute value
        Ok(match options.limit {
            Some(limit) if limit != 0 => documents.take(limit.unsigned_abs() as usize).collect(),
            _ => documents.collect(),
        })
    }

    async fn find_one(
        &self,
        collection: &str,
        predicate: Document,
    ) -> StoreResult<Option<Document>> {
        Ok(self.matching(collection, &predicate).await?.into_iter().next())
    }

    async fn count(&self, collection: &str, predicate: Document) -> StoreResult<u64> {
        Ok(self.matching(collection, &predicate).await?.len() as u64)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Check a document against a predicate
fn matches(document: &Document, predicate: &Document) -> Result<bool, String> {
    for (field, condition) in predicate {
        let value = document.get(field);

        let matched = match condition {
            Bson::Document(operators) if is_operator_document(operators) => {
                let mut all = true;
                for (operator, argument) in operators {
                    if !apply_operator(operator, value, argument)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            literal => value.map(|v| values_equal(v, literal)).unwrap_or(false),
        };

        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn is_operator_document(document: &Document) -> bool {
    !document.is_empty() && document.keys().all(|k| k.starts_with('$'))
}

fn apply_operator(operator: &str, value: Option<&Bson>, argument: &Bson) -> Result<bool, String> {
    let ordering = value.and_then(|v| compare_values(v, argument));

    Ok(match operator {
        "$eq" => value.map(|v| values_equal(v, argument)).unwrap_or(false),
        "$ne" => !value.map(|v| values_equal(v, argument)).unwrap_or(false),
        "$gt" => ordering == Some(Ordering::Greater),
        "$gte" => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        "$lt" => ordering == Some(Ordering::Less),
        "$lte" => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        "$in" => match argument {
            Bson::Array(candidates) => value
                .map(|v| candidates.iter().any(|c| values_equal(v, c)))
                .unwrap_or(false),
            other => return Err(format!("$in needs an array, got {:?}", other.element_type())),
        },
        other => return Err(format!("unsupported operator: {}", other)),
    })
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Double(v) => Some(*v),
        Bson::Int32(v) => Some(*v as f64),
        Bson::Int64(v) => Some(*v as f64),
        _ => None,
    }
}

/// Compare two values of the same BSON type bracket
fn compare_values(a: &Bson, b: &Bson) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return x.partial_cmp(&y);
    }

    match (a, b) {
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        (Bson::DateTime(x), Bson::DateTime(y)) => Some(x.cmp(y)),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => Some(x.bytes().cmp(&y.bytes())),
        (Bson::Timestamp(x), Bson::Timestamp(y)) => {
            Some((x.time, x.increment).cmp(&(y.time, y.increment)))
        }
        (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
        (Bson::Null, Bson::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

fn values_equal(a: &Bson, b: &Bson) -> bool {
    match compare_values(a, b) {
        Some(ordering) => ordering == Ordering::Equal,
        None => a == b,
    }
}

/// Missing values sort first; values of unrelated types keep their order
fn compare_for_sort(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
    }
}
