use std::sync::Arc;

use bson::{Bson, Document};
use dashmap::DashMap;
use tokio::task::yield_now;

use crate::errors::TuiterError;
use crate::store::Model;

/// In-process document store with the query semantics the models rely on.
///
/// Each collection sits behind its own map entry, so a single operation is atomic with
/// respect to every other operation on that collection. Sequences of operations are
/// not: every call first yields to the runtime, the same way a round trip to a database
/// server would.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<DashMap<&'static str, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_one<M: Model>(&self, model: &M) -> Result<(), TuiterError> {
        yield_now().await;

        let doc = bson::to_document(model)?;
        let mut collection = self.collections.entry(M::COLLECTION).or_default();

        let duplicate_id = collection.iter().any(|existing| existing.get("_id") == doc.get("_id"));
        if duplicate_id {
            return Err(TuiterError::Conflict(format!(
                "duplicate key in {}: _id",
                M::COLLECTION
            )));
        }

        for keys in M::UNIQUE_INDEXES {
            let duplicate = collection.iter().any(|existing| {
                keys.iter()
                    .all(|key| same_value(lookup(existing, key), lookup(&doc, key)))
            });

            if duplicate {
                return Err(TuiterError::Conflict(format!(
                    "duplicate key in {}: {}",
                    M::COLLECTION,
                    keys.join(", ")
                )));
            }
        }

        collection.push(doc);

        Ok(())
    }

    pub async fn find_one<M: Model>(&self, filter: Document) -> Result<Option<M>, TuiterError> {
        yield_now().await;

        let found = self
            .collections
            .get(M::COLLECTION)
            .and_then(|collection| collection.iter().find(|doc| matches(doc, &filter)).cloned());

        match found {
            Some(doc) => Ok(Some(bson::from_document(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn find<M: Model>(&self, filter: Document) -> Result<Vec<M>, TuiterError> {
        yield_now().await;

        let docs: Vec<Document> = match self.collections.get(M::COLLECTION) {
            Some(collection) => collection.iter().filter(|doc| matches(doc, &filter)).cloned().collect(),
            None => Vec::new(),
        };

        docs.into_iter()
            .map(|doc| bson::from_document(doc).map_err(TuiterError::from))
            .collect()
    }

    pub async fn count<M: Model>(&self, filter: Document) -> Result<u64, TuiterError> {
        yield_now().await;

        let count = self
            .collections
            .get(M::COLLECTION)
            .map(|collection| collection.iter().filter(|doc| matches(doc, &filter)).count())
            .unwrap_or(0);

        Ok(count as u64)
    }

    pub async fn update_one<M: Model>(&self, filter: Document, update: Document) -> Result<bool, TuiterError> {
        yield_now().await;

        Ok(self.apply_to_first::<M>(&filter, &update)?.is_some())
    }

    pub async fn find_one_and_update<M: Model>(
        &self,
        filter: Document,
        update: Document,
    ) -> Result<Option<M>, TuiterError> {
        yield_now().await;

        match self.apply_to_first::<M>(&filter, &update)? {
            Some(doc) => Ok(Some(bson::from_document(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn delete_one<M: Model>(&self, filter: Document) -> Result<bool, TuiterError> {
        yield_now().await;

        let Some(mut collection) = self.collections.get_mut(M::COLLECTION) else {
            return Ok(false);
        };

        match collection.iter().position(|doc| matches(doc, &filter)) {
            Some(idx) => {
                collection.remove(idx);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn delete_many<M: Model>(&self, filter: Document) -> Result<u64, TuiterError> {
        yield_now().await;

        let Some(mut collection) = self.collections.get_mut(M::COLLECTION) else {
            return Ok(0);
        };

        let before = collection.len();
        collection.retain(|doc| !matches(doc, &filter));

        Ok((before - collection.len()) as u64)
    }

    /// Updates the first match in place while holding the collection, returning the new document.
    fn apply_to_first<M: Model>(&self, filter: &Document, update: &Document) -> Result<Option<Document>, TuiterError> {
        let Some(mut collection) = self.collections.get_mut(M::COLLECTION) else {
            return Ok(None);
        };

        let Some(doc) = collection.iter_mut().find(|doc| matches(doc, filter)) else {
            return Ok(None);
        };

        let mut updated = doc.clone();
        apply_update(&mut updated, update)?;
        *doc = updated.clone();

        Ok(Some(updated))
    }
}

fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    match path.split_once('.') {
        Some((head, rest)) => match doc.get(head) {
            Some(Bson::Document(inner)) => lookup(inner, rest),
            _ => None,
        },
        None => doc.get(path),
    }
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(*v as f64),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

/// Equality the way the database compares: numbers by value regardless of width.
fn same_value(left: Option<&Bson>, right: Option<&Bson>) -> bool {
    match (left, right) {
        (Some(l), Some(r)) => match (as_number(l), as_number(r)) {
            (Some(l), Some(r)) => l == r,
            _ => l == r,
        },
        (None, None) => true,
        (None, Some(Bson::Null)) | (Some(Bson::Null), None) => true,
        _ => false,
    }
}

fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, expected)| {
        let actual = lookup(doc, key);

        match expected {
            Bson::Document(condition) if condition.contains_key("$in") => match condition.get("$in") {
                Some(Bson::Array(candidates)) => candidates.iter().any(|c| same_value(actual, Some(c))),
                _ => false,
            },
            _ => same_value(actual, Some(expected)),
        }
    })
}

fn apply_update(doc: &mut Document, update: &Document) -> Result<(), TuiterError> {
    for (operator, fields) in update {
        let Bson::Document(fields) = fields else {
            return Err(TuiterError::InternalServerError(format!(
                "update operator {} expects a document",
                operator
            )));
        };

        match operator.as_str() {
            "$set" => {
                for (path, value) in fields {
                    set_path(doc, path, value.clone());
                }
            }
            "$inc" => {
                for (path, delta) in fields {
                    let incremented = increment(lookup(doc, path), delta)?;
                    set_path(doc, path, incremented);
                }
            }
            _ => {
                return Err(TuiterError::InternalServerError(format!(
                    "unsupported update operator {}",
                    operator
                )))
            }
        }
    }

    Ok(())
}

fn increment(current: Option<&Bson>, delta: &Bson) -> Result<Bson, TuiterError> {
    let current = current.cloned().unwrap_or(Bson::Int32(0));

    let sum = match (&current, delta) {
        (Bson::Int32(a), Bson::Int32(b)) => Bson::Int32(a + b),
        (Bson::Int32(a), Bson::Int64(b)) => Bson::Int64(*a as i64 + b),
        (Bson::Int64(a), Bson::Int32(b)) => Bson::Int64(a + *b as i64),
        (Bson::Int64(a), Bson::Int64(b)) => Bson::Int64(a + b),
        _ => match (as_number(&current), as_number(delta)) {
            (Some(a), Some(b)) => Bson::Double(a + b),
            _ => {
                return Err(TuiterError::InternalServerError(format!(
                    "cannot $inc {} by {}",
                    current, delta
                )))
            }
        },
    };

    Ok(sum)
}

fn set_path(doc: &mut Document, path: &str, value: Bson) {
    match path.split_once('.') {
        Some((head, rest)) => {
            if !matches!(doc.get(head), Some(Bson::Document(_))) {
                doc.insert(head, Document::new());
            }

            if let Some(Bson::Document(inner)) = doc.get_mut(head) {
                set_path(inner, rest, value);
            }
        }
        None => {
            doc.insert(path, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    struct Counted {
        #[serde(rename = "_id")]
        id: String,
        owner: String,
        stats: CountedStats,
    }

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
    struct CountedStats {
        hits: i64,
    }

    impl Model for Counted {
        const COLLECTION: &'static str = "counted";
        const UNIQUE_INDEXES: &'static [&'static [&'static str]] = &[&["owner"]];
    }

    fn counted(id: &str, owner: &str) -> Counted {
        Counted {
            id: id.to_string(),
            owner: owner.to_string(),
            stats: CountedStats::default(),
        }
    }

    #[tokio::test]
    async fn filters_on_dotted_fields_and_in() {
        let store = MemoryStore::new();
        store.insert_one(&counted("1", "ann")).await.unwrap();
        store.insert_one(&counted("2", "bob")).await.unwrap();
        store.insert_one(&counted("3", "cid")).await.unwrap();

        let picked: Vec<Counted> = store
            .find(doc! { "_id": { "$in": ["1", "3", "9"] } })
            .await
            .unwrap();
        assert_eq!(picked.len(), 2);

        store
            .update_one::<Counted>(doc! { "_id": "2" }, doc! { "$set": { "stats.hits": 5_i64 } })
            .await
            .unwrap();
        let hit: Option<Counted> = store.find_one(doc! { "stats.hits": 5_i64 }).await.unwrap();
        assert_eq!(hit.map(|c| c.owner), Some("bob".to_string()));
    }

    #[tokio::test]
    async fn increments_nested_counters_and_returns_updated_document() {
        let store = MemoryStore::new();
        store.insert_one(&counted("1", "ann")).await.unwrap();

        for _ in 0..3 {
            store
                .update_one::<Counted>(doc! { "_id": "1" }, doc! { "$inc": { "stats.hits": 1_i64 } })
                .await
                .unwrap();
        }

        let updated: Counted = store
            .find_one_and_update(doc! { "_id": "1" }, doc! { "$inc": { "stats.hits": -1_i64 } })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.stats.hits, 2);
    }

    #[tokio::test]
    async fn rejects_unique_index_violations() {
        let store = MemoryStore::new();
        store.insert_one(&counted("1", "ann")).await.unwrap();

        let err = store.insert_one(&counted("2", "ann")).await.unwrap_err();
        assert!(matches!(err, TuiterError::Conflict(_)));

        let err = store.insert_one(&counted("1", "zed")).await.unwrap_err();
        assert!(matches!(err, TuiterError::Conflict(_)));

        assert_eq!(store.count::<Counted>(doc! {}).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn deletes_report_what_they_removed() {
        let store = MemoryStore::new();
        assert!(!store.delete_one::<Counted>(doc! { "_id": "1" }).await.unwrap());

        store.insert_one(&counted("1", "ann")).await.unwrap();
        store.insert_one(&counted("2", "bob")).await.unwrap();

        assert!(store.delete_one::<Counted>(doc! { "owner": "ann" }).await.unwrap());
        assert!(!store.delete_one::<Counted>(doc! { "owner": "ann" }).await.unwrap());
        assert_eq!(store.delete_many::<Counted>(doc! {}).await.unwrap(), 1);
    }
}
