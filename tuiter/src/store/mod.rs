//! Document store seam.
//!
//! Every persisted type is a [`Model`] living in its own collection. [`Store`] is the
//! handle that the models use to reach their collection; it is cloned into every
//! request through `web::Data<App>` and dispatches to either MongoDB or the in-process
//! [`MemoryStore`].
//!
//! Filters are plain `bson` documents. Both backends understand equality on (dotted)
//! fields and `$in`; updates understand `$set` and `$inc`.

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use bson::{Bson, Document};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::TuiterError;

pub trait Model: Serialize + DeserializeOwned + Unpin + Send + Sync {
    const COLLECTION: &'static str;

    /// Compound keys that must stay unique across the collection.
    const UNIQUE_INDEXES: &'static [&'static [&'static str]] = &[];
}

/// Single-field document, used to build filters and updates with computed keys.
pub fn field(key: &str, value: impl Into<Bson>) -> Document {
    let mut doc = Document::new();
    doc.insert(key, value);

    doc
}

#[derive(Clone)]
pub enum Store {
    Memory(MemoryStore),
    Mongo(MongoStore),
}

impl Store {
    pub async fn insert_one<M: Model>(&self, model: &M) -> Result<(), TuiterError> {
        match self {
            Store::Memory(store) => store.insert_one(model).await,
            Store::Mongo(store) => store.insert_one(model).await,
        }
    }

    pub async fn find_one<M: Model>(&self, filter: Document) -> Result<Option<M>, TuiterError> {
        match self {
            Store::Memory(store) => store.find_one(filter).await,
            Store::Mongo(store) => store.find_one(filter).await,
        }
    }

    pub async fn find<M: Model>(&self, filter: Document) -> Result<Vec<M>, TuiterError> {
        match self {
            Store::Memory(store) => store.find(filter).await,
            Store::Mongo(store) => store.find(filter).await,
        }
    }

    pub async fn count<M: Model>(&self, filter: Document) -> Result<u64, TuiterError> {
        match self {
            Store::Memory(store) => store.count::<M>(filter).await,
            Store::Mongo(store) => store.count::<M>(filter).await,
        }
    }

    /// Applies `update` to the first matching document. Returns whether one matched.
    pub async fn update_one<M: Model>(&self, filter: Document, update: Document) -> Result<bool, TuiterError> {
        match self {
            Store::Memory(store) => store.update_one::<M>(filter, update).await,
            Store::Mongo(store) => store.update_one::<M>(filter, update).await,
        }
    }

    /// Atomically applies `update` to the first matching document and returns it as updated.
    pub async fn find_one_and_update<M: Model>(
        &self,
        filter: Document,
        update: Document,
    ) -> Result<Option<M>, TuiterError> {
        match self {
            Store::Memory(store) => store.find_one_and_update(filter, update).await,
            Store::Mongo(store) => store.find_one_and_update(filter, update).await,
        }
    }

    /// Removes the first matching document. Returns whether one was removed.
    pub async fn delete_one<M: Model>(&self, filter: Document) -> Result<bool, TuiterError> {
        match self {
            Store::Memory(store) => store.delete_one::<M>(filter).await,
            Store::Mongo(store) => store.delete_one::<M>(filter).await,
        }
    }

    pub async fn delete_many<M: Model>(&self, filter: Document) -> Result<u64, TuiterError> {
        match self {
            Store::Memory(store) => store.delete_many::<M>(filter).await,
            Store::Mongo(store) => store.delete_many::<M>(filter).await,
        }
    }

    pub async fn ensure_indexes<M: Model>(&self) -> Result<(), TuiterError> {
        match self {
            Store::Memory(_) => Ok(()),
            Store::Mongo(store) => store.ensure_indexes::<M>().await,
        }
    }
}
