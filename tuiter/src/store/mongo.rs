use bson::{doc, Document};
use futures::TryStreamExt;
use log::info;
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};

use crate::errors::TuiterError;
use crate::store::Model;

#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub async fn connect(url: &str, db_name: &str) -> Result<Self, TuiterError> {
        // fail fast instead of hanging on an unreachable server
        let url = if url.contains('?') {
            format!("{}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", url)
        } else {
            format!("{}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", url)
        };

        let client = Client::with_uri_str(&url).await?;
        let db = client.database(db_name);

        db.run_command(doc! { "ping": 1 }).await?;

        info!("Connected to MongoDB database '{}'", db_name);

        Ok(Self { db })
    }

    fn collection<M: Model>(&self) -> Collection<M> {
        self.db.collection::<M>(M::COLLECTION)
    }

    pub async fn insert_one<M: Model>(&self, model: &M) -> Result<(), TuiterError> {
        self.collection::<M>().insert_one(model).await?;

        Ok(())
    }

    pub async fn find_one<M: Model>(&self, filter: Document) -> Result<Option<M>, TuiterError> {
        let res = self.collection::<M>().find_one(filter).await?;

        Ok(res)
    }

    pub async fn find<M: Model>(&self, filter: Document) -> Result<Vec<M>, TuiterError> {
        let cursor = self.collection::<M>().find(filter).await?;
        let res: Vec<M> = cursor.try_collect().await?;

        Ok(res)
    }

    pub async fn count<M: Model>(&self, filter: Document) -> Result<u64, TuiterError> {
        let count = self.collection::<M>().count_documents(filter).await?;

        Ok(count)
    }

    pub async fn update_one<M: Model>(&self, filter: Document, update: Document) -> Result<bool, TuiterError> {
        let res = self.collection::<M>().update_one(filter, update).await?;

        Ok(res.matched_count > 0)
    }

    pub async fn find_one_and_update<M: Model>(
        &self,
        filter: Document,
        update: Document,
    ) -> Result<Option<M>, TuiterError> {
        let res = self
            .collection::<M>()
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await?;

        Ok(res)
    }

    pub async fn delete_one<M: Model>(&self, filter: Document) -> Result<bool, TuiterError> {
        let res = self.collection::<M>().delete_one(filter).await?;

        Ok(res.deleted_count > 0)
    }

    pub async fn delete_many<M: Model>(&self, filter: Document) -> Result<u64, TuiterError> {
        let res = self.collection::<M>().delete_many(filter).await?;

        Ok(res.deleted_count)
    }

    pub async fn ensure_indexes<M: Model>(&self) -> Result<(), TuiterError> {
        for keys in M::UNIQUE_INDEXES {
            let mut index_keys = Document::new();
            for key in keys.iter() {
                index_keys.insert(*key, 1);
            }

            let index = IndexModel::builder()
                .keys(index_keys)
                .options(IndexOptions::builder().unique(true).build())
                .build();

            self.collection::<M>().create_index(index).await?;
        }

        Ok(())
    }
}
