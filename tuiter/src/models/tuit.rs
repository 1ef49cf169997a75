pub mod stats;

pub use stats::Stats;

use bson::doc;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::TuiterError;
use crate::models::user::{ShowUser, User};
use crate::store::{field, Model, Store};
use crate::utils::defaults::new_id;

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Tuit {
    #[serde(rename = "_id", default = "new_id")]
    pub id: String,

    pub tuit: String,

    #[serde(default = "Utc::now")]
    pub posted_on: DateTime<Utc>,

    pub created_by: String,

    #[serde(default)]
    pub stats: Stats,
}

impl Model for Tuit {
    const COLLECTION: &'static str = "tuits";
}

/// Body accepted when posting or editing a tuit.
#[derive(Deserialize, Debug, Clone)]
pub struct TuitText {
    pub tuit: String,
}

impl TuitText {
    fn validate(&self) -> Result<(), TuiterError> {
        if self.tuit.trim().is_empty() {
            return Err(TuiterError::ValidationError((
                "tuit".to_string(),
                "can't be blank".to_string(),
            )));
        }

        Ok(())
    }
}

/// Tuit with its author resolved. The author is `None` once the user is gone.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedTuit {
    #[serde(rename = "_id")]
    pub id: String,
    pub tuit: String,
    pub posted_on: DateTime<Utc>,
    pub created_by: Option<ShowUser>,
    pub stats: Stats,
}

impl Tuit {
    pub async fn find_by_id(store: &Store, id: &str) -> Result<Tuit, TuiterError> {
        store
            .find_one(doc! { "_id": id })
            .await?
            .ok_or_else(|| TuiterError::NotFound(format!("tuit {} not found", id)))
    }

    pub async fn find_all(store: &Store) -> Result<Vec<PopulatedTuit>, TuiterError> {
        let tuits: Vec<Tuit> = store.find(doc! {}).await?;

        Tuit::populate(store, tuits).await
    }

    pub async fn find_by_user(store: &Store, user_id: &str) -> Result<Vec<PopulatedTuit>, TuiterError> {
        let tuits: Vec<Tuit> = store.find(doc! { "createdBy": user_id }).await?;

        Tuit::populate(store, tuits).await
    }

    pub async fn find_populated(store: &Store, id: &str) -> Result<PopulatedTuit, TuiterError> {
        let tuit = Tuit::find_by_id(store, id).await?;
        let mut populated = Tuit::populate(store, vec![tuit]).await?;

        populated
            .pop()
            .ok_or_else(|| TuiterError::NotFound(format!("tuit {} not found", id)))
    }

    /// Fetches the given tuits in the order of `ids`. Ids with no tuit behind them are skipped.
    pub async fn find_populated_by_ids(store: &Store, ids: &[String]) -> Result<Vec<PopulatedTuit>, TuiterError> {
        let tuits: Vec<Tuit> = store.find(doc! { "_id": { "$in": ids.to_vec() } }).await?;
        let populated = Tuit::populate(store, tuits).await?;

        let ordered = ids
            .iter()
            .filter_map(|id| populated.iter().find(|t| &t.id == id).cloned())
            .collect();

        Ok(ordered)
    }

    async fn populate(store: &Store, tuits: Vec<Tuit>) -> Result<Vec<PopulatedTuit>, TuiterError> {
        let author_ids = tuits.iter().map(|t| t.created_by.clone()).collect();
        let authors = User::find_by_ids(store, author_ids).await?;

        let populated = tuits
            .into_iter()
            .map(|t| PopulatedTuit {
                created_by: authors.get(&t.created_by).cloned(),
                id: t.id,
                tuit: t.tuit,
                posted_on: t.posted_on,
                stats: t.stats,
            })
            .collect();

        Ok(populated)
    }

    pub async fn create(store: &Store, user_id: &str, text: &TuitText) -> Result<Tuit, TuiterError> {
        text.validate()?;
        User::find_by_id(store, user_id).await?;

        let tuit = Tuit {
            id: new_id(),
            tuit: text.tuit.clone(),
            posted_on: Utc::now(),
            created_by: user_id.to_string(),
            stats: Stats::default(),
        };

        store.insert_one(&tuit).await?;

        Ok(tuit)
    }

    /// Replaces the text only. Counters are owned by the engagement paths.
    pub async fn update_text(store: &Store, id: &str, text: &TuitText) -> Result<Tuit, TuiterError> {
        text.validate()?;

        store
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": { "tuit": text.tuit.as_str() } })
            .await?
            .ok_or_else(|| TuiterError::NotFound(format!("tuit {} not found", id)))
    }

    /// Engagement records pointing at the tuit are left behind.
    pub async fn delete(store: &Store, id: &str) -> Result<u64, TuiterError> {
        store.delete_many::<Tuit>(doc! { "_id": id }).await
    }

    /// Atomically moves one counter (`stats.likes`, `stats.dislikes`) by `delta`.
    pub async fn increment_counter(store: &Store, id: &str, counter: &str, delta: i64) -> Result<bool, TuiterError> {
        store
            .update_one::<Tuit>(doc! { "_id": id }, doc! { "$inc": field(counter, delta) })
            .await
    }

    /// Overwrites one counter with an absolute value.
    pub async fn set_counter(store: &Store, id: &str, counter: &str, value: i64) -> Result<bool, TuiterError> {
        store
            .update_one::<Tuit>(doc! { "_id": id }, doc! { "$set": field(counter, value) })
            .await
    }
}
