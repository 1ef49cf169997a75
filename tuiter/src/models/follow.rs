use bson::doc;
use serde::{Deserialize, Serialize};

use crate::errors::TuiterError;
use crate::models::user::{ShowUser, User};
use crate::store::{Model, Store};
use crate::utils::defaults::new_id;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Follow {
    #[serde(rename = "_id", default = "new_id")]
    pub id: String,
    pub user_follower: String,
    pub user_following: String,
}

impl Model for Follow {
    const COLLECTION: &'static str = "follows";
    const UNIQUE_INDEXES: &'static [&'static [&'static str]] = &[&["userFollower", "userFollowing"]];
}

/// Follow with both ends resolved.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedFollow {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_follower: Option<ShowUser>,
    pub user_following: Option<ShowUser>,
}

impl Follow {
    pub async fn find_all(store: &Store) -> Result<Vec<Follow>, TuiterError> {
        store.find(doc! {}).await
    }

    pub async fn find_populated(store: &Store, id: &str) -> Result<PopulatedFollow, TuiterError> {
        let follow: Follow = store
            .find_one(doc! { "_id": id })
            .await?
            .ok_or_else(|| TuiterError::NotFound(format!("follow {} not found", id)))?;

        let mut users = User::find_by_ids(
            store,
            vec![follow.user_follower.clone(), follow.user_following.clone()],
        )
        .await?;

        Ok(PopulatedFollow {
            user_follower: users.get(&follow.user_follower).cloned(),
            user_following: users.remove(&follow.user_following),
            id: follow.id,
        })
    }

    pub async fn create(store: &Store, follower_id: &str, following_id: &str) -> Result<Follow, TuiterError> {
        if follower_id == following_id {
            return Err(TuiterError::ValidationError((
                "userFollowing".to_string(),
                "can't follow yourself".to_string(),
            )));
        }

        User::find_by_id(store, follower_id).await?;
        User::find_by_id(store, following_id).await?;

        let follow = Follow {
            id: new_id(),
            user_follower: follower_id.to_string(),
            user_following: following_id.to_string(),
        };

        store.insert_one(&follow).await?;

        Ok(follow)
    }

    pub async fn delete(store: &Store, follower_id: &str, following_id: &str) -> Result<u64, TuiterError> {
        store
            .delete_many::<Follow>(doc! { "userFollower": follower_id, "userFollowing": following_id })
            .await
    }

    /// Users following `user_id`.
    pub async fn followers(store: &Store, user_id: &str) -> Result<Vec<ShowUser>, TuiterError> {
        let follows: Vec<Follow> = store.find(doc! { "userFollowing": user_id }).await?;
        let ids: Vec<String> = follows.into_iter().map(|f| f.user_follower).collect();

        resolve_in_order(store, ids).await
    }

    /// Users `user_id` follows.
    pub async fn following(store: &Store, user_id: &str) -> Result<Vec<ShowUser>, TuiterError> {
        let follows: Vec<Follow> = store.find(doc! { "userFollower": user_id }).await?;
        let ids: Vec<String> = follows.into_iter().map(|f| f.user_following).collect();

        resolve_in_order(store, ids).await
    }
}

async fn resolve_in_order(store: &Store, ids: Vec<String>) -> Result<Vec<ShowUser>, TuiterError> {
    let mut users = User::find_by_ids(store, ids.clone()).await?;

    Ok(ids.iter().filter_map(|id| users.remove(id)).collect())
}
