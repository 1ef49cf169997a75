use bson::doc;
use serde::{Deserialize, Serialize};

use crate::errors::TuiterError;
use crate::models::tuit::{PopulatedTuit, Tuit};
use crate::models::user::{ShowUser, User};
use crate::store::{Model, Store};
use crate::utils::defaults::new_id;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    #[serde(rename = "_id", default = "new_id")]
    pub id: String,
    pub bookmarked_tuit: String,
    pub bookmarked_by: String,
}

impl Model for Bookmark {
    const COLLECTION: &'static str = "bookmarks";
    const UNIQUE_INDEXES: &'static [&'static [&'static str]] = &[&["bookmarkedTuit", "bookmarkedBy"]];
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedBookmark {
    #[serde(rename = "_id")]
    pub id: String,
    pub bookmarked_tuit: Option<PopulatedTuit>,
    pub bookmarked_by: Option<ShowUser>,
}

impl Bookmark {
    pub async fn find_all(store: &Store) -> Result<Vec<PopulatedBookmark>, TuiterError> {
        let bookmarks: Vec<Bookmark> = store.find(doc! {}).await?;

        Bookmark::populate(store, bookmarks).await
    }

    pub async fn find_populated(store: &Store, id: &str) -> Result<PopulatedBookmark, TuiterError> {
        let bookmark: Bookmark = store
            .find_one(doc! { "_id": id })
            .await?
            .ok_or_else(|| TuiterError::NotFound(format!("bookmark {} not found", id)))?;

        let mut populated = Bookmark::populate(store, vec![bookmark]).await?;

        populated
            .pop()
            .ok_or_else(|| TuiterError::NotFound(format!("bookmark {} not found", id)))
    }

    async fn populate(store: &Store, bookmarks: Vec<Bookmark>) -> Result<Vec<PopulatedBookmark>, TuiterError> {
        let tuit_ids: Vec<String> = bookmarks.iter().map(|b| b.bookmarked_tuit.clone()).collect();
        let user_ids: Vec<String> = bookmarks.iter().map(|b| b.bookmarked_by.clone()).collect();

        let tuits = Tuit::find_populated_by_ids(store, &tuit_ids).await?;
        let users = User::find_by_ids(store, user_ids).await?;

        let populated = bookmarks
            .into_iter()
            .map(|b| PopulatedBookmark {
                bookmarked_tuit: tuits.iter().find(|t| t.id == b.bookmarked_tuit).cloned(),
                bookmarked_by: users.get(&b.bookmarked_by).cloned(),
                id: b.id,
            })
            .collect();

        Ok(populated)
    }

    pub async fn create(store: &Store, user_id: &str, tuit_id: &str) -> Result<Bookmark, TuiterError> {
        Tuit::find_by_id(store, tuit_id).await?;

        let bookmark = Bookmark {
            id: new_id(),
            bookmarked_tuit: tuit_id.to_string(),
            bookmarked_by: user_id.to_string(),
        };

        store.insert_one(&bookmark).await?;

        Ok(bookmark)
    }

    pub async fn delete(store: &Store, user_id: &str, tuit_id: &str) -> Result<u64, TuiterError> {
        store
            .delete_many::<Bookmark>(doc! { "bookmarkedTuit": tuit_id, "bookmarkedBy": user_id })
            .await
    }

    /// Tuits bookmarked by the user, skipping the ones deleted since.
    pub async fn tuits_bookmarked_by(store: &Store, user_id: &str) -> Result<Vec<PopulatedTuit>, TuiterError> {
        let bookmarks: Vec<Bookmark> = store.find(doc! { "bookmarkedBy": user_id }).await?;
        let tuit_ids: Vec<String> = bookmarks.into_iter().map(|b| b.bookmarked_tuit).collect();

        Tuit::find_populated_by_ids(store, &tuit_ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_tuit, create_user, memory_store};

    #[tokio::test]
    async fn bookmarks_are_unique_per_user_and_tuit() {
        let store = memory_store();
        let alice = create_user(&store, "alice").await;
        let tuit = create_tuit(&store, &alice.id, "keep this").await;

        Bookmark::create(&store, &alice.id, &tuit.id).await.unwrap();
        let err = Bookmark::create(&store, &alice.id, &tuit.id).await.unwrap_err();
        assert!(matches!(err, TuiterError::Conflict(_)));

        let err = Bookmark::create(&store, &alice.id, "missing").await.unwrap_err();
        assert!(matches!(err, TuiterError::NotFound(_)));
    }

    #[tokio::test]
    async fn lists_and_removes_bookmarks() {
        let store = memory_store();
        let alice = create_user(&store, "alice").await;
        let first = create_tuit(&store, &alice.id, "first").await;
        let second = create_tuit(&store, &alice.id, "second").await;

        let bookmark = Bookmark::create(&store, &alice.id, &first.id).await.unwrap();
        Bookmark::create(&store, &alice.id, &second.id).await.unwrap();

        let populated = Bookmark::find_populated(&store, &bookmark.id).await.unwrap();
        assert_eq!(populated.bookmarked_tuit.map(|t| t.tuit), Some("first".to_string()));
        assert_eq!(populated.bookmarked_by.map(|u| u.username), Some("alice".to_string()));

        Tuit::delete(&store, &second.id).await.unwrap();
        let tuits = Bookmark::tuits_bookmarked_by(&store, &alice.id).await.unwrap();
        assert_eq!(tuits.len(), 1);

        assert_eq!(Bookmark::delete(&store, &alice.id, &first.id).await.unwrap(), 1);
        assert!(Bookmark::tuits_bookmarked_by(&store, &alice.id).await.unwrap().is_empty());
    }
}
