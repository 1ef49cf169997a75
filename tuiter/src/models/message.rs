use bson::doc;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::TuiterError;
use crate::models::user::User;
use crate::store::{Model, Store};
use crate::utils::defaults::new_id;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "_id", default = "new_id")]
    pub id: String,
    pub message_text: String,
    pub from: String,
    pub to: String,
    #[serde(default = "Utc::now")]
    pub sent_on: DateTime<Utc>,
}

impl Model for Message {
    const COLLECTION: &'static str = "messages";
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub message_text: String,
}

impl Message {
    pub async fn find_all(store: &Store) -> Result<Vec<Message>, TuiterError> {
        store.find(doc! {}).await
    }

    pub async fn find_by_id(store: &Store, id: &str) -> Result<Message, TuiterError> {
        store
            .find_one(doc! { "_id": id })
            .await?
            .ok_or_else(|| TuiterError::NotFound(format!("message {} not found", id)))
    }

    pub async fn sent_by(store: &Store, user_id: &str) -> Result<Vec<Message>, TuiterError> {
        store.find(doc! { "from": user_id }).await
    }

    pub async fn received_by(store: &Store, user_id: &str) -> Result<Vec<Message>, TuiterError> {
        store.find(doc! { "to": user_id }).await
    }

    pub async fn send(store: &Store, from: &str, to: &str, body: &NewMessage) -> Result<Message, TuiterError> {
        if body.message_text.trim().is_empty() {
            return Err(TuiterError::ValidationError((
                "messageText".to_string(),
                "can't be blank".to_string(),
            )));
        }

        User::find_by_id(store, from).await?;
        User::find_by_id(store, to).await?;

        let message = Message {
            id: new_id(),
            message_text: body.message_text.clone(),
            from: from.to_string(),
            to: to.to_string(),
            sent_on: Utc::now(),
        };

        store.insert_one(&message).await?;

        Ok(message)
    }

    /// Only the sender can remove a message; anything else removes nothing.
    pub async fn delete(store: &Store, sender_id: &str, id: &str) -> Result<u64, TuiterError> {
        store
            .delete_many::<Message>(doc! { "_id": id, "from": sender_id })
            .await
    }
}
