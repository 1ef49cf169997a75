use bson::doc;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::TuiterError;
use crate::models::poll::Poll;
use crate::store::{Model, Store};
use crate::utils::defaults::new_id;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PollResponse {
    #[serde(rename = "_id", default = "new_id")]
    pub id: String,
    pub poll_id: String,
    pub responded_by: String,
    pub chosen_option: i64,
}

impl Model for PollResponse {
    const COLLECTION: &'static str = "pollresponses";
    const UNIQUE_INDEXES: &'static [&'static [&'static str]] = &[&["pollId", "respondedBy"]];
}

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct ChosenOption {
    pub chosen_option: i64,
}

impl PollResponse {
    pub async fn find_by_user(store: &Store, user_id: &str) -> Result<Vec<PollResponse>, TuiterError> {
        store.find(doc! { "respondedBy": user_id }).await
    }

    pub async fn find_by_poll(store: &Store, poll_id: &str) -> Result<Vec<PollResponse>, TuiterError> {
        store.find(doc! { "pollId": poll_id }).await
    }

    /// Loads the poll a response is about to touch. Closed polls and out of range
    /// options are rejected before any response is read or written.
    async fn open_poll(store: &Store, poll_id: &str, choice: Option<&ChosenOption>) -> Result<Poll, TuiterError> {
        let poll = Poll::find_by_id(store, poll_id).await?;

        if poll.closed {
            return Err(TuiterError::PollClosed);
        }

        if let Some(choice) = choice {
            let in_range = usize::try_from(choice.chosen_option).is_ok_and(|i| i < poll.poll_options.len());
            if !in_range {
                return Err(TuiterError::ValidationError((
                    "chosenOption".to_string(),
                    format!("must be below {}", poll.poll_options.len()),
                )));
            }
        }

        Ok(poll)
    }

    /// Records the user's choice, or moves an existing response to the new option.
    /// A response is never removed by toggling.
    pub async fn toggle(
        store: &Store,
        user_id: &str,
        poll_id: &str,
        choice: &ChosenOption,
    ) -> Result<PollResponse, TuiterError> {
        PollResponse::open_poll(store, poll_id, Some(choice)).await?;

        if let Some(updated) = PollResponse::update_choice(store, user_id, poll_id, choice).await? {
            debug!("poll {}: {} moved to option {}", poll_id, user_id, choice.chosen_option);

            return Ok(updated);
        }

        let response = PollResponse {
            id: new_id(),
            poll_id: poll_id.to_string(),
            responded_by: user_id.to_string(),
            chosen_option: choice.chosen_option,
        };

        match store.insert_one(&response).await {
            Ok(()) => Ok(response),
            // a concurrent first response won the insert; ours becomes an update
            Err(TuiterError::Conflict(_)) => PollResponse::update_choice(store, user_id, poll_id, choice)
                .await?
                .ok_or_else(|| TuiterError::Conflict(format!("response of {} to poll {} changed", user_id, poll_id))),
            Err(e) => Err(e),
        }
    }

    async fn update_choice(
        store: &Store,
        user_id: &str,
        poll_id: &str,
        choice: &ChosenOption,
    ) -> Result<Option<PollResponse>, TuiterError> {
        store
            .find_one_and_update(
                doc! { "pollId": poll_id, "respondedBy": user_id },
                doc! { "$set": { "chosenOption": choice.chosen_option } },
            )
            .await
    }

    /// Records a first response. Answering twice is a conflict.
    pub async fn create(
        store: &Store,
        user_id: &str,
        poll_id: &str,
        choice: &ChosenOption,
    ) -> Result<PollResponse, TuiterError> {
        PollResponse::open_poll(store, poll_id, Some(choice)).await?;

        let response = PollResponse {
            id: new_id(),
            poll_id: poll_id.to_string(),
            responded_by: user_id.to_string(),
            chosen_option: choice.chosen_option,
        };

        store.insert_one(&response).await?;

        Ok(response)
    }

    /// Withdraws a response while the poll is open. Responses to deleted polls can always go.
    pub async fn delete(store: &Store, user_id: &str, poll_id: &str) -> Result<u64, TuiterError> {
        match PollResponse::open_poll(store, poll_id, None).await {
            Ok(_) | Err(TuiterError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        store
            .delete_many::<PollResponse>(doc! { "pollId": poll_id, "respondedBy": user_id })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_poll, create_user, memory_store};

    fn choice(chosen_option: i64) -> ChosenOption {
        ChosenOption { chosen_option }
    }

    #[tokio::test]
    async fn second_toggle_updates_in_place() {
        let store = memory_store();
        let alice = create_user(&store, "alice").await;
        let poll = create_poll(&store, &alice.id, "Lunch?", &["pizza", "sushi", "salad"]).await;

        let first = PollResponse::toggle(&store, &alice.id, &poll.id, &choice(0)).await.unwrap();
        let second = PollResponse::toggle(&store, &alice.id, &poll.id, &choice(2)).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.chosen_option, 2);

        let responses = PollResponse::find_by_poll(&store, &poll.id).await.unwrap();
        assert_eq!(responses, vec![second]);
    }

    #[tokio::test]
    async fn closed_poll_rejects_toggles_and_keeps_responses() {
        let store = memory_store();
        let alice = create_user(&store, "alice").await;
        let bob = create_user(&store, "bob").await;
        let poll = create_poll(&store, &alice.id, "Lunch?", &["pizza", "sushi"]).await;

        PollResponse::toggle(&store, &bob.id, &poll.id, &choice(1)).await.unwrap();
        Poll::close(&store, &alice.id, &poll.id).await.unwrap();

        let err = PollResponse::toggle(&store, &bob.id, &poll.id, &choice(0)).await.unwrap_err();
        assert!(matches!(err, TuiterError::PollClosed));

        let err = PollResponse::toggle(&store, &alice.id, &poll.id, &choice(0)).await.unwrap_err();
        assert!(matches!(err, TuiterError::PollClosed));

        let err = PollResponse::delete(&store, &bob.id, &poll.id).await.unwrap_err();
        assert!(matches!(err, TuiterError::PollClosed));

        let responses = PollResponse::find_by_poll(&store, &poll.id).await.unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].chosen_option, 1);
    }

    #[tokio::test]
    async fn rejects_missing_poll_and_unknown_option() {
        let store = memory_store();
        let alice = create_user(&store, "alice").await;
        let poll = create_poll(&store, &alice.id, "Lunch?", &["pizza", "sushi"]).await;

        let err = PollResponse::toggle(&store, &alice.id, "missing", &choice(0)).await.unwrap_err();
        assert!(matches!(err, TuiterError::NotFound(_)));

        let err = PollResponse::toggle(&store, &alice.id, &poll.id, &choice(2)).await.unwrap_err();
        assert!(matches!(err, TuiterError::ValidationError(_)));

        let err = PollResponse::toggle(&store, &alice.id, &poll.id, &choice(-1)).await.unwrap_err();
        assert!(matches!(err, TuiterError::ValidationError(_)));

        assert!(PollResponse::find_by_poll(&store, &poll.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_first_responses_leave_one_record() {
        let store = memory_store();
        let alice = create_user(&store, "alice").await;
        let poll = create_poll(&store, &alice.id, "Lunch?", &["pizza", "sushi"]).await;

        let (pizza, sushi) = (choice(0), choice(1));
        let (a, b) = tokio::join!(
            PollResponse::toggle(&store, &alice.id, &poll.id, &pizza),
            PollResponse::toggle(&store, &alice.id, &poll.id, &sushi),
        );
        a.unwrap();
        b.unwrap();

        assert_eq!(PollResponse::find_by_user(&store, &alice.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn direct_create_conflicts_and_delete_withdraws() {
        let store = memory_store();
        let alice = create_user(&store, "alice").await;
        let poll = create_poll(&store, &alice.id, "Lunch?", &["pizza", "sushi"]).await;

        PollResponse::create(&store, &alice.id, &poll.id, &choice(0)).await.unwrap();
        let err = PollResponse::create(&store, &alice.id, &poll.id, &choice(1)).await.unwrap_err();
        assert!(matches!(err, TuiterError::Conflict(_)));

        assert_eq!(PollResponse::delete(&store, &alice.id, &poll.id).await.unwrap(), 1);
        assert!(PollResponse::find_by_user(&store, &alice.id).await.unwrap().is_empty());
    }
}
