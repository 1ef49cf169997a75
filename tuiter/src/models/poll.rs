use bson::doc;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::MIN_POLL_OPTIONS;
use crate::errors::TuiterError;
use crate::models::poll_response::PollResponse;
use crate::models::user::{ShowUser, User};
use crate::store::{Model, Store};
use crate::utils::defaults::new_id;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    #[serde(rename = "_id", default = "new_id")]
    pub id: String,
    pub poll_question: String,
    pub poll_options: Vec<String>,
    #[serde(default = "Utc::now")]
    pub posted_on: DateTime<Utc>,
    pub created_by: String,
    #[serde(default)]
    pub closed: bool,
}

impl Model for Poll {
    const COLLECTION: &'static str = "polls";
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewPoll {
    pub poll_question: String,
    pub poll_options: Vec<String>,
}

impl NewPoll {
    fn validate(&self) -> Result<(), TuiterError> {
        if self.poll_question.trim().is_empty() {
            return Err(TuiterError::ValidationError((
                "pollQuestion".to_string(),
                "can't be blank".to_string(),
            )));
        }

        if self.poll_options.len() < MIN_POLL_OPTIONS {
            return Err(TuiterError::ValidationError((
                "pollOptions".to_string(),
                format!("needs at least {} options", MIN_POLL_OPTIONS),
            )));
        }

        if self.poll_options.iter().any(|o| o.trim().is_empty()) {
            return Err(TuiterError::ValidationError((
                "pollOptions".to_string(),
                "can't contain blank options".to_string(),
            )));
        }

        Ok(())
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedPoll {
    #[serde(rename = "_id")]
    pub id: String,
    pub poll_question: String,
    pub poll_options: Vec<String>,
    pub posted_on: DateTime<Utc>,
    pub created_by: Option<ShowUser>,
    pub closed: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct OptionTally {
    pub option: String,
    pub votes: u64,
}

/// Votes per option, counted from the responses at read time.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PollTally {
    pub poll_id: String,
    pub closed: bool,
    pub options: Vec<OptionTally>,
    pub total: u64,
}

impl Poll {
    pub async fn find_by_id(store: &Store, id: &str) -> Result<Poll, TuiterError> {
        store
            .find_one(doc! { "_id": id })
            .await?
            .ok_or_else(|| TuiterError::NotFound(format!("poll {} not found", id)))
    }

    pub async fn find_all(store: &Store) -> Result<Vec<PopulatedPoll>, TuiterError> {
        let polls: Vec<Poll> = store.find(doc! {}).await?;

        Poll::populate(store, polls).await
    }

    pub async fn find_by_creator(store: &Store, user_id: &str) -> Result<Vec<PopulatedPoll>, TuiterError> {
        let polls: Vec<Poll> = store.find(doc! { "createdBy": user_id }).await?;

        Poll::populate(store, polls).await
    }

    pub async fn find_populated(store: &Store, id: &str) -> Result<PopulatedPoll, TuiterError> {
        let poll = Poll::find_by_id(store, id).await?;
        let mut populated = Poll::populate(store, vec![poll]).await?;

        populated
            .pop()
            .ok_or_else(|| TuiterError::NotFound(format!("poll {} not found", id)))
    }

    async fn populate(store: &Store, polls: Vec<Poll>) -> Result<Vec<PopulatedPoll>, TuiterError> {
        let creator_ids = polls.iter().map(|p| p.created_by.clone()).collect();
        let creators = User::find_by_ids(store, creator_ids).await?;

        let populated = polls
            .into_iter()
            .map(|p| PopulatedPoll {
                created_by: creators.get(&p.created_by).cloned(),
                id: p.id,
                poll_question: p.poll_question,
                poll_options: p.poll_options,
                posted_on: p.posted_on,
                closed: p.closed,
            })
            .collect();

        Ok(populated)
    }

    pub async fn create(store: &Store, user_id: &str, new_poll: &NewPoll) -> Result<Poll, TuiterError> {
        new_poll.validate()?;
        User::find_by_id(store, user_id).await?;

        let poll = Poll {
            id: new_id(),
            poll_question: new_poll.poll_question.clone(),
            poll_options: new_poll.poll_options.clone(),
            posted_on: Utc::now(),
            created_by: user_id.to_string(),
            closed: false,
        };

        store.insert_one(&poll).await?;

        Ok(poll)
    }

    async fn find_owned(store: &Store, user_id: &str, id: &str, action: &str) -> Result<Poll, TuiterError> {
        let poll = Poll::find_by_id(store, id).await?;

        if poll.created_by != user_id {
            return Err(TuiterError::Forbidden(format!("Only creator can {} poll", action)));
        }

        Ok(poll)
    }

    pub async fn close(store: &Store, user_id: &str, id: &str) -> Result<Poll, TuiterError> {
        Poll::find_owned(store, user_id, id, "close").await?;

        store
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": { "closed": true } })
            .await?
            .ok_or_else(|| TuiterError::NotFound(format!("poll {} not found", id)))
    }

    /// Responses to the poll are kept.
    pub async fn delete(store: &Store, user_id: &str, id: &str) -> Result<u64, TuiterError> {
        Poll::find_owned(store, user_id, id, "delete").await?;

        store.delete_many::<Poll>(doc! { "_id": id }).await
    }

    pub async fn tally(store: &Store, id: &str) -> Result<PollTally, TuiterError> {
        let poll = Poll::find_by_id(store, id).await?;
        let responses = PollResponse::find_by_poll(store, id).await?;

        let mut options: Vec<OptionTally> = poll
            .poll_options
            .iter()
            .map(|option| OptionTally {
                option: option.clone(),
                votes: 0,
            })
            .collect();

        for response in &responses {
            let tally = usize::try_from(response.chosen_option)
                .ok()
                .and_then(|i| options.get_mut(i));

            if let Some(tally) = tally {
                tally.votes += 1;
            }
        }

        Ok(PollTally {
            poll_id: poll.id,
            closed: poll.closed,
            total: options.iter().map(|o| o.votes).sum(),
            options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::poll_response::ChosenOption;
    use crate::test_support::{create_poll, create_user, memory_store};

    #[tokio::test]
    async fn create_validates_question_and_options() {
        let store = memory_store();
        let alice = create_user(&store, "alice").await;

        let too_few = NewPoll {
            poll_question: "Tabs?".to_string(),
            poll_options: vec!["yes".to_string()],
        };
        let err = Poll::create(&store, &alice.id, &too_few).await.unwrap_err();
        assert!(matches!(err, TuiterError::ValidationError(_)));

        let blank = NewPoll {
            poll_question: " ".to_string(),
            poll_options: vec!["yes".to_string(), "no".to_string()],
        };
        let err = Poll::create(&store, &alice.id, &blank).await.unwrap_err();
        assert!(matches!(err, TuiterError::ValidationError(_)));
    }

    #[tokio::test]
    async fn only_the_creator_closes_or_deletes() {
        let store = memory_store();
        let alice = create_user(&store, "alice").await;
        let bob = create_user(&store, "bob").await;
        let poll = create_poll(&store, &alice.id, "Tabs or spaces?", &["tabs", "spaces"]).await;

        let err = Poll::close(&store, &bob.id, &poll.id).await.unwrap_err();
        assert!(matches!(err, TuiterError::Forbidden(_)));
        let err = Poll::delete(&store, &bob.id, &poll.id).await.unwrap_err();
        assert!(matches!(err, TuiterError::Forbidden(_)));

        let closed = Poll::close(&store, &alice.id, &poll.id).await.unwrap();
        assert!(closed.closed);

        assert_eq!(Poll::delete(&store, &alice.id, &poll.id).await.unwrap(), 1);
        let err = Poll::close(&store, &alice.id, &poll.id).await.unwrap_err();
        assert!(matches!(err, TuiterError::NotFound(_)));
    }

    #[tokio::test]
    async fn tally_counts_current_choices() {
        let store = memory_store();
        let alice = create_user(&store, "alice").await;
        let bob = create_user(&store, "bob").await;
        let carol = create_user(&store, "carol").await;
        let poll = create_poll(&store, &alice.id, "Tabs or spaces?", &["tabs", "spaces"]).await;

        for (user, option) in [(&alice, 0), (&bob, 1), (&carol, 1)] {
            PollResponse::toggle(&store, &user.id, &poll.id, &ChosenOption { chosen_option: option })
                .await
                .unwrap();
        }
        // bob switches to tabs
        PollResponse::toggle(&store, &bob.id, &poll.id, &ChosenOption { chosen_option: 0 })
            .await
            .unwrap();

        let tally = Poll::tally(&store, &poll.id).await.unwrap();
        assert_eq!(tally.total, 3);
        assert_eq!(
            tally.options.iter().map(|o| o.votes).collect::<Vec<_>>(),
            vec![2, 1]
        );
    }
}
