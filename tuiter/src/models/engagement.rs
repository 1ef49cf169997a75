//! Toggling likes and dislikes on tuits.
//!
//! A like or dislike is a record naming a (user, tuit) pair. Each tuit keeps a
//! denormalized counter per engagement kind in its `stats`, and toggling is the only
//! path that moves that counter. How the counter is moved depends on [`CounterUpdate`]:
//!
//! - [`CounterUpdate::Atomic`]: the outcome of the record mutation decides the counter
//!   change, which is then applied with a single `$inc`. Concurrent toggles can not lose
//!   an update.
//! - [`CounterUpdate::ReadModifyWrite`]: reads the record and the counter, then writes
//!   both back. Two concurrent toggles on one tuit can read the same counter and one of
//!   the writes is lost. Kept for deployments that still run the legacy path; the
//!   reconciliation in [`crate::models::tuit::stats`] repairs what it breaks.

use bson::Document;
use log::debug;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::errors::TuiterError;
use crate::models::tuit::{PopulatedTuit, Stats, Tuit};
use crate::models::user::{ShowUser, User};
use crate::store::{field, Model, Store};

#[derive(Debug, Clone, Copy, PartialEq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum EngagementKind {
    Like,
    Dislike,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum CounterUpdate {
    #[default]
    Atomic,
    ReadModifyWrite,
}

/// State of the (user, tuit) pair after a toggle.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Toggled {
    Engaged,
    Withdrawn,
}

pub trait Engagement: Model {
    const KIND: EngagementKind;

    /// Dotted path of the counter on the tuit document.
    const COUNTER: &'static str;

    const TUIT_FIELD: &'static str;

    const USER_FIELD: &'static str;

    fn new(user_id: &str, tuit_id: &str) -> Self;

    fn tuit_id(&self) -> &str;

    fn user_id(&self) -> &str;

    fn stored_count(stats: &Stats) -> i64;
}

fn pair_filter<E: Engagement>(user_id: &str, tuit_id: &str) -> Document {
    let mut filter = field(E::TUIT_FIELD, tuit_id);
    filter.insert(E::USER_FIELD, user_id);

    filter
}

pub async fn toggle<E: Engagement>(
    store: &Store,
    mode: CounterUpdate,
    user_id: &str,
    tuit_id: &str,
) -> Result<Toggled, TuiterError> {
    let toggled = match mode {
        CounterUpdate::Atomic => toggle_atomic::<E>(store, user_id, tuit_id).await?,
        CounterUpdate::ReadModifyWrite => toggle_read_modify_write::<E>(store, user_id, tuit_id).await?,
    };

    debug!("{} on tuit {} by {}: {:?}", E::KIND, tuit_id, user_id, toggled);

    Ok(toggled)
}

async fn toggle_atomic<E: Engagement>(store: &Store, user_id: &str, tuit_id: &str) -> Result<Toggled, TuiterError> {
    Tuit::find_by_id(store, tuit_id).await?;

    if store.delete_one::<E>(pair_filter::<E>(user_id, tuit_id)).await? {
        Tuit::increment_counter(store, tuit_id, E::COUNTER, -1).await?;

        return Ok(Toggled::Withdrawn);
    }

    match store.insert_one(&E::new(user_id, tuit_id)).await {
        Ok(()) => {
            Tuit::increment_counter(store, tuit_id, E::COUNTER, 1).await?;

            Ok(Toggled::Engaged)
        }
        // a concurrent toggle by the same user inserted the record and owns the increment
        Err(TuiterError::Conflict(_)) => Ok(Toggled::Engaged),
        Err(e) => Err(e),
    }
}

async fn toggle_read_modify_write<E: Engagement>(
    store: &Store,
    user_id: &str,
    tuit_id: &str,
) -> Result<Toggled, TuiterError> {
    let existing: Option<E> = store.find_one(pair_filter::<E>(user_id, tuit_id)).await?;
    let tuit = Tuit::find_by_id(store, tuit_id).await?;
    let current = E::stored_count(&tuit.stats);

    let (toggled, next) = match existing {
        Some(_) => {
            store.delete_one::<E>(pair_filter::<E>(user_id, tuit_id)).await?;

            (Toggled::Withdrawn, current - 1)
        }
        None => {
            store.insert_one(&E::new(user_id, tuit_id)).await?;

            (Toggled::Engaged, current + 1)
        }
    };

    Tuit::set_counter(store, tuit_id, E::COUNTER, next).await?;

    Ok(toggled)
}

/// Records the engagement without touching the tuit's counter.
pub async fn engage<E: Engagement>(store: &Store, user_id: &str, tuit_id: &str) -> Result<E, TuiterError> {
    let record = E::new(user_id, tuit_id);
    store.insert_one(&record).await?;

    Ok(record)
}

/// Removes the engagement without touching the tuit's counter.
pub async fn withdraw<E: Engagement>(store: &Store, user_id: &str, tuit_id: &str) -> Result<u64, TuiterError> {
    store.delete_many::<E>(pair_filter::<E>(user_id, tuit_id)).await
}

pub async fn count_for<E: Engagement>(store: &Store, tuit_id: &str) -> Result<i64, TuiterError> {
    let count = store.count::<E>(field(E::TUIT_FIELD, tuit_id)).await?;

    Ok(count as i64)
}

/// Tuits the user engaged with. Records whose tuit was deleted are skipped.
pub async fn tuits_engaged_by<E: Engagement>(store: &Store, user_id: &str) -> Result<Vec<PopulatedTuit>, TuiterError> {
    let records: Vec<E> = store.find(field(E::USER_FIELD, user_id)).await?;
    let tuit_ids: Vec<String> = records.iter().map(|r| r.tuit_id().to_string()).collect();

    Tuit::find_populated_by_ids(store, &tuit_ids).await
}

/// Users that engaged with the tuit. Records whose user was deleted are skipped.
pub async fn users_engaged_with<E: Engagement>(store: &Store, tuit_id: &str) -> Result<Vec<ShowUser>, TuiterError> {
    let records: Vec<E> = store.find(field(E::TUIT_FIELD, tuit_id)).await?;
    let user_ids: Vec<String> = records.iter().map(|r| r.user_id().to_string()).collect();

    let mut users = User::find_by_ids(store, user_ids.clone()).await?;

    Ok(user_ids.iter().filter_map(|id| users.remove(id)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dislike::Dislike;
    use crate::models::like::Like;
    use crate::test_support::{create_tuit, create_user, memory_store};

    async fn likes_of(store: &Store, tuit_id: &str) -> (i64, i64) {
        let tuit = Tuit::find_by_id(store, tuit_id).await.unwrap();
        let records = count_for::<Like>(store, tuit_id).await.unwrap();

        (tuit.stats.likes, records)
    }

    #[tokio::test]
    async fn toggling_twice_restores_the_original_state() {
        for mode in [CounterUpdate::Atomic, CounterUpdate::ReadModifyWrite] {
            let store = memory_store();
            let alice = create_user(&store, "alice").await;
            let tuit = create_tuit(&store, &alice.id, "hello").await;

            let first = toggle::<Like>(&store, mode, &alice.id, &tuit.id).await.unwrap();
            assert_eq!(first, Toggled::Engaged);
            assert_eq!(likes_of(&store, &tuit.id).await, (1, 1));

            let second = toggle::<Like>(&store, mode, &alice.id, &tuit.id).await.unwrap();
            assert_eq!(second, Toggled::Withdrawn);
            assert_eq!(likes_of(&store, &tuit.id).await, (0, 0));
        }
    }

    #[tokio::test]
    async fn counter_follows_many_users() {
        let store = memory_store();
        let author = create_user(&store, "author").await;
        let tuit = create_tuit(&store, &author.id, "popular").await;

        let mut fans = Vec::new();
        for i in 0..5 {
            fans.push(create_user(&store, &format!("fan{}", i)).await);
        }

        for fan in &fans {
            toggle::<Like>(&store, CounterUpdate::Atomic, &fan.id, &tuit.id)
                .await
                .unwrap();
        }
        assert_eq!(likes_of(&store, &tuit.id).await, (5, 5));

        for fan in &fans {
            toggle::<Like>(&store, CounterUpdate::Atomic, &fan.id, &tuit.id)
                .await
                .unwrap();
        }
        assert_eq!(likes_of(&store, &tuit.id).await, (0, 0));
    }

    #[tokio::test]
    async fn likes_and_dislikes_keep_separate_counters() {
        let store = memory_store();
        let alice = create_user(&store, "alice").await;
        let bob = create_user(&store, "bob").await;
        let tuit = create_tuit(&store, &alice.id, "divisive").await;

        toggle::<Like>(&store, CounterUpdate::Atomic, &alice.id, &tuit.id)
            .await
            .unwrap();
        toggle::<Dislike>(&store, CounterUpdate::Atomic, &bob.id, &tuit.id)
            .await
            .unwrap();

        let stats = Tuit::find_by_id(&store, &tuit.id).await.unwrap().stats;
        assert_eq!((stats.likes, stats.dislikes), (1, 1));
    }

    #[tokio::test]
    async fn toggling_a_missing_tuit_is_not_found() {
        let store = memory_store();
        let alice = create_user(&store, "alice").await;

        for mode in [CounterUpdate::Atomic, CounterUpdate::ReadModifyWrite] {
            let err = toggle::<Like>(&store, mode, &alice.id, "missing").await.unwrap_err();
            assert!(matches!(err, TuiterError::NotFound(_)));
        }

        assert_eq!(count_for::<Like>(&store, "missing").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn read_modify_write_loses_concurrent_updates() {
        let store = memory_store();
        let alice = create_user(&store, "alice").await;
        let bob = create_user(&store, "bob").await;
        let tuit = create_tuit(&store, &alice.id, "race").await;

        let (a, b) = tokio::join!(
            toggle::<Like>(&store, CounterUpdate::ReadModifyWrite, &alice.id, &tuit.id),
            toggle::<Like>(&store, CounterUpdate::ReadModifyWrite, &bob.id, &tuit.id),
        );
        a.unwrap();
        b.unwrap();

        // both read a counter of 0 before either wrote it back
        assert_eq!(likes_of(&store, &tuit.id).await, (1, 2));
    }

    #[tokio::test]
    async fn atomic_toggles_do_not_lose_concurrent_updates() {
        let store = memory_store();
        let alice = create_user(&store, "alice").await;
        let bob = create_user(&store, "bob").await;
        let tuit = create_tuit(&store, &alice.id, "race").await;

        let (a, b) = tokio::join!(
            toggle::<Like>(&store, CounterUpdate::Atomic, &alice.id, &tuit.id),
            toggle::<Like>(&store, CounterUpdate::Atomic, &bob.id, &tuit.id),
        );
        assert_eq!(a.unwrap(), Toggled::Engaged);
        assert_eq!(b.unwrap(), Toggled::Engaged);
        assert_eq!(likes_of(&store, &tuit.id).await, (2, 2));

        let (a, b) = tokio::join!(
            toggle::<Like>(&store, CounterUpdate::Atomic, &alice.id, &tuit.id),
            toggle::<Like>(&store, CounterUpdate::Atomic, &bob.id, &tuit.id),
        );
        assert_eq!(a.unwrap(), Toggled::Withdrawn);
        assert_eq!(b.unwrap(), Toggled::Withdrawn);
        assert_eq!(likes_of(&store, &tuit.id).await, (0, 0));
    }

    #[tokio::test]
    async fn direct_engage_and_withdraw_leave_the_counter_alone() {
        let store = memory_store();
        let alice = create_user(&store, "alice").await;
        let tuit = create_tuit(&store, &alice.id, "direct").await;

        engage::<Like>(&store, &alice.id, &tuit.id).await.unwrap();
        assert_eq!(likes_of(&store, &tuit.id).await, (0, 1));

        let err = engage::<Like>(&store, &alice.id, &tuit.id).await.unwrap_err();
        assert!(matches!(err, TuiterError::Conflict(_)));

        assert_eq!(withdraw::<Like>(&store, &alice.id, &tuit.id).await.unwrap(), 1);
        assert_eq!(likes_of(&store, &tuit.id).await, (0, 0));
    }

    #[tokio::test]
    async fn listings_skip_orphaned_records() {
        let store = memory_store();
        let alice = create_user(&store, "alice").await;
        let bob = create_user(&store, "bob").await;
        let kept = create_tuit(&store, &alice.id, "kept").await;
        let gone = create_tuit(&store, &alice.id, "gone").await;

        for tuit in [&kept, &gone] {
            toggle::<Like>(&store, CounterUpdate::Atomic, &bob.id, &tuit.id)
                .await
                .unwrap();
        }
        toggle::<Like>(&store, CounterUpdate::Atomic, &alice.id, &kept.id)
            .await
            .unwrap();

        Tuit::delete(&store, &gone.id).await.unwrap();
        User::delete(&store, &alice.id).await.unwrap();

        let liked = tuits_engaged_by::<Like>(&store, &bob.id).await.unwrap();
        assert_eq!(liked.len(), 1);
        assert_eq!(liked[0].id, kept.id);

        let likers = users_engaged_with::<Like>(&store, &kept.id).await.unwrap();
        let names: Vec<_> = likers.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["bob"]);
    }
}
