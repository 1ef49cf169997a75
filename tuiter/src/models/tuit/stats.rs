use bson::doc;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::constants::MAX_RECONCILE_ATTEMPTS;
use crate::errors::TuiterError;
use crate::models::dislike::Dislike;
use crate::models::engagement::{count_for, Engagement};
use crate::models::like::Like;
use crate::models::tuit::Tuit;
use crate::store::{field, Store};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(default)]
pub struct Stats {
    pub likes: i64,
    pub dislikes: i64,
    pub replies: i64,
    pub retuits: i64,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct CounterState {
    pub stored: i64,
    pub actual: i64,
}

impl CounterState {
    pub fn consistent(&self) -> bool {
        self.stored == self.actual
    }
}

/// Stored counters of a tuit next to the number of records behind them.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StatsCheck {
    pub tuit: String,
    pub likes: CounterState,
    pub dislikes: CounterState,
    pub consistent: bool,
}

/// A counter that did not match its records and was overwritten.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CounterDrift {
    pub tuit: String,
    pub counter: &'static str,
    pub stored: i64,
    pub actual: i64,
}

impl Stats {
    pub async fn check(store: &Store, tuit_id: &str) -> Result<StatsCheck, TuiterError> {
        let tuit = Tuit::find_by_id(store, tuit_id).await?;

        let likes = CounterState {
            stored: tuit.stats.likes,
            actual: count_for::<Like>(store, tuit_id).await?,
        };
        let dislikes = CounterState {
            stored: tuit.stats.dislikes,
            actual: count_for::<Dislike>(store, tuit_id).await?,
        };

        Ok(StatsCheck {
            tuit: tuit.id,
            consistent: likes.consistent() && dislikes.consistent(),
            likes,
            dislikes,
        })
    }

    pub async fn reconcile(store: &Store, tuit_id: &str) -> Result<Vec<CounterDrift>, TuiterError> {
        let tuit = Tuit::find_by_id(store, tuit_id).await?;

        Stats::reconcile_tuit(store, &tuit).await
    }

    /// Reconciles every tuit, returning the counters that had drifted.
    pub async fn reconcile_all(store: &Store) -> Result<Vec<CounterDrift>, TuiterError> {
        let tuits: Vec<Tuit> = store.find(doc! {}).await?;
        let mut drifts = Vec::new();

        for tuit in tuits {
            drifts.extend(Stats::reconcile_tuit(store, &tuit).await?);
        }

        Ok(drifts)
    }

    async fn reconcile_tuit(store: &Store, tuit: &Tuit) -> Result<Vec<CounterDrift>, TuiterError> {
        let likes = reconcile_counter::<Like>(store, &tuit.id, tuit.stats.likes).await?;
        let dislikes = reconcile_counter::<Dislike>(store, &tuit.id, tuit.stats.dislikes).await?;

        Ok(likes.into_iter().chain(dislikes).collect())
    }
}

/// Overwrites the counter with the record count, but only if the counter still holds the
/// value it was compared against. A counter that keeps moving is left for the next run.
async fn reconcile_counter<E: Engagement>(
    store: &Store,
    tuit_id: &str,
    stored: i64,
) -> Result<Option<CounterDrift>, TuiterError> {
    let mut stored = stored;

    for _ in 0..MAX_RECONCILE_ATTEMPTS {
        let actual = count_for::<E>(store, tuit_id).await?;
        if actual == stored {
            return Ok(None);
        }

        let mut filter = doc! { "_id": tuit_id };
        filter.insert(E::COUNTER, stored);

        if store
            .update_one::<Tuit>(filter, doc! { "$set": field(E::COUNTER, actual) })
            .await?
        {
            warn!(
                "{} counter of tuit {} drifted: stored {}, counted {}",
                E::KIND,
                tuit_id,
                stored,
                actual
            );

            return Ok(Some(CounterDrift {
                tuit: tuit_id.to_string(),
                counter: E::COUNTER,
                stored,
                actual,
            }));
        }

        match store.find_one::<Tuit>(doc! { "_id": tuit_id }).await? {
            Some(tuit) => stored = E::stored_count(&tuit.stats),
            None => return Ok(None),
        }
    }

    warn!("{} counter of tuit {} kept changing, skipped", E::KIND, tuit_id);

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::engagement::{engage, toggle, CounterUpdate};
    use crate::test_support::{create_tuit, create_user, memory_store};

    #[tokio::test]
    async fn check_reports_direct_writes_as_drift() {
        let store = memory_store();
        let alice = create_user(&store, "alice").await;
        let tuit = create_tuit(&store, &alice.id, "hello").await;

        toggle::<Like>(&store, CounterUpdate::Atomic, &alice.id, &tuit.id)
            .await
            .unwrap();
        assert!(Stats::check(&store, &tuit.id).await.unwrap().consistent);

        engage::<Dislike>(&store, &alice.id, &tuit.id).await.unwrap();

        let check = Stats::check(&store, &tuit.id).await.unwrap();
        assert!(!check.consistent);
        assert_eq!(check.likes, CounterState { stored: 1, actual: 1 });
        assert_eq!(check.dislikes, CounterState { stored: 0, actual: 1 });
    }

    #[tokio::test]
    async fn reconcile_repairs_a_lost_update() {
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

        let drifts = Stats::reconcile(&store, &tuit.id).await.unwrap();
        assert_eq!(
            drifts,
            vec![CounterDrift {
                tuit: tuit.id.clone(),
                counter: "stats.likes",
                stored: 1,
                actual: 2,
            }]
        );

        assert!(Stats::check(&store, &tuit.id).await.unwrap().consistent);
        assert!(Stats::reconcile(&store, &tuit.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reconcile_all_covers_every_tuit() {
        let store = memory_store();
        let alice = create_user(&store, "alice").await;
        let first = create_tuit(&store, &alice.id, "first").await;
        let second = create_tuit(&store, &alice.id, "second").await;
        let clean = create_tuit(&store, &alice.id, "clean").await;

        engage::<Like>(&store, &alice.id, &first.id).await.unwrap();
        engage::<Dislike>(&store, &alice.id, &second.id).await.unwrap();
        Tuit::set_counter(&store, &second.id, "stats.likes", 4).await.unwrap();

        let drifts = Stats::reconcile_all(&store).await.unwrap();
        assert_eq!(drifts.len(), 3);
        assert!(drifts.iter().all(|d| d.tuit != clean.id));

        let second = Tuit::find_by_id(&store, &second.id).await.unwrap();
        assert_eq!((second.stats.likes, second.stats.dislikes), (0, 1));
    }

    #[tokio::test]
    async fn reconcile_of_missing_tuit_is_not_found() {
        let store = memory_store();

        let err = Stats::reconcile(&store, "missing").await.unwrap_err();
        assert!(matches!(err, TuiterError::NotFound(_)));
    }
}
