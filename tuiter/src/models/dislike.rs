use serde::{Deserialize, Serialize};

use crate::models::engagement::{Engagement, EngagementKind};
use crate::models::tuit::Stats;
use crate::store::Model;
use crate::utils::defaults::new_id;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Dislike {
    #[serde(rename = "_id", default = "new_id")]
    pub id: String,
    pub tuit: String,
    pub disliked_by: String,
}

impl Model for Dislike {
    const COLLECTION: &'static str = "dislikes";
    const UNIQUE_INDEXES: &'static [&'static [&'static str]] = &[&["tuit", "dislikedBy"]];
}

impl Engagement for Dislike {
    const KIND: EngagementKind = EngagementKind::Dislike;
    const COUNTER: &'static str = "stats.dislikes";
    const TUIT_FIELD: &'static str = "tuit";
    const USER_FIELD: &'static str = "dislikedBy";

    fn new(user_id: &str, tuit_id: &str) -> Self {
        Self {
            id: new_id(),
            tuit: tuit_id.to_string(),
            disliked_by: user_id.to_string(),
        }
    }

    fn tuit_id(&self) -> &str {
        &self.tuit
    }

    fn user_id(&self) -> &str {
        &self.disliked_by
    }

    fn stored_count(stats: &Stats) -> i64 {
        stats.dislikes
    }
}
