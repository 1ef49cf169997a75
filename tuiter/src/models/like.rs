use serde::{Deserialize, Serialize};

use crate::models::engagement::{Engagement, EngagementKind};
use crate::models::tuit::Stats;
use crate::store::Model;
use crate::utils::defaults::new_id;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    #[serde(rename = "_id", default = "new_id")]
    pub id: String,
    pub tuit: String,
    pub liked_by: String,
}

impl Model for Like {
    const COLLECTION: &'static str = "likes";
    const UNIQUE_INDEXES: &'static [&'static [&'static str]] = &[&["tuit", "likedBy"]];
}

impl Engagement for Like {
    const KIND: EngagementKind = EngagementKind::Like;
    const COUNTER: &'static str = "stats.likes";
    const TUIT_FIELD: &'static str = "tuit";
    const USER_FIELD: &'static str = "likedBy";

    fn new(user_id: &str, tuit_id: &str) -> Self {
        Self {
            id: new_id(),
            tuit: tuit_id.to_string(),
            liked_by: user_id.to_string(),
        }
    }

    fn tuit_id(&self) -> &str {
        &self.tuit
    }

    fn user_id(&self) -> &str {
        &self.liked_by
    }

    fn stored_count(stats: &Stats) -> i64 {
        stats.likes
    }
}
