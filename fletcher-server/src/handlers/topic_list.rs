// Server related imports
use axum::extract::{Json, State};

// General imports
use serde::{Deserialize, Serialize};

// Library imports
use crate::server::server_state::ServerState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicEntry {
    pub index: usize,
    pub name: String,
}

/// Topic vocabulary endpoint, the values a client may send as `topic`
pub async fn topic_list(State(state): State<ServerState>) -> Json<Vec<TopicEntry>> {
    let topics = state
        .context
        .vocabulary()
        .iter()
        .enumerate()
        .map(|(index, name)| TopicEntry {
            index,
            name: name.to_string(),
        })
        .collect();
    Json(topics)
}
