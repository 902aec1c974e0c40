// Server related imports
use axum::{
    extract::{Json, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};

// General imports
use fletcher_core::{
    corpus::topic_vocabulary::TopicVocabulary,
    error::SelectionError,
    selection::{
        candidate_selector::{Selection, TopicFilter, select},
        selection_context::SelectionContext,
    },
};
use serde::{Deserialize, Serialize};

// Library imports
use crate::handlers::json_error::{json_rejection_response, selection_error_response};
use crate::server::server_state::ServerState;

/// Topic field of a selection request, a number or a numeric string
///
/// Fractional numbers are truncated toward zero, so `7.0` and `7.9` both
/// name topic 7.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TopicValue {
    Index(i64),
    Number(f64),
    Text(String),
}

impl TopicValue {
    pub fn to_filter(&self, vocabulary: &TopicVocabulary) -> Result<TopicFilter, SelectionError> {
        match self {
            Self::Index(index) => TopicFilter::from_index(*index, vocabulary),
            Self::Number(number) if number.is_finite() => {
                TopicFilter::from_index(number.trunc() as i64, vocabulary)
            }
            Self::Number(number) => Err(SelectionError::InvalidTopicIndex {
                value: number.to_string(),
                topics: vocabulary.len(),
            }),
            Self::Text(text) => match text.trim().parse::<i64>() {
                Ok(index) => TopicFilter::from_index(index, vocabulary),
                Err(_) => Err(SelectionError::InvalidTopicIndex {
                    value: text.clone(),
                    topics: vocabulary.len(),
                }),
            },
        }
    }
}

/// Selection request, dates as month/day/year and `-1` for any topic
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectDocumentRequest {
    pub start_date: String,
    pub end_date: String,
    pub topic: TopicValue,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectDocumentResponse {
    pub title: String,
    pub text: String,
    pub top3: Vec<String>,
}

impl From<Selection> for SelectDocumentResponse {
    fn from(selection: Selection) -> Self {
        Self {
            title: selection.title,
            text: selection.text,
            top3: selection.top3,
        }
    }
}

/// Resolve the dates, check the topic and draw one document
///
/// The thread local generator never lives across an await point.
pub fn select_for_request(
    context: &SelectionContext,
    request: &SelectDocumentRequest,
) -> Result<Selection, SelectionError> {
    let range = context
        .resolver()
        .resolve(&request.start_date, &request.end_date)?;
    let filter = request.topic.to_filter(context.vocabulary())?;
    select(context, range, filter, &mut rand::rng())
}

/// Document selection endpoint
#[axum::debug_handler]
pub async fn select_document(
    State(state): State<ServerState>,
    payload: Result<Json<SelectDocumentRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return json_rejection_response(rejection),
    };
    match select_for_request(&state.context, &request) {
        Ok(selection) => {
            tracing::debug!(
                "Selected document {} ({:?}) with topics {:?} for {:?}",
                selection.id,
                selection.title,
                selection.top3,
                request
            );
            Json(SelectDocumentResponse::from(selection)).into_response()
        }
        Err(err) => {
            tracing::debug!("Selection failed for {:?}: {}", request, err);
            selection_error_response(&err)
        }
    }
}
