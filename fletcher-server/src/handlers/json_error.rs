// Server related imports
use axum::{
    extract::{Json, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

// General imports
use fletcher_core::error::SelectionError;
use serde::{Deserialize, Serialize};

// from https://github.com/EricLBuehler/candle-vllm/blob/master/src/openai/responses.rs#L117
pub trait ErrorToResponse: Serialize {
    fn to_response(&self, code: StatusCode) -> axum::response::Response {
        let mut r = Json(self).into_response();
        *r.status_mut() = code;
        r
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonError {
    pub message: String,
}

impl JsonError {
    pub fn new(message: String) -> Self {
        Self { message }
    }
}

impl ErrorToResponse for JsonError {}

/// Status code the serving boundary reports for each selection failure
pub fn selection_error_status(err: &SelectionError) -> StatusCode {
    match err {
        SelectionError::InvalidDateFormat(_) | SelectionError::InvalidTopicIndex { .. } => {
            StatusCode::BAD_REQUEST
        }
        SelectionError::NoMatchingDocuments => StatusCode::NOT_FOUND,
    }
}

pub fn selection_error_response(err: &SelectionError) -> axum::response::Response {
    JsonError::new(err.to_string()).to_response(selection_error_status(err))
}

/// Translate a rejected JSON payload into a `JsonError` response
pub fn json_rejection_response(rejection: JsonRejection) -> axum::response::Response {
    match rejection {
        JsonRejection::MissingJsonContentType(_err) => {
            // Request didn't have `Content-Type: application/json`
            // header
            JsonError::new("Missing `Content-Type: application/json` header".to_string())
                .to_response(StatusCode::BAD_REQUEST)
        }
        JsonRejection::JsonDataError(err) => {
            // Couldn't deserialize the body into the target type
            let (e_code, e_str) = serde_json_error_response(err);
            JsonError::new(e_str).to_response(e_code)
        }
        JsonRejection::JsonSyntaxError(err) => {
            // Syntax error in the body
            let (e_code, e_str) = serde_json_error_response(err);
            JsonError::new(e_str).to_response(e_code)
        }
        JsonRejection::BytesRejection(_err) => {
            // Failed to extract the request body
            JsonError::new("Failed to buffer request body".to_string())
                .to_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
        _ => {
            // `JsonRejection` is marked `#[non_exhaustive]` so match must
            // include a catch-all case.
            JsonError::new("Unknown error".to_string()).to_response(StatusCode::BAD_REQUEST)
        }
    }
}

// attempt to extract the inner `serde_path_to_error::Error<serde_json::Error>`,
// if that succeeds we can provide a more specific error.
//
// `Json` uses `serde_path_to_error` so the error will be wrapped in `serde_path_to_error::Error`.
pub fn serde_json_error_response<E>(err: E) -> (StatusCode, String)
where
    E: std::error::Error + 'static,
{
    if let Some(err) = find_error_source::<serde_path_to_error::Error<serde_json::Error>>(&err) {
        let serde_json_err = err.inner();
        let path = err.path().to_string();
        if serde_json_err.is_data() && path == "." {
            (
                StatusCode::BAD_REQUEST,
                format!("Invalid request: {serde_json_err}"),
            )
        } else if serde_json_err.is_data() {
            (
                StatusCode::BAD_REQUEST,
                format!("Invalid value for `{path}`: {serde_json_err}"),
            )
        } else {
            (
                StatusCode::BAD_REQUEST,
                format!(
                    "Invalid JSON at line {} column {}",
                    serde_json_err.line(),
                    serde_json_err.column()
                ),
            )
        }
    } else {
        (StatusCode::BAD_REQUEST, "Unknown error".to_string())
    }
}

// attempt to downcast `err` into a `T` and if that fails recursively try and
// downcast `err`'s source
fn find_error_source<'a, T>(err: &'a (dyn std::error::Error + 'static)) -> Option<&'a T>
where
    T: std::error::Error + 'static,
{
    if let Some(err) = err.downcast_ref::<T>() {
        Some(err)
    } else if let Some(source) = err.source() {
        find_error_source(source)
    } else {
        None
    }
}
