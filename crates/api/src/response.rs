//! Response envelopes and the pretty JSON writer every endpoint goes through.
//!
//! Each body is a single JSON object with one top-level key (`movie`,
//! `movies` + `metadata`, `env`, or `error`), tab-indented and terminated by a
//! newline.

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use movies_core::filters::Metadata;
use movies_core::validator::ValidationErrors;
use movies_db::models::movie::Movie;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::SERVER_ERROR_MESSAGE;

/// Pre-rendered 500 body, used when a response cannot be serialized.
const SERVER_ERROR_BODY: &str = concat!(
    "{\n\t\"error\": \"",
    "the server encountered a problem and could not process your request",
    "\"\n}\n"
);

/// Serialize `value` as tab-indented JSON followed by a newline.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::with_capacity(128);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"\t"));
    value.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}

/// JSON response body written with [`to_pretty_json`].
///
/// Works like `axum::Json`; combine with a status code or headers in a tuple.
#[derive(Debug, Clone, Copy)]
pub struct Pretty<T>(pub T);

impl<T: Serialize> IntoResponse for Pretty<T> {
    fn into_response(self) -> Response {
        let content_type = [(CONTENT_TYPE, HeaderValue::from_static("application/json"))];
        match to_pretty_json(&self.0) {
            Ok(body) => (content_type, body).into_response(),
            Err(err) => {
                tracing::error!(error = %err, "Failed to serialize response body");
                (StatusCode::INTERNAL_SERVER_ERROR, content_type, SERVER_ERROR_BODY).into_response()
            }
        }
    }
}

/// `{ "movie": ... }`
#[derive(Debug, Serialize)]
pub struct MovieResponse {
    pub movie: Movie,
}

/// `{ "movies": [...], "metadata": {...} }`
#[derive(Debug, Serialize)]
pub struct MovieListResponse {
    pub movies: Vec<Movie>,
    pub metadata: Metadata,
}

/// `{ "error": ... }`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Either a single message or a field-to-message map.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ErrorBody {
    Message(String),
    Fields(ValidationErrors),
}

impl ErrorResponse {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody::Message(message.into()),
        }
    }

    pub fn fields(errors: ValidationErrors) -> Self {
        Self {
            error: ErrorBody::Fields(errors),
        }
    }

    pub fn server_error() -> Self {
        Self::message(SERVER_ERROR_MESSAGE)
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use movies_core::validator::Validator;
    use serde_json::json;

    use super::*;

    #[test]
    fn output_is_tab_indented_with_trailing_newline() {
        let body = to_pretty_json(&json!({ "error": "nope" })).unwrap();
        assert_eq!(body, b"{\n\t\"error\": \"nope\"\n}\n");
    }

    #[test]
    fn nested_values_indent_one_tab_per_level() {
        let body = to_pretty_json(&json!({ "env": { "status": "available" } })).unwrap();
        let text = String::from_utf8(body).unwrap();
        assert_eq!(text, "{\n\t\"env\": {\n\t\t\"status\": \"available\"\n\t}\n}\n");
    }

    #[test]
    fn field_errors_serialize_as_plain_map() {
        let mut v = Validator::new();
        v.add_error("year", "must be provided");
        v.add_error("title", "must be provided");

        let value = serde_json::to_value(ErrorResponse::fields(v.into_errors())).unwrap();
        assert_eq!(
            value,
            json!({ "error": { "title": "must be provided", "year": "must be provided" } })
        );
    }

    #[test]
    fn fallback_body_matches_rendered_server_error() {
        let rendered = to_pretty_json(&ErrorResponse::server_error()).unwrap();
        assert_eq!(rendered, SERVER_ERROR_BODY.as_bytes());
    }

    #[tokio::test]
    async fn pretty_sets_json_content_type() {
        let response = Pretty(json!({ "ok": true })).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.ends_with(b"}\n"));
    }
}
