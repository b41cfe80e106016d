//! Strict JSON request bodies.
//!
//! [`StrictJson`] reads at most [`MAX_BODY_BYTES`], decodes exactly one JSON
//! value, and turns every decoding failure into a message a client can act
//! on. Unknown object keys are rejected through `deny_unknown_fields` on the
//! target type.

use axum::extract::{FromRequest, Request};
use http_body_util::LengthLimitError;
use serde::de::DeserializeOwned;
use serde_json::error::Category;

use crate::error::AppError;

/// Largest request body accepted, in bytes (1 MiB).
pub const MAX_BODY_BYTES: usize = 1_048_576;

/// Why a request body could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum JsonBodyError {
    #[error("body must not be larger than {limit} bytes")]
    TooLarge { limit: usize },

    #[error("body must not be empty")]
    Empty,

    #[error("body contains badly-formed JSON (at character {offset})")]
    Syntax { offset: usize },

    #[error("body contains badly-formed JSON")]
    Truncated,

    #[error("body contains incorrect JSON type for field {field:?}")]
    FieldType { field: String },

    #[error("body contains incorrect JSON type (at character {offset})")]
    Type { offset: usize },

    #[error("body contains unknown key {key:?}")]
    UnknownKey { key: String },

    #[error("body must only contain a single JSON value")]
    TrailingData,

    /// Reading or decoding failed for a reason the client did not cause.
    #[error("failed to read request body: {0}")]
    Internal(String),
}

impl JsonBodyError {
    /// `true` for failures that should surface as a server error.
    pub fn is_internal(&self) -> bool {
        matches!(self, JsonBodyError::Internal(_))
    }
}

/// Decode `body` as exactly one JSON value of type `T`.
pub fn decode_strict<T: DeserializeOwned>(body: &[u8]) -> Result<T, JsonBodyError> {
    if body.len() > MAX_BODY_BYTES {
        return Err(JsonBodyError::TooLarge {
            limit: MAX_BODY_BYTES,
        });
    }
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(JsonBodyError::Empty);
    }

    let mut de = serde_json::Deserializer::from_slice(body);
    let value: T = serde_path_to_error::deserialize(&mut de).map_err(|err| {
        let field = path_to_field(err.path());
        classify(body, err.into_inner(), field)
    })?;
    de.end().map_err(|_| JsonBodyError::TrailingData)?;

    Ok(value)
}

fn path_to_field(path: &serde_path_to_error::Path) -> Option<String> {
    if path.iter().next().is_none() {
        None
    } else {
        Some(path.to_string())
    }
}

fn classify(body: &[u8], err: serde_json::Error, field: Option<String>) -> JsonBodyError {
    match err.classify() {
        Category::Io => JsonBodyError::Internal(err.to_string()),
        Category::Eof => JsonBodyError::Truncated,
        Category::Syntax => JsonBodyError::Syntax {
            offset: byte_offset(body, err.line(), err.column()),
        },
        Category::Data => {
            if let Some(key) = unknown_key(&err) {
                return JsonBodyError::UnknownKey { key };
            }
            match field {
                Some(field) => JsonBodyError::FieldType { field },
                None => JsonBodyError::Type {
                    offset: byte_offset(body, err.line(), err.column()),
                },
            }
        }
    }
}

/// Pull the key name out of serde's "unknown field `K`, expected ..." message.
fn unknown_key(err: &serde_json::Error) -> Option<String> {
    let message = err.to_string();
    let rest = message.strip_prefix("unknown field `")?;
    let end = rest.find('`')?;
    Some(rest[..end].to_string())
}

/// Convert serde_json's 1-based line and column into a byte offset.
fn byte_offset(body: &[u8], line: usize, column: usize) -> usize {
    let line_start: usize = body
        .split(|b| *b == b'\n')
        .take(line.saturating_sub(1))
        .map(|l| l.len() + 1)
        .sum();
    line_start + column
}

/// Request body extractor that decodes with [`decode_strict`].
///
/// Rejections are [`AppError::Json`], so they render through the standard
/// error envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictJson<T>(pub T);

impl<T, S> FromRequest<S> for StrictJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let bytes = axum::body::to_bytes(req.into_body(), MAX_BODY_BYTES)
            .await
            .map_err(|err| {
                let err = err.into_inner();
                if is_length_limit(&*err) {
                    JsonBodyError::TooLarge {
                        limit: MAX_BODY_BYTES,
                    }
                } else {
                    JsonBodyError::Internal(err.to_string())
                }
            })?;

        Ok(StrictJson(decode_strict(&bytes)?))
    }
}

fn is_length_limit(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}
