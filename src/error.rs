use thiserror::Error;

/// Errors raised while reading or writing Graph payloads.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a {expected} value but found {found}")]
    UnexpectedType {
        expected: &'static str,
        found: &'static str,
    },
    #[error("{value} does not fit in {target}")]
    OutOfRange { value: String, target: &'static str },
    #[error("invalid date or time value {value:?}")]
    InvalidTime {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("invalid ISO 8601 duration {value:?}")]
    InvalidDuration { value: String },
    #[error("invalid uuid value {value:?}")]
    InvalidUuid {
        value: String,
        #[source]
        source: uuid::Error,
    },
    #[error("invalid base64 content")]
    InvalidBase64(#[from] base64::DecodeError),
    #[error("unknown {enum_name} value {value:?}")]
    UnknownEnumValue {
        enum_name: &'static str,
        value: String,
    },
    #[error("unsupported content type {0:?}, only application/json can be parsed")]
    UnsupportedContentType(String),
}
