use serde_json::{Map, Value, json};
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Machine-readable reason attached to a [`Error::ContentNegotiation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NegotiationCode {
    /// `?format=` named a known format this endpoint cannot produce.
    FormatNotSupported,
    /// Nothing in the `Accept` header overlaps the available media types.
    NotAcceptable,
    /// A renderer failed after a media type was chosen.
    NegotiationError,
}

impl NegotiationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NegotiationCode::FormatNotSupported => "FORMAT_NOT_SUPPORTED",
            NegotiationCode::NotAcceptable => "NOT_ACCEPTABLE",
            NegotiationCode::NegotiationError => "NEGOTIATION_ERROR",
        }
    }
}

impl fmt::Display for NegotiationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while building, transitioning, or rendering resources.
///
/// Every variant maps onto an HTTP status via [`Error::status`] so a
/// response layer can surface it without inspecting the variant.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed constructor or mutator arguments. Always a programmer error.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("transition '{name}' is not available from state '{state}'")]
    StateTransition { name: String, state: String },

    #[error("{message}")]
    ContentNegotiation {
        code: NegotiationCode,
        message: String,
        details: Option<Value>,
    },

    /// Generic fallback carrying an explicit status and code.
    #[error("{message}")]
    Api {
        message: String,
        status: u16,
        code: String,
        details: Option<Value>,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }

    pub fn negotiation(
        code: NegotiationCode,
        message: impl Into<String>,
        details: Option<Value>,
    ) -> Self {
        Error::ContentNegotiation {
            code,
            message: message.into(),
            details,
        }
    }

    pub fn api(message: impl Into<String>, status: u16, code: impl Into<String>) -> Self {
        Error::Api {
            message: message.into(),
            status,
            code: code.into(),
            details: None,
        }
    }

    /// HTTP status this error should be reported with.
    pub fn status(&self) -> u16 {
        match self {
            Error::InvalidArgument(_) => 400,
            Error::StateTransition { .. } => 422,
            Error::ContentNegotiation { .. } => 406,
            Error::Api { status, .. } => *status,
            Error::Json(_) => 500,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &str {
        match self {
            Error::InvalidArgument(_) => "INVALID_ARGUMENT",
            Error::StateTransition { .. } => "INVALID_STATE_TRANSITION",
            Error::ContentNegotiation { code, .. } => code.as_str(),
            Error::Api { code, .. } => code,
            Error::Json(_) => "INTERNAL_ERROR",
        }
    }

    pub fn details(&self) -> Option<&Value> {
        match self {
            Error::ContentNegotiation { details, .. } | Error::Api { details, .. } => {
                details.as_ref()
            }
            _ => None,
        }
    }

    /// Error body in the `{ "error": { message, status, code, details? } }` shape.
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("message".into(), Value::String(self.to_string()));
        body.insert("status".into(), json!(self.status()));
        body.insert("code".into(), Value::String(self.code().to_string()));
        if let Some(details) = self.details() {
            body.insert("details".into(), details.clone());
        }
        json!({ "error": body })
    }
}
