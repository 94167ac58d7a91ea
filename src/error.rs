use std::fmt;

/// Errors raised by the services layer.
///
/// Domain fetchers catch `Network` and `Api` at their own boundary and
/// return empty collections, so callers normally only see `Validation`
/// (bad input, no request was made) or `Schema` (upstream sent something
/// we refuse to coerce).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport failure or non-2xx HTTP status.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// 2xx response carrying an application-level error envelope.
    #[error("api error from `{endpoint}`: {message}")]
    Api { endpoint: String, message: String },

    /// Input rejected before any network call was attempted.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Upstream payload did not match the expected shape.
    #[error("schema error from `{endpoint}`: {source}")]
    Schema {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Short outcome tag for structured log lines.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Network(_) => ErrorKind::Network,
            Error::Api { .. } => ErrorKind::Api,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Schema { .. } => ErrorKind::Schema,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Network,
    Api,
    Validation,
    Schema,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Network => "network",
            ErrorKind::Api => "api",
            ErrorKind::Validation => "validation",
            ErrorKind::Schema => "schema",
        };
        f.write_str(s)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
