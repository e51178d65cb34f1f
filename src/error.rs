use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpottingError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed input in {document}: {message}")]
    MalformedInput { document: String, message: String },
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
    #[error(
        "combination limit exceeded at {location} for query '{query}': {count} > {limit}"
    )]
    CombinationLimitExceeded {
        location: String,
        query: String,
        count: u128,
        limit: u64,
    },
    #[error("spotting run cancelled")]
    Cancelled,
}

impl SpottingError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn malformed(document: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            document: document.into(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Attributes a malformed-input error to `document`.
    pub(crate) fn in_document(self, document: &str) -> Self {
        match self {
            Self::MalformedInput { document: part, message } => Self::MalformedInput {
                document: document.to_string(),
                message: format!("{part}: {message}"),
            },
            other => other,
        }
    }

    /// Errors that end a single document but leave a batch running.
    pub fn is_document_scoped(&self) -> bool {
        matches!(
            self,
            Self::Io { .. } | Self::Json { .. } | Self::MalformedInput { .. }
        )
    }
}
