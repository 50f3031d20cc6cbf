use std::path::PathBuf;

/// A single filter-list source could not be retrieved.
#[derive(Debug, thiserror::Error)]
pub enum SourceFetchError {
    #[error("Request for '{id}' failed: {source}")]
    Request {
        id: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("'{id}' returned status {status}")]
    Status { id: String, status: u16 },
    #[error("Request for '{id}' timed out")]
    Timeout { id: String },
    #[error("Fetch task for '{id}' aborted")]
    Aborted { id: String },
    #[error("Failed to read '{}' for '{id}': {source}", path.display())]
    Io {
        id: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SourceFetchError {
    /// Id of the source that failed.
    pub fn source_id(&self) -> &str {
        match self {
            Self::Request { id, .. }
            | Self::Status { id, .. }
            | Self::Timeout { id }
            | Self::Aborted { id }
            | Self::Io { id, .. } => id,
        }
    }
}

/// Error type for loading filter lists.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("No filter list sources configured")]
    NoSources,
    #[error("All {} filter list sources failed", failures.len())]
    AllSourcesFailed { failures: Vec<SourceFetchError> },
}

/// Error type for engine configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Duplicate source id: {0}")]
    DuplicateSource(String),
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = SourceFetchError::Status {
            id: "easylist".to_string(),
            status: 404,
        };
        assert_eq!(err.to_string(), "'easylist' returned status 404");
        assert_eq!(err.source_id(), "easylist");

        let err = LoadError::AllSourcesFailed {
            failures: vec![
                SourceFetchError::Timeout { id: "a".to_string() },
                SourceFetchError::Timeout { id: "b".to_string() },
            ],
        };
        assert_eq!(err.to_string(), "All 2 filter list sources failed");
    }
}
