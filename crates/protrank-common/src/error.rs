use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtrankError {
    /// A collaborator handed the core data that violates its contract
    /// (out-of-range raw score, non-finite druggability, empty identifier).
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Upstream source '{source_name}' failed: {message}")]
    Upstream { source_name: String, message: String },

    #[error("Operation '{operation}' timed out after {secs}s")]
    Timeout { operation: String, secs: u64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProtrankError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }

    pub fn upstream(source_name: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Upstream { source_name: source_name.into(), message: message.to_string() }
    }

    /// True for errors that indicate a collaborator contract violation.
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, Self::MalformedInput(_))
    }
}

pub type Result<T> = std::result::Result<T, ProtrankError>;
