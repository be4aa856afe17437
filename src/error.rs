//! Error types for the fedbrief pipeline.

/// Top-level error type for the research pipeline.
///
/// Only artifact I/O failures abort a run; search and generative
/// failures are handled locally as flags and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum BriefError {
    /// Configuration error (bad flag, unparsable config file, bad env override).
    #[error("config error: {0}")]
    Config(String),

    /// Chat-completion backend error (transport, status, or malformed body).
    #[error("LLM error: {0}")]
    Llm(String),

    /// Pipeline sequencing error.
    #[error("pipeline error: {0}")]
    Pipeline(String),

    /// Artifact serialization error.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Artifact I/O error — fatal, the artifacts are the output contract.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, BriefError>;
