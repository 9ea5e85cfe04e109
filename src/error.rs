use thiserror::Error;

/// Convenience result type for pipeline construction and report generation.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Error type returned when building pipelines, engines, or configurations.
///
/// Every variant is a construction-time failure: once a batch is being processed, per-record
/// problems are absorbed by the stages themselves (filtered out or replaced by a fallback value).
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The ordered stage list does not describe a valid record → value pipeline.
    #[error("invalid stage at position {position}: {message}")]
    InvalidStage { position: usize, message: String },

    /// A configuration value is out of range or non-finite.
    #[error("invalid config field '{field}': {message}")]
    InvalidConfig { field: String, message: String },

    /// Execution options are unusable (e.g. zero-sized chunks).
    #[error("invalid execution options: {message}")]
    InvalidExecutionOptions { message: String },

    /// The worker thread pool could not be created.
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A JSON configuration document could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl PipelineError {
    pub(crate) fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }
}
