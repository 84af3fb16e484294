use thiserror::Error;

/// Fatal configuration error, surfaced before the pipeline's first stage
/// ever runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse strategy config YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Validation(String),
}
