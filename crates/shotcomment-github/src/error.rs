use shotcomment_core::CoreError;
use thiserror::Error;

/// GitHub crate error types
#[derive(Debug, Error)]
pub enum GithubError {
    #[error("Configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("Missing required environment variable: INPUT_GITHUB_TOKEN")]
    MissingToken,

    #[error("GitHub token cannot be used as a header value")]
    InvalidToken,

    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

pub type GithubResult<T> = Result<T, GithubError>;
