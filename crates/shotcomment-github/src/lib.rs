pub mod api;
pub mod error;

// Re-export commonly used types
pub use api::{GITHUB_ACCEPT, GITHUB_API_URL, Req, RequestOptions};
pub use error::{GithubError, GithubResult};
