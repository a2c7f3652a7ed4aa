//! Configuration loading and GitHub API access for the screenshot-commenting
//! GitHub Action.
//!
//! This crate re-exports the workspace members so collaborators can depend on
//! a single package.

pub use shotcomment_core;
pub use shotcomment_github;

pub use shotcomment_core::{Config, CoreError, CoreResult, GhConfig, ImgurConfig, UploadTarget};
pub use shotcomment_github::{GithubError, GithubResult, Req, RequestOptions};
