use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use shotcomment_core::{
    Config, CoreError, MessageType, ReadEnv, SystemEnv, UploadTarget, print_message,
};
use shotcomment_github::Req;
use std::process::ExitCode;
use tracing::{error, info};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit status when the workflow was triggered by an unsupported event
const EXIT_UNSUPPORTED_EVENT: u8 = 1;
/// Exit status for every other failure
const EXIT_FAILURE: u8 = 2;

#[derive(Parser)]
#[command(name = "shotcomment")]
#[command(about = "Configuration and GitHub access for the screenshot-commenting action")]
#[command(version = VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the action inputs and print the resolved configuration
    Check,

    /// Send an authenticated GET to the GitHub API and print the response
    Get {
        /// API path, e.g. repos/owner/repo/pulls
        path: String,
    },
}

/// Resolved settings printed by `check`
#[derive(Debug, Serialize)]
struct ConfigSummary {
    images: Vec<String>,
    custom_attachment_msg: String,
    edit_previous_comment: bool,
    upload_to: String,
    upload_service: &'static str,
    upload_to_branch: Option<String>,
    api_base_url: String,
    repo: String,
    git_ref: String,
    event_name: String,
    run_id: String,
    sha: String,
}

impl ConfigSummary {
    fn new(config: &Config, req: &Req) -> Self {
        let gh = config.gh_config();
        let upload_service = match config.upload_target() {
            UploadTarget::Imgur => "imgur",
            UploadTarget::GithubBranch(_) => "github_branch",
        };

        Self {
            images: config.images().to_vec(),
            custom_attachment_msg: config.custom_attachment_msg().to_string(),
            edit_previous_comment: config.edit_previous_comment(),
            upload_to: config.upload_to().to_string(),
            upload_service,
            upload_to_branch: gh.upload_to_branch().map(str::to_string),
            api_base_url: req.base_url().to_string(),
            repo: gh.repo().to_string(),
            git_ref: gh.git_ref().to_string(),
            event_name: gh.event_name().to_string(),
            run_id: gh.run_id().to_string(),
            sha: gh.sha().to_string(),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout is reserved for workflow commands
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    let result = match cli.command.unwrap_or(Commands::Check) {
        Commands::Check => check_command(),
        Commands::Get { path } => get_command(&path).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_failure(&e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}

/// Assemble the configuration, then the GitHub client
///
/// The event gate runs first, so an unsupported event is reported even when
/// the token is missing too.
fn load_action<E: ReadEnv>(env: &E) -> Result<(Config, Req)> {
    let config = Config::from_env(env)?;
    let req = Req::from_env(env).context("Failed to create GitHub client")?;
    Ok((config, req))
}

fn check_command() -> Result<()> {
    print_message("Parse Configuration", MessageType::Group);
    let loaded = load_action(&SystemEnv);
    print_message("", MessageType::EndGroup);
    let (config, req) = loaded?;

    let summary = ConfigSummary::new(&config, &req);
    let output_json =
        serde_json::to_string_pretty(&summary).context("Failed to serialize configuration")?;
    println!("{}", output_json);

    Ok(())
}

async fn get_command(path: &str) -> Result<()> {
    let req = Req::from_env(&SystemEnv).context("Failed to create GitHub client")?;
    let url = req.api_url(path);

    let response = req
        .get(&url)
        .await
        .with_context(|| format!("GET {} failed", url))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .context("Failed to read response body")?;

    info!(status = status.as_u16(), url = %url, "GitHub API response");
    if !status.is_success() {
        print_message(&format!("GET {} returned {}", url, status), MessageType::Warning);
    }
    println!("{}", body);

    Ok(())
}

fn exit_code_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<CoreError>() {
        Some(CoreError::UnsupportedEvent { .. }) => EXIT_UNSUPPORTED_EVENT,
        _ => EXIT_FAILURE,
    }
}

/// Text of the workflow error annotation for a failed run
fn failure_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<CoreError>() {
        Some(CoreError::UnsupportedEvent { supported, .. }) => {
            let events: Vec<String> = supported.iter().map(|e| format!("'{}'", e)).collect();
            format!("This action only works for [{}] event(s)", events.join(", "))
        }
        _ => format!("{:#}", err),
    }
}

fn report_failure(err: &anyhow::Error) {
    error!("{:#}", err);
    print_message(&failure_message(err), MessageType::Error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use shotcomment_core::{InMemoryEnv, ValidationError};
    use shotcomment_github::GithubError;

    fn pull_request_env() -> InMemoryEnv {
        InMemoryEnv::from_iter([
            ("INPUT_IMAGES", "a.png, b.png"),
            ("GITHUB_REF", "refs/heads/feature/login"),
            ("GITHUB_REPOSITORY", "octo/site"),
            ("GITHUB_EVENT_NAME", "pull_request"),
            ("GITHUB_RUN_ID", "77"),
            ("GITHUB_SHA", "feedface"),
            ("INPUT_GITHUB_TOKEN", "test-token"),
        ])
    }

    #[test]
    fn test_unsupported_event_exits_with_one() {
        let env = pull_request_env();
        env.set("GITHUB_EVENT_NAME", "push");

        let err = anyhow::Error::from(Config::from_env(&env).unwrap_err());
        assert_eq!(exit_code_for(&err), 1);
        assert_eq!(
            failure_message(&err),
            "This action only works for ['pull_request'] event(s)"
        );
    }

    #[test]
    fn test_failure_message_lists_every_supported_event() {
        let err = anyhow::Error::from(CoreError::UnsupportedEvent {
            event: "push".to_string(),
            supported: vec!["pull_request".to_string(), "pull_request_target".to_string()],
        });
        assert_eq!(
            failure_message(&err),
            "This action only works for ['pull_request', 'pull_request_target'] event(s)"
        );
    }

    #[test]
    fn test_load_action_requires_token() {
        let env = pull_request_env();
        env.remove("INPUT_GITHUB_TOKEN");

        let err = load_action(&env).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GithubError>(),
            Some(GithubError::MissingToken)
        ));
        assert_eq!(exit_code_for(&err), 2);
    }

    #[test]
    fn test_load_action_event_gate_wins_over_missing_token() {
        let env = pull_request_env();
        env.remove("INPUT_GITHUB_TOKEN");
        env.set("GITHUB_EVENT_NAME", "push");

        let err = load_action(&env).unwrap_err();
        assert_eq!(exit_code_for(&err), 1);
    }

    #[test]
    fn test_load_action_builds_client() {
        let env = pull_request_env();
        env.set("GITHUB_API_URL", "https://ghe.example.com/api/v3");

        let (config, req) = load_action(&env).unwrap();
        assert_eq!(config.gh_config().repo(), "octo/site");
        assert_eq!(req.base_url(), "https://ghe.example.com/api/v3");
    }

    #[test]
    fn test_unsupported_event_found_through_context() {
        let err = anyhow::Error::from(CoreError::UnsupportedEvent {
            event: "schedule".to_string(),
            supported: vec!["pull_request".to_string()],
        })
        .context("Failed to load configuration");

        assert_eq!(exit_code_for(&err), 1);
    }

    #[test]
    fn test_other_failures_exit_with_two() {
        let missing = anyhow::Error::from(CoreError::MissingConfig("INPUT_IMAGES".to_string()));
        assert_eq!(exit_code_for(&missing), 2);
        assert_eq!(
            failure_message(&missing),
            "Missing required environment variable: INPUT_IMAGES"
        );

        let invalid = anyhow::Error::from(CoreError::from(ValidationError::Empty {
            field: "images".to_string(),
        }));
        assert_eq!(exit_code_for(&invalid), 2);

        let plain = anyhow::anyhow!("GET failed");
        assert_eq!(exit_code_for(&plain), 2);
    }

    #[test]
    fn test_summary_for_branch_upload() {
        let (config, req) = load_action(&pull_request_env()).unwrap();
        let summary = serde_json::to_value(ConfigSummary::new(&config, &req)).unwrap();

        assert_eq!(summary["images"], serde_json::json!(["a.png", "b.png"]));
        assert_eq!(summary["git_ref"], "login");
        assert_eq!(summary["upload_service"], "github_branch");
        assert_eq!(summary["upload_to_branch"], "github_branch");
        assert_eq!(summary["edit_previous_comment"], true);
        assert_eq!(summary["custom_attachment_msg"], "Captures from the latest commit");
        assert_eq!(summary["api_base_url"], "https://api.github.com");
    }

    #[test]
    fn test_summary_for_imgur_upload() {
        let env = pull_request_env();
        env.set("INPUT_UPLOAD_TO", "imgur");
        env.set("INPUT_EDIT_PREVIOUS_COMMENT", "false");

        let (config, req) = load_action(&env).unwrap();
        let summary = serde_json::to_value(ConfigSummary::new(&config, &req)).unwrap();

        assert_eq!(summary["upload_service"], "imgur");
        assert!(summary["upload_to_branch"].is_null());
        assert_eq!(summary["edit_previous_comment"], false);
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["shotcomment"]).unwrap();
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["shotcomment", "get", "repos/octo/site"]).unwrap();
        match cli.command {
            Some(Commands::Get { path }) => assert_eq!(path, "repos/octo/site"),
            _ => panic!("Expected get command"),
        }
    }
}
