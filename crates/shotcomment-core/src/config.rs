use tracing::{debug, info, warn};

use crate::{
    env::{self, ReadEnv, SystemEnv},
    error::{CoreError, CoreResult},
    validate::{BoolLike, Field, NoEmpty, ProperBool},
};

pub const INPUT_IMAGES: &str = "INPUT_IMAGES";
pub const INPUT_CUSTOM_ATTACHMENT_MSG: &str = "INPUT_CUSTOM_ATTACHMENT_MSG";
pub const INPUT_EDIT_PREVIOUS_COMMENT: &str = "INPUT_EDIT_PREVIOUS_COMMENT";
pub const INPUT_UPLOAD_TO: &str = "INPUT_UPLOAD_TO";
pub const GITHUB_REF: &str = "GITHUB_REF";
pub const GITHUB_REPOSITORY: &str = "GITHUB_REPOSITORY";
pub const GITHUB_EVENT_NAME: &str = "GITHUB_EVENT_NAME";
pub const GITHUB_RUN_ID: &str = "GITHUB_RUN_ID";
pub const GITHUB_SHA: &str = "GITHUB_SHA";

pub const DEFAULT_ATTACHMENT_MSG: &str = "Captures from the latest commit";
pub const DEFAULT_UPLOAD_TO: &str = "github_branch";
pub const UPLOAD_TO_IMGUR: &str = "imgur";
pub const PULL_REQUEST_EVENT: &str = "pull_request";

/// Where captured images get uploaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadTarget<'a> {
    Imgur,
    /// Commit the images to the named branch of the repository
    GithubBranch(&'a str),
}

/// Image hosting settings, present only when uploading to imgur
#[derive(Debug, Clone)]
pub struct ImgurConfig {
    upload_imgur: Field<String>,
}

impl ImgurConfig {
    pub fn new(upload_imgur: impl Into<String>) -> CoreResult<Self> {
        let mut upload_imgur_field = Field::new("upload_imgur", NoEmpty);
        upload_imgur_field.set(upload_imgur.into())?;

        Ok(Self {
            upload_imgur: upload_imgur_field,
        })
    }

    pub fn upload_imgur(&self) -> &str {
        self.upload_imgur.get().map(String::as_str).unwrap_or_default()
    }
}

/// Values describing the workflow run, taken from the runner's `GITHUB_*` variables
///
/// Everything except `upload_to_branch` is required. Build one with
/// [`GhRequired`] and optionally a branch name.
#[derive(Debug, Clone)]
pub struct GhConfig {
    git_ref: Field<String>,
    repo: Field<String>,
    event_name: Field<String>,
    run_id: Field<String>,
    sha: Field<String>,
    pr_event: Field<String>,
    supported_events: Field<Vec<String>>,
    upload_to_branch: Field<String>,
}

/// The required part of a [`GhConfig`], before validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GhRequired {
    pub git_ref: String,
    pub repo: String,
    pub event_name: String,
    pub run_id: String,
    pub sha: String,
    pub pr_event: String,
    pub supported_events: Vec<String>,
}

impl GhRequired {
    /// Read the required run values from the environment
    ///
    /// Only the last `/` segment of `GITHUB_REF` is kept, so
    /// `refs/heads/main` becomes `main` and `refs/pull/7/merge` becomes `merge`.
    pub fn from_env<E: ReadEnv + ?Sized>(env: &E) -> CoreResult<Self> {
        let full_ref = env::required(env, GITHUB_REF)?;
        let git_ref = full_ref.rsplit('/').next().unwrap_or_default().to_string();

        Ok(Self {
            git_ref,
            repo: env::required(env, GITHUB_REPOSITORY)?,
            event_name: env::required(env, GITHUB_EVENT_NAME)?,
            run_id: env::required(env, GITHUB_RUN_ID)?,
            sha: env::required(env, GITHUB_SHA)?,
            pr_event: PULL_REQUEST_EVENT.to_string(),
            supported_events: vec![PULL_REQUEST_EVENT.to_string()],
        })
    }

    /// Whether the triggering event is one this action handles
    pub fn is_supported(&self) -> bool {
        self.supported_events.contains(&self.event_name)
    }
}

impl GhConfig {
    /// Validate `required` and, when given, the branch images are pushed to
    pub fn new(required: GhRequired, upload_to_branch: Option<String>) -> CoreResult<Self> {
        let mut config = Self {
            git_ref: Field::new("ref", NoEmpty),
            repo: Field::new("repo", NoEmpty),
            event_name: Field::new("event_name", NoEmpty),
            run_id: Field::new("run_id", NoEmpty),
            sha: Field::new("sha", NoEmpty),
            pr_event: Field::new("pr_event", NoEmpty),
            supported_events: Field::new("supported_events", NoEmpty),
            upload_to_branch: Field::new("upload_to_branch", NoEmpty),
        };

        config.git_ref.set(required.git_ref)?;
        config.repo.set(required.repo)?;
        config.event_name.set(required.event_name)?;
        config.run_id.set(required.run_id)?;
        config.sha.set(required.sha)?;
        config.pr_event.set(required.pr_event)?;
        config.supported_events.set(required.supported_events)?;

        // An empty branch name counts as "not given"
        if let Some(branch) = upload_to_branch.filter(|b| !b.is_empty()) {
            config.upload_to_branch.set(branch)?;
        }

        Ok(config)
    }

    /// Short ref name (last segment of `GITHUB_REF`)
    pub fn git_ref(&self) -> &str {
        Self::text(&self.git_ref)
    }

    /// Repository as `owner/repo`
    pub fn repo(&self) -> &str {
        Self::text(&self.repo)
    }

    pub fn event_name(&self) -> &str {
        Self::text(&self.event_name)
    }

    pub fn run_id(&self) -> &str {
        Self::text(&self.run_id)
    }

    pub fn sha(&self) -> &str {
        Self::text(&self.sha)
    }

    pub fn pr_event(&self) -> &str {
        Self::text(&self.pr_event)
    }

    pub fn supported_events(&self) -> &[String] {
        self.supported_events
            .get()
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Branch images are committed to, unset when uploading to imgur
    pub fn upload_to_branch(&self) -> Option<&str> {
        self.upload_to_branch.get().ok().map(String::as_str)
    }

    // Required fields are always set by `new`
    fn text(field: &Field<String>) -> &str {
        field.get().map(String::as_str).unwrap_or_default()
    }
}

/// Action configuration assembled from the runner environment
#[derive(Debug, Clone)]
pub struct Config {
    images: Field<Vec<String>>,
    custom_attachment_msg: Field<String>,
    edit_previous_comment: Field<BoolLike, ProperBool>,
    upload_to: String,
    imgur_config: Option<ImgurConfig>,
    gh_config: GhConfig,
}

impl Config {
    /// Assemble the configuration from the process environment
    pub fn load() -> CoreResult<Self> {
        Self::from_env(&SystemEnv)
    }

    /// Assemble the configuration from `env`
    ///
    /// Returns [`CoreError::UnsupportedEvent`] when the workflow was not
    /// triggered by a pull request. The caller decides how to exit.
    pub fn from_env<E: ReadEnv + ?Sized>(env: &E) -> CoreResult<Self> {
        let mut images = Field::new("images", NoEmpty);
        images.set(parse_images(&env::required(env, INPUT_IMAGES)?))?;
        debug!(images = ?images.get()?, "Resolved images");

        let mut custom_attachment_msg = Field::new("custom_attachment_msg", NoEmpty);
        custom_attachment_msg.set(
            env::optional(env, INPUT_CUSTOM_ATTACHMENT_MSG)?
                .unwrap_or_else(|| DEFAULT_ATTACHMENT_MSG.to_string()),
        )?;

        let mut edit_previous_comment = Field::new("edit_previous_comment", ProperBool);
        edit_previous_comment.set(
            env::optional(env, INPUT_EDIT_PREVIOUS_COMMENT)?
                .map(BoolLike::Text)
                .unwrap_or(BoolLike::Bool(true)),
        )?;

        let gh_required = GhRequired::from_env(env)?;

        if !gh_required.is_supported() {
            warn!(
                event = %gh_required.event_name,
                supported = ?gh_required.supported_events,
                "Workflow triggered by an unsupported event"
            );
            return Err(CoreError::UnsupportedEvent {
                event: gh_required.event_name,
                supported: gh_required.supported_events,
            });
        }

        let upload_to =
            env::optional(env, INPUT_UPLOAD_TO)?.unwrap_or_else(|| DEFAULT_UPLOAD_TO.to_string());
        debug!(upload_to = %upload_to, "Resolved upload destination");

        let (imgur_config, gh_config) = if upload_to == UPLOAD_TO_IMGUR {
            (
                Some(ImgurConfig::new(upload_to.clone())?),
                GhConfig::new(gh_required, None)?,
            )
        } else {
            (None, GhConfig::new(gh_required, Some(upload_to.clone()))?)
        };

        let config = Self {
            images,
            custom_attachment_msg,
            edit_previous_comment,
            upload_to,
            imgur_config,
            gh_config,
        };

        info!(
            repo = config.gh_config.repo(),
            git_ref = config.gh_config.git_ref(),
            upload_to = %config.upload_to,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Image paths or glob patterns, in the order given
    pub fn images(&self) -> &[String] {
        self.images.get().map(Vec::as_slice).unwrap_or_default()
    }

    /// Heading text placed above the attached captures
    pub fn custom_attachment_msg(&self) -> &str {
        self.custom_attachment_msg
            .get()
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Whether a previous comment should be edited instead of posting a new one
    pub fn edit_previous_comment(&self) -> bool {
        self.edit_previous_comment
            .get()
            .map(BoolLike::as_bool)
            .unwrap_or(true)
    }

    /// Raw `INPUT_UPLOAD_TO` value (or its default)
    pub fn upload_to(&self) -> &str {
        &self.upload_to
    }

    pub fn upload_target(&self) -> UploadTarget<'_> {
        match self.imgur_config {
            Some(_) => UploadTarget::Imgur,
            None => UploadTarget::GithubBranch(&self.upload_to),
        }
    }

    pub fn imgur_config(&self) -> Option<&ImgurConfig> {
        self.imgur_config.as_ref()
    }

    pub fn gh_config(&self) -> &GhConfig {
        &self.gh_config
    }
}

/// Split a comma separated list, trimming each entry
///
/// Blank entries are kept; only an empty list is rejected later on.
fn parse_images(raw: &str) -> Vec<String> {
    raw.trim()
        .split(',')
        .map(|s| s.trim().to_string())
        .collect()
}
