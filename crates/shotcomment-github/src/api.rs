use crate::error::{GithubError, GithubResult};
use reqwest::{
    Client, Method, Response, Url,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderName, HeaderValue},
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use shotcomment_core::{
    CoreError,
    env::{self, ReadEnv},
};
use tracing::debug;

/// Public GitHub REST API
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Media type for v3 JSON responses
pub const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// Action input holding the token used for every request
pub const INPUT_GITHUB_TOKEN: &str = "INPUT_GITHUB_TOKEN";

/// Set by runners; points at the enterprise API on GitHub Enterprise Server
pub const ENV_GITHUB_API_URL: &str = "GITHUB_API_URL";

const USER_AGENT: &str = concat!("shotcomment/", env!("CARGO_PKG_VERSION"));

/// Extra per-call parameters forwarded with a request
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    query: Vec<(String, String)>,
    headers: HeaderMap,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a query string parameter
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add a header on top of the shared ones
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// GitHub REST client with the action's fixed headers
///
/// Every request carries the same `Accept` and bearer `Authorization`
/// headers. Responses are handed back untouched: a non-2xx status is not an
/// error here, and transport failures surface as the underlying
/// [`reqwest::Error`].
#[derive(Debug, Clone)]
pub struct Req {
    client: Client,
    base_url: String,
    headers: HeaderMap,
}

impl Req {
    /// Create a client for the public GitHub API
    pub fn new(token: SecretString) -> GithubResult<Self> {
        Self::with_base_url(token, GITHUB_API_URL)
    }

    /// Create a client against a custom API base URL (enterprise or testing)
    pub fn with_base_url(token: SecretString, base_url: impl Into<String>) -> GithubResult<Self> {
        let mut authorization =
            HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|_| GithubError::InvalidToken)?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(AUTHORIZATION, authorization);

        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            headers,
        })
    }

    /// Create a client from `INPUT_GITHUB_TOKEN` and, when set, `GITHUB_API_URL`
    pub fn from_env<E: ReadEnv + ?Sized>(env: &E) -> GithubResult<Self> {
        let token = match env::required(env, INPUT_GITHUB_TOKEN) {
            Ok(token) => SecretString::from(token),
            Err(CoreError::MissingConfig(_)) => return Err(GithubError::MissingToken),
            Err(e) => return Err(e.into()),
        };
        let base_url = env::optional(env, ENV_GITHUB_API_URL)?
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| GITHUB_API_URL.to_string());

        debug!(base_url = %base_url, "GitHub client configured");
        Self::with_base_url(token, base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join `path` onto the API base URL
    ///
    /// # Arguments
    /// * `path` - API path such as `repos/owner/repo/issues/1/comments`; a
    ///   leading `/` is optional
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Headers attached to every request
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Send a GET request
    pub async fn get(&self, url: &str) -> reqwest::Result<Response> {
        debug!(method = "GET", url, "GitHub API request");
        self.client
            .get(url)
            .headers(self.headers.clone())
            .send()
            .await
    }

    /// Send a POST request with a `{"body": data}` JSON payload
    ///
    /// # Arguments
    /// * `url` - Absolute request URL
    /// * `data` - Comment text or any JSON value, placed under `body`
    /// * `options` - Extra query parameters and headers for this call
    pub async fn post(
        &self,
        url: &str,
        data: impl Into<Value>,
        options: &RequestOptions,
    ) -> reqwest::Result<Response> {
        self.send_body(Method::POST, url, data.into(), options).await
    }

    /// Send a PATCH request with a `{"body": data}` JSON payload
    ///
    /// Used to edit an existing resource such as a previous comment.
    pub async fn patch(
        &self,
        url: &str,
        data: impl Into<Value>,
        options: &RequestOptions,
    ) -> reqwest::Result<Response> {
        self.send_body(Method::PATCH, url, data.into(), options).await
    }

    async fn send_body(
        &self,
        method: Method,
        url: &str,
        data: Value,
        options: &RequestOptions,
    ) -> reqwest::Result<Response> {
        debug!(method = %method, url, "GitHub API request");

        let mut request = match with_query(url, &options.query) {
            Some(target) => self.client.request(method, target),
            // Unparseable URLs go through as-is so reqwest reports them on send
            None => self.client.request(method, url),
        };

        let mut headers = self.headers.clone();
        headers.extend(options.headers.clone());
        request = request.headers(headers).json(&json!({ "body": data }));

        request.send().await
    }
}

/// Attach query pairs to `url`, or `None` when there is nothing to attach or
/// the URL does not parse
fn with_query(url: &str, query: &[(String, String)]) -> Option<Url> {
    if query.is_empty() {
        return None;
    }

    let mut target = Url::parse(url).ok()?;
    target.query_pairs_mut().extend_pairs(query);
    Some(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> SecretString {
        SecretString::from("test-token".to_string())
    }

    #[test]
    fn test_fixed_headers() {
        let req = Req::new(token()).unwrap();
        let headers = req.headers();

        assert_eq!(headers.get(ACCEPT).unwrap(), "application/vnd.github.v3+json");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer test-token");
        assert!(headers.get(AUTHORIZATION).unwrap().is_sensitive());
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_default_base_url() {
        let req = Req::new(token()).unwrap();
        assert_eq!(req.base_url(), "https://api.github.com");
    }

    #[test]
    fn test_api_url_joins_paths() {
        let req = Req::with_base_url(token(), "https://ghe.example.com/api/v3/").unwrap();
        assert_eq!(
            req.api_url("/repos/octo/site/issues/3/comments"),
            "https://ghe.example.com/api/v3/repos/octo/site/issues/3/comments"
        );
        assert_eq!(
            req.api_url("repos/octo/site"),
            "https://ghe.example.com/api/v3/repos/octo/site"
        );
    }

    #[test]
    fn test_token_with_newline_rejected() {
        let result = Req::new(SecretString::from("bad\ntoken".to_string()));
        assert!(matches!(result, Err(GithubError::InvalidToken)));
    }

    #[test]
    fn test_with_query() {
        let query = vec![
            ("per_page".to_string(), "100".to_string()),
            ("sort".to_string(), "created".to_string()),
        ];
        let url = with_query("https://api.github.com/repos/o/r/issues/1/comments", &query).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/o/r/issues/1/comments?per_page=100&sort=created"
        );

        assert!(with_query("https://api.github.com", &[]).is_none());
        assert!(with_query("not a url", &query).is_none());
    }

    #[test]
    fn test_debug_output_hides_token() {
        let req = Req::new(token()).unwrap();
        assert!(!format!("{:?}", req).contains("test-token"));
    }
}
