//! Credentials and per-client configuration.

use crate::{Error, Result};
use reqwest::RequestBuilder;
use reqwest::Url;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use std::fmt;

/// Default service root.
pub const DEFAULT_BASE_URL: &str = "https://instant-api.litmus.com/v1";

/// How requests authenticate with the service.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Sent as HTTP Basic auth: the key is the username, the password is empty.
    ApiKey(String),
    /// Sent as `Authorization: Bearer <token>`.
    OAuthToken(String),
}

impl Credential {
    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::ApiKey(key) => request.basic_auth(key, Some("")),
            Self::OAuthToken(token) => request.bearer_auth(token),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
            Self::OAuthToken(_) => f.write_str("OAuthToken(<redacted>)"),
        }
    }
}

/// Base endpoint plus at most one active [`Credential`].
///
/// The two credential setters replace each other, so a request never carries
/// both Basic and Bearer authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    base_url: String,
    credential: Option<Credential>,
}

impl Config {
    /// Validate `base_url` as an absolute URL and build a config without a
    /// credential.
    pub fn new(base_url: &str) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid base url {base_url:?}: {e}")))?;
        if parsed.host_str().is_none() {
            return Err(Error::Config(format!("base url {base_url:?} has no host")));
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credential: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Install Basic auth, dropping any bearer token.
    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.credential = Some(Credential::ApiKey(api_key.into()));
    }

    /// Install a bearer token, dropping any Basic auth.
    pub fn set_oauth_token(&mut self, token: impl Into<String>) {
        self.credential = Some(Credential::OAuthToken(token.into()));
    }

    pub fn set_credential(&mut self, credential: Option<Credential>) {
        self.credential = credential;
    }

    pub fn clear_credential(&mut self) {
        self.credential = None;
    }

    /// Absolute URL for an operation path.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Headers sent on every request before credentials and per-call
    /// overrides are layered on.
    pub fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// Layer default headers, then the credential, onto a request.
    pub(crate) fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.headers(Self::default_headers());
        match &self.credential {
            Some(credential) => credential.apply(request),
            None => request,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credential: None,
        }
    }
}
