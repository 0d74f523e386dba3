//! Instant API async client implementations.

use crate::api::PreviewApi;
use crate::credential::{Config, Credential, DEFAULT_BASE_URL};
use crate::pipeline::Pipeline;
use crate::{Error, Result};
use std::sync::{OnceLock, PoisonError, RwLock};
use std::time::Duration;

/// Async client bound to its own credential.
///
/// Every `Client` owns its configuration. Changing the credential needs
/// `&mut self`, so clients shared between tasks keep the identity they were
/// built with. Create one per end user when serving several OAuth-connected
/// users from one process.
///
/// Use [`Client::with_api_key`] or [`Client::with_oauth_token`] for defaults,
/// or [`Client::builder`] for custom settings like proxies, timeouts and a
/// custom user agent.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    config: Config,
    proxy: Option<String>,
}

impl Client {
    /// Create a builder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Client for the default endpoint without a credential.
    pub fn new() -> Result<Self> {
        ClientBuilder::new().build()
    }

    /// Client authenticating with HTTP Basic auth.
    ///
    /// # Examples
    /// ```no_run
    /// # use instant_preview_client::{Client, PreviewApi};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), instant_preview_client::Error> {
    /// let client = Client::with_api_key("my-api-key")?;
    /// for name in client.clients().await? {
    ///     println!("{name}");
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self> {
        ClientBuilder::new().api_key(api_key).build()
    }

    /// Client acting on behalf of one OAuth-connected end user.
    pub fn with_oauth_token(token: impl Into<String>) -> Result<Self> {
        ClientBuilder::new().oauth_token(token).build()
    }

    pub fn with_credential(credential: Credential) -> Result<Self> {
        ClientBuilder::new().credential(credential).build()
    }

    /// Get the proxy URL if one was configured.
    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Switch to Basic auth. Any OAuth token is dropped.
    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.config.set_api_key(api_key);
    }

    /// Switch to bearer auth. Any API key is dropped.
    pub fn set_oauth_token(&mut self, token: impl Into<String>) {
        self.config.set_oauth_token(token);
    }

    pub fn clear_credential(&mut self) {
        self.config.clear_credential();
    }
}

impl PreviewApi for Client {
    fn pipeline(&self) -> Pipeline {
        Pipeline::new(self.http.clone(), self.config.clone())
    }
}

/// Client whose configuration can be changed through a shared reference.
///
/// Meant for applications with a single identity: configure it once at
/// startup, then use it anywhere. Requests take a snapshot of the
/// configuration when they start, so a setter never affects a request in
/// flight. It is not suitable for acting as several end users at once;
/// concurrent setters race and requests go out with whichever credential
/// was set last. Use [`SharedClient::isolated`] or [`Client`] for that.
#[derive(Debug)]
pub struct SharedClient {
    http: reqwest::Client,
    config: RwLock<Config>,
    proxy: Option<String>,
}

impl SharedClient {
    /// Shared client for the default endpoint without a credential, with
    /// the same transport defaults as [`ClientBuilder`].
    pub fn new() -> Result<Self> {
        ClientBuilder::new().build().map(Self::from_client)
    }

    /// Turn a built [`Client`] into a shared one.
    pub fn from_client(client: Client) -> Self {
        Self::from_parts(client.http, client.config, client.proxy)
    }

    fn from_parts(http: reqwest::Client, config: Config, proxy: Option<String>) -> Self {
        Self {
            http,
            config: RwLock::new(config),
            proxy,
        }
    }

    /// Copy of the current configuration.
    pub fn config(&self) -> Config {
        self.read().clone()
    }

    pub fn set_api_key(&self, api_key: impl Into<String>) {
        self.write(|config| config.set_api_key(api_key));
    }

    pub fn set_oauth_token(&self, token: impl Into<String>) {
        self.write(|config| config.set_oauth_token(token));
    }

    pub fn clear_credential(&self) {
        self.write(Config::clear_credential);
    }

    /// Point at another service root. The credential is kept.
    pub fn set_base_url(&self, base_url: &str) -> Result<()> {
        let mut replacement = Config::new(base_url)?;
        self.write(|config| {
            replacement.set_credential(config.credential().cloned());
            *config = replacement;
        });
        Ok(())
    }

    /// A [`Client`] with this endpoint and connection pool but its own
    /// credential.
    pub fn isolated(&self, credential: Credential) -> Client {
        let mut config = self.config();
        config.set_credential(Some(credential));
        Client {
            http: self.http.clone(),
            config,
            proxy: self.proxy.clone(),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Config> {
        self.config.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, update: impl FnOnce(&mut Config)) {
        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        update(&mut config);
    }
}

impl PreviewApi for SharedClient {
    fn pipeline(&self) -> Pipeline {
        Pipeline::new(self.http.clone(), self.config())
    }
}

static SHARED: OnceLock<SharedClient> = OnceLock::new();

/// Process-wide [`SharedClient`], created on first use.
///
/// Fails with [`Error::Config`] only if the HTTP client cannot be built;
/// later calls retry the initialisation.
///
/// # Examples
/// ```no_run
/// # use instant_preview_client::PreviewApi;
/// # #[tokio::main]
/// # async fn main() -> Result<(), instant_preview_client::Error> {
/// let shared = instant_preview_client::shared()?;
/// shared.set_api_key("my-api-key");
/// let clients = shared.clients().await?;
/// # Ok(())
/// # }
/// ```
pub fn shared() -> Result<&'static SharedClient> {
    if let Some(client) = SHARED.get() {
        return Ok(client);
    }
    let client = SharedClient::new()?;
    Ok(SHARED.get_or_init(|| client))
}

const USER_AGENT_VALUE: &str = concat!("instant-preview-client/", env!("CARGO_PKG_VERSION"));

/// Builder for configuring a [`Client`].
///
/// Start with [`Client::builder`] to override defaults.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    base_url: String,
    credential: Option<Credential>,
    proxy: Option<String>,
    danger_accept_invalid_certs: bool,
    user_agent: String,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults:
    /// - Default Instant API endpoint
    /// - No credential
    /// - No proxy
    /// - `danger_accept_invalid_certs = false`
    /// - `instant-preview-client/<version>` user agent
    /// - No transport timeout
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credential: None,
            proxy: None,
            danger_accept_invalid_certs: false,
            user_agent: USER_AGENT_VALUE.to_string(),
            timeout: None,
        }
    }

    /// Override the service root.
    ///
    /// Useful for testing against a local server.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Authenticate with an API key. Replaces any earlier credential.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.credential = Some(Credential::ApiKey(api_key.into()));
        self
    }

    /// Authenticate with an OAuth token. Replaces any earlier credential.
    pub fn oauth_token(mut self, token: impl Into<String>) -> Self {
        self.credential = Some(Credential::OAuthToken(token.into()));
        self
    }

    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Set a proxy URL (e.g., "http://127.0.0.1:8080" or "socks5://...").
    ///
    /// This uses reqwest's proxy support for all requests.
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Control whether to accept invalid TLS certificates (default: false).
    pub fn danger_accept_invalid_certs(mut self, value: bool) -> Self {
        self.danger_accept_invalid_certs = value;
        self
    }

    /// Override the default user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Fail requests that take longer than `timeout` with a network error.
    ///
    /// Preview requests block until the capture finishes, so keep this
    /// generous.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client. No request is made.
    ///
    /// # Examples
    /// ```no_run
    /// # use instant_preview_client::Client;
    /// # fn main() -> Result<(), instant_preview_client::Error> {
    /// let client = Client::builder()
    ///     .oauth_token("end-user-token")
    ///     .user_agent("my-app/1.0")
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn build(self) -> Result<Client> {
        let mut config = Config::new(&self.base_url)?;
        config.set_credential(self.credential);

        let mut builder = reqwest::Client::builder()
            .danger_accept_invalid_certs(self.danger_accept_invalid_certs)
            .user_agent(self.user_agent);

        if let Some(proxy_url) = &self.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| Error::Config(format!("invalid proxy {proxy_url:?}: {e}")))?;
            builder = builder.proxy(proxy);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|e| Error::Config(format!("cannot build http client: {e}")))?;

        Ok(Client {
            http,
            config,
            proxy: self.proxy,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
