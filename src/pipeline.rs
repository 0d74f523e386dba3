//! The shared request path every verb operation goes through.

use crate::credential::Config;
use crate::{Error, Result, challenge};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, WWW_AUTHENTICATE};
use reqwest::{Method, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

/// Per-call headers and query parameters.
///
/// Headers set here override both the JSON defaults and the credential's
/// `Authorization` header.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    headers: HeaderMap,
    query: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a single header, replacing any earlier value for the same name.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Merge a header map into these options.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Append a query parameter. Repeated keys are sent repeatedly.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append several query parameters.
    pub fn query_pairs<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

/// A configuration snapshot bound to an HTTP transport.
///
/// Cheap to clone: `reqwest::Client` is reference counted and [`Config`] is a
/// URL plus one credential.
#[derive(Debug, Clone)]
pub struct Pipeline {
    http: reqwest::Client,
    config: Config,
}

impl Pipeline {
    pub fn new(http: reqwest::Client, config: Config) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Perform one request and translate its outcome.
    ///
    /// Returns the decoded JSON body for a 2xx status. Transport failures
    /// become [`Error::Network`] without looking at any status; non-2xx
    /// responses become the matching API error.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        options: RequestOptions,
    ) -> Result<Value> {
        let url = self.config.url(path);
        debug!(%method, %url, "dispatching request");

        let mut request = self
            .config
            .authorize(self.http.request(method.clone(), &url));
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        if let Some(body) = body {
            request = request.body(body.to_string());
        }
        request = request.headers(options.headers);

        let response = request.send().await.map_err(|e| {
            let err = Error::from(e);
            warn!(%method, %url, error = %err, "transport failure");
            err
        })?;

        let status = response.status();
        let result = interpret(response).await;
        match &result {
            Ok(_) => debug!(%method, %url, %status, "request succeeded"),
            Err(err) => warn!(%method, %url, %status, error = %err, "request failed"),
        }
        result
    }
}

async fn interpret(response: Response) -> Result<Value> {
    let status = response.status();
    let challenge = www_authenticate(response.headers());
    let body = response.bytes().await?;

    if status.is_success() {
        decode_success(&body)
    } else {
        Err(error_for(status, challenge.as_deref(), &body))
    }
}

/// Decode a 2xx body. An empty body is JSON `null`.
pub(crate) fn decode_success(body: &[u8]) -> Result<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body)
        .map_err(|e| Error::Network(format!("malformed response body: {e}")))
}

/// Build the error for a non-2xx response.
///
/// A recognised bearer challenge wins over the status code.
pub(crate) fn error_for(status: StatusCode, challenge: Option<&str>, body: &[u8]) -> Error {
    if let Some(err) = challenge.and_then(challenge::refine) {
        return err;
    }
    Error::from_status(status, description(body))
}

/// The body's `description` field, or an empty string.
fn description(body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.get("description").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_default()
}

fn www_authenticate(headers: &HeaderMap) -> Option<String> {
    let values: Vec<&str> = headers
        .get_all(WWW_AUTHENTICATE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn body_description_becomes_message() {
        let body = br#"{"description": "email_guid is unknown"}"#;
        assert_eq!(
            error_for(StatusCode::NOT_FOUND, None, body),
            Error::NotFound("email_guid is unknown".into())
        );
    }

    #[test]
    fn missing_or_garbled_body_gives_empty_message() {
        assert_eq!(
            error_for(StatusCode::INTERNAL_SERVER_ERROR, None, b"<html>oops</html>"),
            Error::Service(String::new())
        );
        assert_eq!(
            error_for(StatusCode::BAD_REQUEST, None, b""),
            Error::Request(String::new())
        );
        assert_eq!(
            error_for(StatusCode::BAD_REQUEST, None, br#"{"description": 5}"#),
            Error::Request(String::new())
        );
    }

    #[test]
    fn challenge_overrides_status() {
        let challenge =
            r#"Bearer realm="instant", error="invalid_token", error_description="expired""#;
        let body = br#"{"description": "ignored"}"#;
        assert_eq!(
            error_for(StatusCode::UNAUTHORIZED, Some(challenge), body),
            Error::InvalidOAuthToken("expired".into())
        );
        assert_eq!(
            error_for(StatusCode::BAD_REQUEST, Some(challenge), body),
            Error::InvalidOAuthToken("expired".into())
        );
    }

    #[test]
    fn unrecognised_challenge_falls_back_to_status() {
        let challenge = r#"Bearer realm="instant", error="other", error_description="x""#;
        assert_eq!(
            error_for(
                StatusCode::FORBIDDEN,
                Some(challenge),
                br#"{"description":"no"}"#
            ),
            Error::Authorization("no".into())
        );
    }

    #[test]
    fn success_bodies() {
        assert_eq!(decode_success(b"").unwrap(), Value::Null);
        assert_eq!(decode_success(b"[1,2]").unwrap(), json!([1, 2]));
        assert_eq!(decode_success(b"\"ok\"").unwrap(), json!("ok"));
        assert!(matches!(decode_success(b"{nope"), Err(Error::Network(_))));
    }

    #[test]
    fn joins_multiple_challenge_headers() {
        let mut headers = HeaderMap::new();
        headers.append(WWW_AUTHENTICATE, HeaderValue::from_static("Basic realm=\"x\""));
        headers.append(
            WWW_AUTHENTICATE,
            HeaderValue::from_static("Bearer realm=\"y\""),
        );
        assert_eq!(
            www_authenticate(&headers).as_deref(),
            Some("Basic realm=\"x\", Bearer realm=\"y\"")
        );
        assert_eq!(www_authenticate(&HeaderMap::new()), None);
    }
}
