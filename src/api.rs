//! Operations shared by [`Client`](crate::Client) and
//! [`SharedClient`](crate::SharedClient).

use crate::models::{
    EmailHandle, EmailSource, ImageUrlOptions, PreviewConfiguration, PreviewOptions, PreviewUrls,
    preview_urls,
};
use crate::pipeline::{Pipeline, RequestOptions};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// Verb operations and preview endpoints.
///
/// Implementors only provide [`PreviewApi::pipeline`], a snapshot of their
/// transport and configuration. Every operation routes through
/// [`Pipeline::execute`], so all of them translate failures the same way.
#[async_trait]
pub trait PreviewApi: Send + Sync {
    /// Transport plus the configuration to use for the next request.
    fn pipeline(&self) -> Pipeline;

    /// Send a request with any HTTP method.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        options: RequestOptions,
    ) -> Result<Value> {
        self.pipeline().execute(method, path, body, options).await
    }

    async fn get(&self, path: &str, options: RequestOptions) -> Result<Value> {
        self.request(Method::GET, path, None, options).await
    }

    async fn head(&self, path: &str, options: RequestOptions) -> Result<Value> {
        self.request(Method::HEAD, path, None, options).await
    }

    async fn post(
        &self,
        path: &str,
        body: Option<&Value>,
        options: RequestOptions,
    ) -> Result<Value> {
        self.request(Method::POST, path, body, options).await
    }

    async fn put(&self, path: &str, body: Option<&Value>, options: RequestOptions) -> Result<Value> {
        self.request(Method::PUT, path, body, options).await
    }

    async fn patch(
        &self,
        path: &str,
        body: Option<&Value>,
        options: RequestOptions,
    ) -> Result<Value> {
        self.request(Method::PATCH, path, body, options).await
    }

    async fn delete(&self, path: &str, options: RequestOptions) -> Result<Value> {
        self.request(Method::DELETE, path, None, options).await
    }

    /// Upload email content and get a handle for requesting previews.
    ///
    /// # Examples
    /// ```no_run
    /// # use instant_preview_client::{Client, EmailSource, PreviewApi};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), instant_preview_client::Error> {
    /// let client = Client::with_api_key("my-api-key")?;
    /// let email = EmailSource::from_html("<h1>Hello</h1>").with_subject("Hi");
    /// let handle = client.create_email(&email).await?;
    /// println!("{}", handle.email_guid);
    /// # Ok(())
    /// # }
    /// ```
    async fn create_email(&self, email: &EmailSource) -> Result<EmailHandle> {
        let body = encode(email)?;
        let payload = self.post("/emails", Some(&body), RequestOptions::new()).await?;
        decode(payload)
    }

    /// Names of the supported render targets.
    async fn clients(&self) -> Result<Vec<String>> {
        decode(self.get("/clients", RequestOptions::new()).await?)
    }

    /// Orientation and image options each render target supports.
    async fn client_configurations(&self) -> Result<BTreeMap<String, Value>> {
        decode(
            self.get("/clients/configurations", RequestOptions::new())
                .await?,
        )
    }

    /// Request a preview and wait for the capture to finish.
    ///
    /// Returns the image URL for each capture size.
    async fn get_preview(
        &self,
        email_guid: &str,
        client: &str,
        options: &PreviewOptions,
    ) -> Result<PreviewUrls> {
        let path = segment_path(&["emails", email_guid, "previews", client])?;
        let options = RequestOptions::new().query_pairs(options.query_pairs());
        let payload = self.get(&path, options).await?;
        Ok(preview_urls(&payload))
    }

    /// Start captures without waiting for them.
    ///
    /// Invalid requests fail here. A capture that fails later only shows up
    /// when that preview is requested with [`PreviewApi::get_preview`].
    async fn prefetch_previews(
        &self,
        email_guid: &str,
        configurations: &[PreviewConfiguration],
    ) -> Result<Value> {
        let path = segment_path(&["emails", email_guid, "previews", "prefetch"])?;
        let body = json!({ "configurations": encode(&configurations)? });
        self.post(&path, Some(&body), RequestOptions::new()).await
    }

    /// Build an embeddable image URL. No request is made.
    ///
    /// The host is prefixed with the render target name so embedding pages
    /// spread image loads across origins.
    ///
    /// # Examples
    /// ```
    /// # use instant_preview_client::{Client, ImageUrlOptions, PreviewApi};
    /// # fn main() -> Result<(), instant_preview_client::Error> {
    /// let client = Client::new()?;
    /// let url = client.preview_image_url(
    ///     "abc123",
    ///     "outlook2016",
    ///     &ImageUrlOptions::default().capture_size("thumb"),
    /// )?;
    /// assert_eq!(
    ///     url,
    ///     "https://outlook2016.instant-api.litmus.com/v1/emails/abc123/previews/outlook2016/thumb"
    /// );
    /// # Ok(())
    /// # }
    /// ```
    fn preview_image_url(
        &self,
        email_guid: &str,
        client: &str,
        options: &ImageUrlOptions,
    ) -> Result<String> {
        let pipeline = self.pipeline();
        let base_url = pipeline.config().base_url();
        let base = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid base url {base_url:?}: {e}")))?;
        let host = base
            .host_str()
            .ok_or_else(|| Error::Config(format!("base url {base_url:?} has no host")))?;

        let mut url = base.clone();
        url.set_host(Some(format!("{client}.{host}").as_str()))
            .map_err(|e| Error::Config(format!("cannot prefix host with {client:?}: {e}")))?;

        let size = options.capture_size.as_deref().unwrap_or("full");
        url.path_segments_mut()
            .map_err(|()| Error::Config(format!("base url {base_url:?} cannot hold a path")))?
            .pop_if_empty()
            .extend(["emails", email_guid, "previews", client, size]);
        url.set_query(None);

        let pairs = options.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url.into())
    }
}

/// Join path segments, percent-encoding each one so a handle or render
/// target can never add segments or a query.
fn segment_path(segments: &[&str]) -> Result<String> {
    let mut url = Url::parse("http://segments.invalid/")
        .map_err(|e| Error::Config(format!("cannot build request path: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| Error::Config("cannot build request path".to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url.path().to_string())
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| Error::Config(format!("unencodable request body: {e}")))
}

/// Fit a success payload to an endpoint model. A mismatch is a malformed
/// response.
fn decode<T: DeserializeOwned>(payload: Value) -> Result<T> {
    serde_json::from_value(payload)
        .map_err(|e| Error::Network(format!("unexpected response shape: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_are_escaped() {
        assert_eq!(
            segment_path(&["emails", "abc123", "previews", "gmailw"]).unwrap(),
            "/emails/abc123/previews/gmailw"
        );
        assert_eq!(
            segment_path(&["emails", "a/b?c#d%"]).unwrap(),
            "/emails/a%2Fb%3Fc%23d%25"
        );
    }
}
