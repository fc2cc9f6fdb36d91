//! Core HTTP client for the portal's realtime endpoints

use std::sync::Arc;

use chrono::Local;
use compact_str::CompactString;
use reqwest::{
    Client, Response,
    cookie::Jar,
    header::{CACHE_CONTROL, CONTENT_TYPE, EXPIRES, HeaderMap, HeaderValue, PRAGMA},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

use super::{
    config::ClientConfig,
    error::{ClientError, Result},
};
use crate::{
    domain::{FeedItem, FeedPage},
    id::NotificationId,
};

/// Pure HTTP client for the realtime API
#[derive(Debug)]
pub struct RealtimeApi {
    client: Client,
    config: ClientConfig,
}

/// Error body the portal sends with non-2xx responses
#[derive(Debug, Deserialize)]
struct PortalError {
    message: CompactString,
}

#[derive(Debug, Serialize)]
struct MarkReadRequest<'a> {
    ids: &'a [NotificationId],
}

impl RealtimeApi {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = Self::build_client(&config)?;

        Ok(Self { client, config })
    }

    /// Fetch the items of `T`'s stream newer than `since`
    #[instrument(skip(self), fields(stream = %T::STREAM))]
    pub async fn get_feed<T: FeedItem>(&self, since: u64) -> Result<FeedPage<T>> {
        let stream = T::STREAM;
        let mut url = self.endpoint(&["api", "realtime", stream.path()])?;
        url.query_pairs_mut()
            .append_pair("since", &since.to_string());

        let response = self.client.get(url).send().await?;
        let page: FeedPage<T> = self.handle_response(response).await?;

        page.check(since)
            .map_err(|message| ClientError::invalid_feed(stream, message))?;

        debug!(
            item_count = page.items.len(),
            last_id = page.last_id,
            "Successfully fetched feed page"
        );
        Ok(page)
    }

    /// Mark the given notifications as read
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn mark_notifications_read(&self, ids: &[NotificationId]) -> Result<()> {
        let url = self.endpoint(&["api", "realtime", "notifications", "read"])?;
        let body = serde_json::to_string(&MarkReadRequest { ids })
            .map_err(|e| ClientError::json_parse(url.path(), "Failed to encode request", e))?;

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        self.expect_success(response).await
    }

    /// Mark every notification of the session's user as read
    #[instrument(skip(self))]
    pub async fn mark_all_notifications_read(&self) -> Result<()> {
        let url = self.endpoint(&["api", "realtime", "notifications", "read-all"])?;
        let response = self.client.post(url).send().await?;

        self.expect_success(response).await
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the HTTP client: session cookie in a jar, cache busting on every request
    fn build_client(config: &ClientConfig) -> Result<Client> {
        let jar = Arc::new(Jar::default());
        if let Some(cookie) = &config.session_cookie {
            jar.add_cookie_str(cookie, &config.origin()?);
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        );
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(EXPIRES, HeaderValue::from_static("0"));

        Client::builder()
            .timeout(config.request.timeout)
            .default_headers(headers)
            .cookie_provider(jar)
            .user_agent(concat!("jobwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Http)
    }

    /// Absolute URL for an API path, keeping any path prefix of the base URL
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.config.origin()?;
        url.path_segments_mut()
            .map_err(|_| ClientError::invalid_url(self.config.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Handle HTTP response and deserialize JSON
    async fn handle_response<T>(&self, response: Response) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url_path = response.url().path().to_string();
        let status = response.status();
        let body = response.text().await?;

        if self.config.debug.log_responses {
            self.log_response_to_file(&url_path, &body);
        }

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| {
                warn!(endpoint = %url_path, error = %e, "Failed to parse response body");
                ClientError::json_parse(url_path, "Failed to parse response", e)
            })
        } else {
            Err(self.error_from_response(status.as_u16(), status.canonical_reason(), &body))
        }
    }

    /// Succeeds on any 2xx, the body is ignored
    async fn expect_success(&self, response: Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(self.error_from_response(status.as_u16(), status.canonical_reason(), &body))
    }

    /// Map a non-2xx response to a client error
    fn error_from_response(&self, status: u16, reason: Option<&str>, body: &str) -> ClientError {
        let message: CompactString = serde_json::from_str::<PortalError>(body)
            .map(|e| e.message)
            .unwrap_or_else(|_| match reason {
                Some(reason) if body.trim().is_empty() => reason.into(),
                _ => body.trim().into(),
            });

        match status {
            401 => ClientError::Unauthorized { status },
            403 => ClientError::Forbidden { status, message },
            _ => ClientError::api(status, message),
        }
    }

    /// Log HTTP response to file for debugging
    fn log_response_to_file(&self, path: &str, body: &str) {
        if let Some(log_dir) = &self.config.debug.log_directory {
            if !log_dir.exists()
                && let Err(e) = std::fs::create_dir_all(log_dir)
            {
                warn!("Failed to create log directory: {}", e);
                return;
            }

            let filename = format!(
                "{}_{}.json",
                Local::now().format("%Y-%m-%d_%H-%M-%S%.3f"),
                path.replace('/', "_")
            );

            let log_path = log_dir.join(filename);

            if let Err(e) = std::fs::write(&log_path, body) {
                warn!("Failed to write response log to {:?}: {}", log_path, e);
            } else {
                debug!("Response logged to {:?}", log_path);
            }
        }
    }
}
