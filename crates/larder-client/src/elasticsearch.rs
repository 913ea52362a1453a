use async_trait::async_trait;
use larder_core::config::HttpConfig;
use larder_core::error::AppError;
use larder_core::models::{ClusterHealth, IndexDocument, SearchResponse, WildcardQuery};
use larder_core::search::SearchClient;
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

/// Longest wait between two attempts of a read-only request.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// HTTP client for an Elasticsearch cluster.
///
/// Read-only requests (cluster health, index existence, search) are retried
/// on connection failures, timeouts, rate limiting and server errors. Writes
/// are sent once: a retried index request could store a duplicate document.
///
/// # Examples
///
/// ```no_run
/// use larder_client::ElasticsearchClient;
/// use larder_core::{HttpConfig, SearchClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ElasticsearchClient::new("http://localhost:9200", &HttpConfig::default())?;
/// let health = client.cluster_health().await?;
/// println!("cluster is {}", health.status);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ElasticsearchClient {
    client: Client,
    base_url: Url,
    timeout: Duration,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl ElasticsearchClient {
    /// Creates a client for the cluster at `base_url_str`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidUrl` if the URL is malformed or cannot be a base.
    /// Returns `AppError::IndexError` if the HTTP client cannot be built.
    pub fn new(base_url_str: &str, config: &HttpConfig) -> Result<Self, AppError> {
        let mut base_url = Url::parse(base_url_str)
            .map_err(|e| AppError::InvalidUrl(format!("{}: {}", base_url_str, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::InvalidUrl(base_url_str.to_string()));
        }
        // Url::join drops the last segment unless the path ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .user_agent("Larder/0.1")
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::IndexError(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            timeout: config.timeout,
            max_retries: config.max_retries.max(1),
            retry_base_delay: config.retry_base_delay,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, AppError> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::InvalidUrl(format!("{}: {}", path, e)))
    }

    fn transport_error(&self, e: reqwest::Error) -> AppError {
        if e.is_timeout() {
            AppError::Timeout(self.timeout.as_secs())
        } else if e.is_connect() {
            AppError::IndexUnavailable(format!("Connection failed: {}", e))
        } else {
            AppError::IndexError(e.to_string())
        }
    }

    /// Sends a read-only request with retry and exponential backoff.
    ///
    /// Returns the response for any status other than 429 or 5xx; the caller
    /// decides what the status means.
    async fn request_with_retry(
        &self,
        method: Method,
        url: &Url,
        body: Option<&Value>,
    ) -> Result<Response, AppError> {
        let mut last_error = AppError::IndexError("No attempts made".to_string());

        for attempt in 1..=self.max_retries {
            let mut request = self.client.request(method.clone(), url.clone());
            if let Some(body) = body {
                request = request.json(body);
            }

            let delay = match request.send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status == StatusCode::TOO_MANY_REQUESTS {
                        last_error = AppError::IndexError(format!("HTTP 429 from {}", url));
                        backoff(self.retry_base_delay, 2_u32.saturating_pow(attempt.min(16)))
                    } else if status.is_server_error() {
                        last_error = AppError::IndexError(format!(
                            "Server error: HTTP {} from {}",
                            status.as_u16(),
                            url
                        ));
                        backoff(self.retry_base_delay, attempt)
                    } else {
                        return Ok(resp);
                    }
                }
                Err(e) => {
                    last_error = self.transport_error(e);
                    if !last_error.is_retryable() {
                        return Err(last_error);
                    }
                    backoff(self.retry_base_delay, attempt)
                }
            };

            if attempt < self.max_retries {
                warn!(
                    "{} {} failed (attempt {}/{}): {}",
                    method, url, attempt, self.max_retries, last_error
                );
                sleep(delay).await;
            }
        }

        Err(last_error)
    }

    /// Sends a write request exactly once.
    async fn send_once(&self, method: Method, url: &Url, body: &Value) -> Result<Response, AppError> {
        self.client
            .request(method, url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))
    }
}

/// Scales `base` by `factor`, capped at [`MAX_RETRY_DELAY`].
fn backoff(base: Duration, factor: u32) -> Duration {
    base.checked_mul(factor)
        .unwrap_or(MAX_RETRY_DELAY)
        .min(MAX_RETRY_DELAY)
}

/// Turns a non-2xx response into `AppError::IndexError`, keeping the body.
async fn error_for_status(resp: Response) -> Result<Response, AppError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let url = resp.url().clone();
    let body = resp.text().await.unwrap_or_default();
    Err(AppError::IndexError(format!(
        "HTTP {} from {}: {}",
        status.as_u16(),
        url,
        body
    )))
}

async fn json_body<T: serde::de::DeserializeOwned>(resp: Response) -> Result<T, AppError> {
    resp.json()
        .await
        .map_err(|e| AppError::IndexError(format!("Failed to parse response: {}", e)))
}

#[async_trait]
impl SearchClient for ElasticsearchClient {
    async fn cluster_health(&self) -> Result<ClusterHealth, AppError> {
        let url = self.endpoint("_cluster/health")?;
        let resp = self
            .request_with_retry(Method::GET, &url, None)
            .await
            .map_err(|e| match e {
                AppError::IndexUnavailable(_) => e,
                other => AppError::IndexUnavailable(other.to_string()),
            })?;
        let resp = error_for_status(resp).await?;
        json_body(resp).await
    }

    async fn index_exists(&self, index: &str) -> Result<bool, AppError> {
        let url = self.endpoint(index)?;
        let resp = self.request_with_retry(Method::HEAD, &url, None).await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(false),
            _ => error_for_status(resp).await.map(|_| true),
        }
    }

    async fn create_index(&self, index: &str, mapping: &Value) -> Result<(), AppError> {
        let url = self.endpoint(index)?;
        debug!("creating index {}", index);
        let resp = self.send_once(Method::PUT, &url, mapping).await?;
        error_for_status(resp).await?;
        Ok(())
    }

    async fn index_document(
        &self,
        index: &str,
        document: &IndexDocument,
    ) -> Result<Value, AppError> {
        let url = self.endpoint(&format!("{}/_doc", index))?;
        let body = serde_json::to_value(document)?;
        let resp = self.send_once(Method::POST, &url, &body).await?;
        let resp = error_for_status(resp).await?;
        json_body(resp).await
    }

    async fn delete_by_query(
        &self,
        index: &str,
        query: &WildcardQuery,
    ) -> Result<Value, AppError> {
        let url = self.endpoint(&format!("{}/_delete_by_query", index))?;
        let resp = self.send_once(Method::POST, &url, &query.to_body()).await?;
        let resp = error_for_status(resp).await?;
        let result: Value = json_body(resp).await?;
        debug!("delete_by_query on {} removed {}", index, result["deleted"]);
        Ok(result)
    }

    async fn search(&self, scope: &str, query: &WildcardQuery) -> Result<SearchResponse, AppError> {
        let url = self.endpoint(&format!("{}/_search", scope))?;
        let resp = self
            .request_with_retry(Method::POST, &url, Some(&query.to_body()))
            .await?;
        let resp = error_for_status(resp).await?;
        json_body(resp).await
    }
}
