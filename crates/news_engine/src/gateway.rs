use std::time::Duration;

use engine_logging::{engine_debug, engine_info};
use futures_util::StreamExt;
use news_core::{FailureKind, FetchError, News};

/// Path of the paginated top-headlines endpoint.
pub const TOP_HEADLINES_PATH: &str = "/v2/top-headlines";

const API_KEY_HEADER: &str = "X-Api-Key";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub page_size: Option<u32>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            base_url: "https://newsapi.org".to_string(),
            api_key: None,
            page_size: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Single-shot source of news pages.
#[async_trait::async_trait]
pub trait NewsGateway: Send + Sync {
    async fn fetch(&self, country: &str, page: &str) -> Result<News, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestNewsGateway {
    settings: FetchSettings,
    client: reqwest::Client,
}

impl ReqwestNewsGateway {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn request_url(&self, country: &str, page: &str) -> Result<reqwest::Url, FetchError> {
        let base = self.settings.base_url.trim_end_matches('/');
        let mut url = reqwest::Url::parse(&format!("{base}{TOP_HEADLINES_PATH}"))
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("country", country);
            query.append_pair("page", page);
            if let Some(page_size) = self.settings.page_size {
                query.append_pair("pageSize", &page_size.to_string());
            }
        }
        Ok(url)
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, FetchError> {
        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, content_len));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, next_len));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl NewsGateway for ReqwestNewsGateway {
    async fn fetch(&self, country: &str, page: &str) -> Result<News, FetchError> {
        let url = self.request_url(country, page)?;
        engine_debug!("GET {} country={} page={}", TOP_HEADLINES_PATH, country, page);

        let mut request = self.client.get(url);
        if let Some(key) = self.settings.api_key.as_deref() {
            request = request.header(API_KEY_HEADER, key);
        }
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            // The endpoint explains rejections in a JSON body; prefer its message.
            let message = self
                .read_body(response)
                .await
                .ok()
                .and_then(|body| serde_json::from_slice::<News>(&body).ok())
                .and_then(|news| news.message)
                .unwrap_or_else(|| status.to_string());
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                message,
            ));
        }

        let body = self.read_body(response).await?;
        let news: News = serde_json::from_slice(&body)
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?;
        engine_info!(
            "Fetched page {} for {}: status={} articles={} total={}",
            page,
            country,
            news.status,
            news.articles.len(),
            news.total_results
        );
        Ok(news)
    }
}

fn too_large(max_bytes: u64, actual: u64) -> FetchError {
    FetchError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return FetchError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
