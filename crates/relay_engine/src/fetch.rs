use std::time::Duration;

use futures_util::StreamExt;
use relay_core::{RelayRequest, Suggestion};

use crate::{FailureKind, FetchError};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Suggestion endpoint; query parameters are appended to it.
    pub endpoint: String,
    /// Parameter carrying the customer's message.
    pub query_param: String,
    /// Parameter carrying the platform identifier.
    pub platform_param: String,
    pub connect_timeout: Duration,
    /// `None` leaves a hung endpoint pending forever.
    pub request_timeout: Option<Duration>,
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://mock-ai-api.herokuapp.com/suggestions/".to_string(),
            query_param: "q".to_string(),
            platform_param: "company".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            max_bytes: 1024 * 1024,
        }
    }
}

/// One lookup per request, no retries.
#[async_trait::async_trait]
pub trait SuggestionFetcher: Send + Sync {
    async fn fetch(&self, request: &RelayRequest) -> Result<Vec<Suggestion>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestSuggestionFetcher {
    settings: FetchSettings,
    client: reqwest::Client,
}

impl ReqwestSuggestionFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder().connect_timeout(settings.connect_timeout);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    fn request_url(&self, request: &RelayRequest) -> Result<reqwest::Url, FetchError> {
        let mut url = reqwest::Url::parse(&self.settings.endpoint)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        url.query_pairs_mut()
            .append_pair(&self.settings.query_param, &request.query_text)
            .append_pair(&self.settings.platform_param, request.platform.as_str());
        Ok(url)
    }
}

#[async_trait::async_trait]
impl SuggestionFetcher for ReqwestSuggestionFetcher {
    async fn fetch(&self, request: &RelayRequest) -> Result<Vec<Suggestion>, FetchError> {
        let url = self.request_url(request)?;

        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        parse_suggestions(&bytes)
    }
}

/// The endpoint answers with a JSON array of strings.
fn parse_suggestions(body: &[u8]) -> Result<Vec<Suggestion>, FetchError> {
    serde_json::from_slice::<Vec<Suggestion>>(body).map_err(|err| {
        FetchError::new(
            FailureKind::MalformedBody,
            format!("malformed suggestion body: {err}"),
        )
    })
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
