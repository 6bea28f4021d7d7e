use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::http::request_error;
use super::{ServiceError, ServiceFuture, SummaryLookup};

const SERVICE: &str = "wikipedia";
pub const DEFAULT_SUMMARY_BASE_URL: &str = "https://en.wikipedia.org/api/rest_v1/page/summary";
pub const DEFAULT_SEARCH_URL: &str = "https://en.wikipedia.org/w/api.php";
pub const SUMMARY_SENTENCES: usize = 3;

#[derive(Debug, Deserialize)]
struct PageSummary {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    extract: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WikipediaClient {
    client: reqwest::Client,
    summary_base_url: String,
    search_url: String,
}

impl WikipediaClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_endpoints(client, DEFAULT_SUMMARY_BASE_URL, DEFAULT_SEARCH_URL)
    }

    pub fn with_endpoints(
        client: reqwest::Client,
        summary_base_url: impl Into<String>,
        search_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            summary_base_url: summary_base_url.into(),
            search_url: search_url.into(),
        }
    }

    pub fn summary_url(&self, topic: &str) -> Result<Url, ServiceError> {
        let mut url = Url::parse(&self.summary_base_url)
            .map_err(|err| ServiceError::Unavailable(format!("summary base url: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| ServiceError::Unavailable("summary base url has no path".to_string()))?
            .pop_if_empty()
            .push(&page_title(topic));
        Ok(url)
    }

    /// OpenSearch query returning at most one suggested article title.
    pub fn search_url(&self, topic: &str) -> Result<Url, ServiceError> {
        let mut url = Url::parse(&self.search_url)
            .map_err(|err| ServiceError::Unavailable(format!("search url: {err}")))?;
        url.query_pairs_mut()
            .append_pair("action", "opensearch")
            .append_pair("search", topic.trim())
            .append_pair("limit", "1")
            .append_pair("namespace", "0")
            .append_pair("format", "json");
        Ok(url)
    }

    /// Tries the topic as an exact title first, then the title suggested by
    /// search.
    async fn fetch_summary(&self, topic: &str) -> Result<String, ServiceError> {
        match self.page_summary(topic).await {
            Err(ServiceError::NotFound(_)) => {}
            other => return other,
        }

        let Some(title) = self.suggest_title(topic).await? else {
            return Err(ServiceError::NotFound(topic.to_string()));
        };
        if page_title(&title).eq_ignore_ascii_case(&page_title(topic)) {
            return Err(ServiceError::NotFound(topic.to_string()));
        }

        debug!(service = SERVICE, title = %title, "using suggested title");
        self.page_summary(&title).await
    }

    async fn page_summary(&self, title: &str) -> Result<String, ServiceError> {
        let url = self.summary_url(title)?;
        debug!(service = SERVICE, url = %url, "fetching page summary");

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| request_error(SERVICE, err))?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ServiceError::NotFound(title.to_string()));
        }
        if !status.is_success() {
            warn!(service = SERVICE, status = status.as_u16(), "summary request failed");
            return Err(ServiceError::Http {
                status: status.as_u16(),
            });
        }

        let summary = response
            .json::<PageSummary>()
            .await
            .map_err(|_| ServiceError::InvalidPayload("response_json_parse_failed".to_string()))?;
        if summary.kind.as_deref() == Some("disambiguation") {
            debug!(service = SERVICE, title, "title is a disambiguation page");
            return Err(ServiceError::NotFound(title.to_string()));
        }

        let extract = summary.extract.unwrap_or_default();
        let text = first_sentences(&extract, SUMMARY_SENTENCES);
        if text.is_empty() {
            return Err(ServiceError::NotFound(title.to_string()));
        }

        Ok(text)
    }

    async fn suggest_title(&self, topic: &str) -> Result<Option<String>, ServiceError> {
        let url = self.search_url(topic)?;
        debug!(service = SERVICE, url = %url, "searching for title");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| request_error(SERVICE, err))?;
        let status = response.status();
        if !status.is_success() {
            warn!(service = SERVICE, status = status.as_u16(), "search request failed");
            return Err(ServiceError::Http {
                status: status.as_u16(),
            });
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|_| ServiceError::InvalidPayload("response_json_parse_failed".to_string()))?;
        Ok(first_suggestion(&body))
    }
}

/// Reads the first title out of an OpenSearch reply:
/// `[query, [titles], [descriptions], [urls]]`.
pub fn first_suggestion(body: &Value) -> Option<String> {
    body.get(1)?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|title| !title.is_empty())
        .map(ToString::to_string)
}

impl SummaryLookup for WikipediaClient {
    fn summary<'a>(&'a self, topic: &'a str) -> ServiceFuture<'a, Result<String, ServiceError>> {
        Box::pin(self.fetch_summary(topic))
    }
}

fn page_title(topic: &str) -> String {
    topic.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Keeps up to `count` sentences. A sentence ends at `.`, `!` or `?`
/// followed by whitespace or the end of the text.
pub fn first_sentences(text: &str, count: usize) -> String {
    let text = text.trim();
    let mut seen = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((index, ch)) = chars.next() {
        if !matches!(ch, '.' | '!' | '?') {
            continue;
        }
        let at_boundary = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
        if at_boundary {
            seen += 1;
            if seen == count {
                return text[..index + ch.len_utf8()].to_string();
            }
        }
    }

    text.to_string()
}
