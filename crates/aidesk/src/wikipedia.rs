//! MediaWiki search client used by the script-writing tool.
//!
//! Two-step lookup against the public API: a full-text search for page
//! titles, then a plain-text extract per page. The digest joins the top
//! pages as `Page:`/`Summary:` pairs, truncated to the configured budget.

use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

use crate::config::WikipediaConfig;
use crate::error::LlmError;
use crate::llm::external::parse_json_body;

pub struct WikipediaClient {
    client: Client,
    base_url: String,
    top_pages: usize,
    max_chars: usize,
}

impl WikipediaClient {
    pub fn new(config: &WikipediaConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("aidesk/0.1 (desk-tool toolkit)")
            .build()?;

        Ok(Self {
            client,
            base_url: format!("https://{}.wikipedia.org/w/api.php", config.lang),
            top_pages: config.top_pages,
            max_chars: config.max_chars,
        })
    }

    /// Search for `query` and return the joined page digests. An empty
    /// result set yields an explicit "no results" digest rather than an
    /// error, matching how the tool treats thin reference material.
    pub async fn search_digest(&self, query: &str) -> Result<String, LlmError> {
        let titles = self.search_titles(query).await?;
        if titles.is_empty() {
            tracing::debug!(query, "Wikipedia search returned no pages");
            return Ok(format!("No encyclopedia results found for '{}'.", query));
        }

        let mut digest = String::new();
        for title in &titles {
            let extract = self.page_extract(title).await?;
            if extract.is_empty() {
                continue;
            }
            digest.push_str(&format!("Page: {}\nSummary: {}\n\n", title, extract));
            if digest.chars().count() >= self.max_chars {
                break;
            }
        }

        Ok(truncate_chars(digest.trim_end(), self.max_chars))
    }

    async fn search_titles(&self, query: &str) -> Result<Vec<String>, LlmError> {
        let limit = self.top_pages.to_string();
        let params: Vec<(&str, &str)> = vec![
            ("action", "query"),
            ("list", "search"),
            ("srsearch", query),
            ("srlimit", &limit),
            ("format", "json"),
        ];

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| LlmError::from_reqwest(&self.base_url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let result: SearchResponse = parse_json_body(response, &self.base_url).await?;
        Ok(result
            .query
            .search
            .into_iter()
            .map(|hit| hit.title)
            .collect())
    }

    async fn page_extract(&self, title: &str) -> Result<String, LlmError> {
        let params: Vec<(&str, &str)> = vec![
            ("action", "query"),
            ("prop", "extracts"),
            ("explaintext", "1"),
            ("redirects", "1"),
            ("titles", title),
            ("format", "json"),
        ];

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| LlmError::from_reqwest(&self.base_url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let result: ExtractResponse = parse_json_body(response, &self.base_url).await?;
        Ok(result
            .query
            .pages
            .into_values()
            .next()
            .and_then(|p| p.extract)
            .unwrap_or_default())
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[derive(Deserialize)]
struct SearchResponse {
    query: SearchQuery,
}

#[derive(Deserialize)]
struct SearchQuery {
    search: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Deserialize)]
struct ExtractResponse {
    query: ExtractQuery,
}

#[derive(Deserialize)]
struct ExtractQuery {
    pages: HashMap<String, ExtractPage>,
}

#[derive(Deserialize)]
struct ExtractPage {
    extract: Option<String>,
}
