//! A thin client for the parts of the Notion API the importer needs: querying a database and
//! creating pages in one. The sales and summary databases sit on top of it as stores.
mod sales;
mod summaries;

use anyhow::{anyhow, Context, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Response,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use tracing::debug;

use crate::performance::TimedExt;

pub use sales::MockSalesStore;
pub use sales::NewSale;
pub use sales::NotionSalesStore;
pub use sales::SalesStore;

pub use summaries::resolve_summary;
pub use summaries::MockSummaryStore;
pub use summaries::NotionSummaryStore;
pub use summaries::SummaryStore;
pub use summaries::ROYALTY_PERCENT;

pub const NOTION_VERSION: &str = "2022-06-28";

pub type PageId = String;

#[derive(Debug, Deserialize)]
pub struct Page<P> {
    pub id: PageId,
    pub properties: P,
}

#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct CreatedPage {
    id: PageId,
}

#[derive(Debug, Deserialize)]
struct NotionError {
    code: String,
    message: String,
}

#[derive(Debug, Deserialize)]
pub struct DateValue {
    pub start: String,
}

#[derive(Debug, Deserialize)]
pub struct DateProperty {
    pub date: Option<DateValue>,
}

#[derive(Clone)]
pub struct NotionClient {
    client: reqwest::Client,
    server_url: String,
    headers: HeaderMap,
}

impl NotionClient {
    pub fn new(client: reqwest::Client, server_url: &str, token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .context("notion token is not a valid header value")?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert("Notion-Version", HeaderValue::from_static(NOTION_VERSION));

        Ok(Self {
            client,
            server_url: server_url.trim_end_matches('/').to_string(),
            headers,
        })
    }

    async fn post(&self, operation: &str, path: &str, body: &Value) -> Result<Response> {
        let url = format!("{}{}", self.server_url, path);
        debug!(operation, %url, "notion request");

        let res = self
            .client
            .post(&url)
            .headers(self.headers.clone())
            .json(body)
            .send()
            .timed(operation)
            .await
            .with_context(|| format!("failed to reach notion at {url}"))?;

        if res.status().is_success() {
            return Ok(res);
        }

        let status = res.status();
        match res.json::<NotionError>().await {
            Ok(error) => Err(anyhow!(
                "notion request failed. status = {} code = {} message = {} url = {}",
                status,
                error.code,
                error.message,
                url
            )),
            Err(_) => Err(anyhow!(
                "notion request failed. status = {} url = {}",
                status,
                url
            )),
        }
    }

    pub async fn query_database<T: DeserializeOwned>(
        &self,
        database_id: &str,
        query: &Value,
    ) -> Result<Vec<T>> {
        self.post(
            "query_database",
            &format!("/v1/databases/{database_id}/query"),
            query,
        )
            .await?
            .json::<QueryResponse<T>>()
            .await
            .with_context(|| format!("failed to decode query result of database {database_id}"))
            .map(|body| body.results)
    }

    /// Creates a page and returns its id. The body carries its own parent database.
    pub async fn create_page(&self, page: &Value) -> Result<PageId> {
        self.post("create_page", "/v1/pages", page)
            .await?
            .json::<CreatedPage>()
            .await
            .context("failed to decode created notion page")
            .map(|created| created.id)
    }
}
