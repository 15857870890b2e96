use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use mockall::automock;
use serde::de::IgnoredAny;
use serde_json::json;
use tracing::{debug, info, warn};

use super::{NotionClient, Page, PageId};

const NAME: &str = "Name";
const DATE: &str = "Date";
const ROYALTY: &str = "Royalty %";

/// Every summary is created with the same royalty, it is not derived from the sales.
pub const ROYALTY_PERCENT: u32 = 5;

#[automock]
#[async_trait]
pub trait SummaryStore {
    /// Ids of the summaries for the given day, oldest first.
    async fn find_summaries(&self, date: NaiveDate) -> Result<Vec<PageId>>;
    async fn create_summary(&self, date: NaiveDate) -> Result<PageId>;
}

pub struct NotionSummaryStore {
    notion: NotionClient,
    database_id: String,
}

impl NotionSummaryStore {
    pub fn new(notion: NotionClient, database_id: &str) -> Self {
        Self {
            notion,
            database_id: database_id.to_string(),
        }
    }
}

#[async_trait]
impl SummaryStore for NotionSummaryStore {
    async fn find_summaries(&self, date: NaiveDate) -> Result<Vec<PageId>> {
        let query = json!({
            "filter": { "property": DATE, "date": { "equals": date.to_string() } },
            "sorts": [{ "timestamp": "created_time", "direction": "ascending" }]
        });

        let pages: Vec<Page<IgnoredAny>> =
            self.notion.query_database(&self.database_id, &query).await?;

        Ok(pages.into_iter().map(|page| page.id).collect())
    }

    async fn create_summary(&self, date: NaiveDate) -> Result<PageId> {
        let date_iso = date.to_string();
        let page = json!({
            "parent": { "database_id": self.database_id },
            "properties": {
                NAME: { "title": [{ "text": { "content": date_iso } }] },
                DATE: { "date": { "start": date_iso } },
                ROYALTY: { "number": ROYALTY_PERCENT }
            }
        });

        self.notion.create_page(&page).await
    }
}

/// Finds the summary for a day, creating it when there is none yet. Runs that overlap can both
/// miss and create one each, the oldest then wins on every later lookup.
pub async fn resolve_summary(summary_store: &impl SummaryStore, date: NaiveDate) -> Result<PageId> {
    let mut summaries = summary_store.find_summaries(date).await?.into_iter();

    match summaries.next() {
        Some(oldest) => {
            let duplicates = summaries.count();
            if duplicates > 0 {
                warn!(%date, %oldest, duplicates, "found duplicate summaries, using the oldest");
            }
            debug!(%date, id = %oldest, "found existing summary");
            Ok(oldest)
        }
        None => {
            let id = summary_store.create_summary(date).await?;
            info!(%date, %id, "created summary");
            Ok(id)
        }
    }
}
