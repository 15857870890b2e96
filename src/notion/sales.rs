use anyhow::Result;
use async_trait::async_trait;
use chrono::DateTime;
use chrono_tz::Tz;
use mockall::automock;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::{
    sale_time::{self, BlockTime},
    units::EthNewtype,
};

use super::{DateProperty, NotionClient, Page, PageId};

const TITLE: &str = "NFT / Tx Hash";
const SALE_TIME: &str = "Sale Time";
const PRICE: &str = "Price ETH";
const SUMMARY: &str = "Summary";

#[derive(Clone, Debug, PartialEq)]
pub struct NewSale {
    pub title: String,
    pub sale_time: DateTime<Tz>,
    pub price: EthNewtype,
    pub summary_id: PageId,
}

#[derive(Debug, Deserialize)]
struct SaleProperties {
    #[serde(rename = "Sale Time")]
    sale_time: DateProperty,
}

#[automock]
#[async_trait]
pub trait SalesStore {
    /// Block time of the newest sale stored so far, zero when there are none.
    async fn latest_sale_time(&self) -> Result<BlockTime>;
    async fn create_sale(&self, sale: &NewSale) -> Result<()>;
}

pub struct NotionSalesStore {
    notion: NotionClient,
    database_id: String,
    timezone: Tz,
}

impl NotionSalesStore {
    pub fn new(notion: NotionClient, database_id: &str, timezone: Tz) -> Self {
        Self {
            notion,
            database_id: database_id.to_string(),
            timezone,
        }
    }
}

#[async_trait]
impl SalesStore for NotionSalesStore {
    async fn latest_sale_time(&self) -> Result<BlockTime> {
        let query = json!({
            "sorts": [{ "property": SALE_TIME, "direction": "descending" }],
            "page_size": 1
        });

        let pages: Vec<Page<SaleProperties>> =
            self.notion.query_database(&self.database_id, &query).await?;

        let latest = pages
            .into_iter()
            .next()
            .and_then(|page| page.properties.sale_time.date);

        match latest {
            None => Ok(0),
            Some(date) => sale_time::parse_sale_time(&date.start, &self.timezone),
        }
    }

    async fn create_sale(&self, sale: &NewSale) -> Result<()> {
        let page = json!({
            "parent": { "database_id": self.database_id },
            "properties": {
                TITLE: { "title": [{ "text": { "content": sale.title } }] },
                SALE_TIME: { "date": { "start": sale_time::to_iso_string(&sale.sale_time) } },
                PRICE: { "number": sale.price },
                SUMMARY: { "relation": [{ "id": sale.summary_id }] }
            }
        });

        let id = self.notion.create_page(&page).await?;
        debug!(%id, title = %sale.title, "created sale page");

        Ok(())
    }
}
