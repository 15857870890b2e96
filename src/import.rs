//! One import run: read the checkpoint, fetch what is new, and file every sale under the summary
//! of its day.

use anyhow::{Context, Result};
use chrono_tz::Tz;
use tracing::{debug, info};

use crate::{
    env::EnvConfig,
    http,
    marketplace::{self, MagicEdenApi, MarketplaceApi, SaleEvent},
    notion::{self, NewSale, NotionClient, NotionSalesStore, NotionSummaryStore, PageId},
    notion::{SalesStore, SummaryStore},
    sale_time,
    units::UnitDivisor,
};

/// How many characters of a signature make it into a sale's title.
const TITLE_LENGTH: usize = 12;

#[derive(Clone, Copy, Debug)]
pub struct ImportSettings {
    pub timezone: Tz,
    pub unit_divisor: UnitDivisor,
}

impl From<&EnvConfig> for ImportSettings {
    fn from(config: &EnvConfig) -> Self {
        Self {
            timezone: config.timezone,
            unit_divisor: config.unit_divisor,
        }
    }
}

/// The first twelve characters of the signature, or all of it when shorter.
pub fn sale_title(signature: &str) -> String {
    signature.chars().take(TITLE_LENGTH).collect()
}

pub fn to_new_sale(
    sale: &SaleEvent,
    summary_id: &PageId,
    settings: &ImportSettings,
) -> Result<NewSale> {
    Ok(NewSale {
        title: sale_title(&sale.signature),
        sale_time: sale_time::local_sale_time(sale.block_time, &settings.timezone)?,
        price: sale.raw_price().to_eth(settings.unit_divisor),
        summary_id: summary_id.clone(),
    })
}

pub async fn write_sale(
    sales_store: &impl SalesStore,
    sale: &SaleEvent,
    summary_id: &PageId,
    settings: &ImportSettings,
) -> Result<()> {
    let new_sale = to_new_sale(sale, summary_id, settings)?;
    debug!(
        signature = %sale.signature,
        block_time = sale.block_time,
        price = %new_sale.price,
        "writing sale"
    );
    sales_store
        .create_sale(&new_sale)
        .await
        .with_context(|| format!("failed to store sale {}", sale.signature))
}

/// Returns how many sales were imported. Sales written before a failure stay written, the next
/// run picks up from the newest of them.
pub async fn import_sales(
    sales_store: &impl SalesStore,
    summary_store: &impl SummaryStore,
    marketplace_api: &impl MarketplaceApi,
    settings: &ImportSettings,
) -> Result<usize> {
    let checkpoint = sales_store
        .latest_sale_time()
        .await
        .context("failed to read last imported sale time")?;
    debug!(checkpoint, "last imported sale time");

    let mut sales = marketplace::fetch_sales_since(marketplace_api, checkpoint).await?;

    if sales.is_empty() {
        info!("No new sales.");
        return Ok(0);
    }

    sales.sort_by_key(|sale| sale.block_time);

    for sale in sales.iter() {
        let date = sale_time::sale_date(sale.block_time, &settings.timezone)?;
        let summary_id = notion::resolve_summary(summary_store, date).await?;
        write_sale(sales_store, sale, &summary_id, settings).await?;
    }

    info!("Imported {} sales.", sales.len());

    Ok(sales.len())
}

/// Wires the live Notion and Magic Eden clients together and runs one import.
pub async fn run(config: &EnvConfig) -> Result<usize> {
    let client = http::make_client()?;
    let notion = NotionClient::new(client.clone(), &config.notion_api_url, &config.notion_token)?;
    let sales_store = NotionSalesStore::new(notion.clone(), &config.sales_db_id, config.timezone);
    let summary_store = NotionSummaryStore::new(notion, &config.summary_db_id);
    let marketplace_api = MagicEdenApi::new(
        client,
        &config.magic_eden_api_url,
        &config.chain,
        &config.collection,
    );

    info!(
        chain = %config.chain,
        collection = %config.collection,
        timezone = %config.timezone,
        "importing sales"
    );

    import_sales(
        &sales_store,
        &summary_store,
        &marketplace_api,
        &ImportSettings::from(config),
    )
    .await
}
