//! Sale events as reported by the marketplace activity feed.
mod magic_eden;

use serde::Deserialize;

use crate::{sale_time::BlockTime, units::WeiNewtype};

pub use magic_eden::MagicEdenApi;
pub use magic_eden::MarketplaceApi;
pub use magic_eden::MockMarketplaceApi;
pub use magic_eden::ACTIVITY_LIMIT;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SaleTx {
    #[serde(default)]
    pub price: Option<WeiNewtype>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaleEvent {
    #[serde(alias = "txHash")]
    pub signature: String,
    #[serde(default)]
    pub block_time: BlockTime,
    #[serde(default)]
    pub price: Option<WeiNewtype>,
    #[serde(default)]
    pub tx: Option<SaleTx>,
}

impl SaleEvent {
    /// The top-level price when the feed sent a non-zero one, else the price on the transaction,
    /// else zero.
    pub fn raw_price(&self) -> WeiNewtype {
        self.price
            .filter(|WeiNewtype(amount)| *amount != 0)
            .or_else(|| self.tx.as_ref().and_then(|tx| tx.price))
            .unwrap_or_default()
    }
}

/// Keeps the sales that happened strictly after the checkpoint. Order is left as the feed sent it.
pub fn sales_since(sales: Vec<SaleEvent>, checkpoint: BlockTime) -> Vec<SaleEvent> {
    sales
        .into_iter()
        .filter(|sale| sale.block_time > checkpoint)
        .collect()
}

/// Fetches the most recent page of sales and keeps only those newer than the checkpoint. Sales
/// older than the last entry of the page are out of reach.
pub async fn fetch_sales_since(
    marketplace_api: &impl MarketplaceApi,
    checkpoint: BlockTime,
) -> anyhow::Result<Vec<SaleEvent>> {
    let sales = marketplace_api.fetch_recent_sales().await?;
    let fetched = sales.len();
    let new_sales = sales_since(sales, checkpoint);
    tracing::debug!(
        fetched,
        new = new_sales.len(),
        checkpoint,
        "filtered sales by checkpoint"
    );
    Ok(new_sales)
}
