use anyhow::{Context, Result};
use async_trait::async_trait;
use format_url::FormatUrl;
use mockall::automock;
use serde::Deserialize;
use tracing::debug;

use crate::performance::TimedExt;

use super::SaleEvent;

/// The feed is not paginated past this, older sales are never seen.
pub const ACTIVITY_LIMIT: u32 = 200;

#[derive(Deserialize)]
#[serde(untagged)]
enum ActivitiesResponse {
    List(Vec<SaleEvent>),
    Envelope { activities: Vec<SaleEvent> },
}

impl From<ActivitiesResponse> for Vec<SaleEvent> {
    fn from(response: ActivitiesResponse) -> Self {
        match response {
            ActivitiesResponse::List(sales) => sales,
            ActivitiesResponse::Envelope { activities } => activities,
        }
    }
}

#[automock]
#[async_trait]
pub trait MarketplaceApi {
    /// Up to [`ACTIVITY_LIMIT`] of the most recent sales of the collection.
    async fn fetch_recent_sales(&self) -> Result<Vec<SaleEvent>>;
}

pub struct MagicEdenApi {
    client: reqwest::Client,
    server_url: String,
    chain: String,
    collection: String,
}

impl MagicEdenApi {
    pub fn new(client: reqwest::Client, server_url: &str, chain: &str, collection: &str) -> Self {
        Self {
            client,
            server_url: server_url.trim_end_matches('/').to_string(),
            chain: chain.to_string(),
            collection: collection.to_string(),
        }
    }

    fn activities_url(&self) -> String {
        FormatUrl::new(&self.server_url)
            .with_path_template(&format!(
                "/v3/rtp/{}/collections/{}/activities",
                self.chain, self.collection
            ))
            .with_query_params(vec![
                ("type", "sale"),
                ("limit", &ACTIVITY_LIMIT.to_string()),
            ])
            .format_url()
    }
}

#[async_trait]
impl MarketplaceApi for MagicEdenApi {
    async fn fetch_recent_sales(&self) -> Result<Vec<SaleEvent>> {
        let url = self.activities_url();
        debug!(%url, "fetching recent sales");

        let sales: Vec<SaleEvent> = self
            .client
            .get(&url)
            .send()
            .timed("fetch_recent_sales")
            .await
            .context("failed to reach magic eden")?
            .error_for_status()
            .context("magic eden refused the activities request")?
            .json::<ActivitiesResponse>()
            .await
            .context("failed to decode magic eden activities")?
            .into();

        debug!(count = sales.len(), "got recent sales");

        Ok(sales)
    }
}
