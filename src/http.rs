use std::time::Duration;

use anyhow::{Context, Result};

/// Every request the importer makes gives up after this long.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub fn make_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("failed to build http client")
}
