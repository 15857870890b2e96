use nft_sales_import::{env::EnvConfig, log};

#[tokio::main(flavor = "current_thread")]
pub async fn main() -> Result<(), anyhow::Error> {
    log::init();

    let config = EnvConfig::from_env()?;
    nft_sales_import::run(&config).await?;

    Ok(())
}
