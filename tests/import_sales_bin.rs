use mockito::{Matcher, Server};
use serde_json::json;
use tokio::process::Command;

const BIN: &str = env!("CARGO_BIN_EXE_import-sales");

#[tokio::test]
async fn exits_non_zero_without_notion_token() {
    let mut notion = Server::new_async().await;
    let any_request = notion
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let output = Command::new(BIN)
        .env_clear()
        .env("SALES_DB_ID", "sales-db")
        .env("SUMMARY_DB_ID", "summary-db")
        .env("ME_COLLECTION", "0xcollection")
        .env("NOTION_API_URL", notion.url())
        .output()
        .await
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("NOTION_TOKEN"), "{stderr}");
    any_request.assert_async().await;
}

#[tokio::test]
async fn exits_zero_when_nothing_is_new() {
    let mut notion = Server::new_async().await;
    let mut magic_eden = Server::new_async().await;

    let _checkpoint = notion
        .mock("POST", "/v1/databases/sales-db/query")
        .with_status(200)
        .with_body(json!({ "object": "list", "results": [] }).to_string())
        .create_async()
        .await;
    let _activities = magic_eden
        .mock("GET", "/v3/rtp/ethereum/collections/0xcollection/activities")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;
    let pages = notion
        .mock("POST", "/v1/pages")
        .expect(0)
        .create_async()
        .await;

    let output = Command::new(BIN)
        .env_clear()
        .env("NOTION_TOKEN", "secret_test_token")
        .env("SALES_DB_ID", "sales-db")
        .env("SUMMARY_DB_ID", "summary-db")
        .env("ME_COLLECTION", "0xcollection")
        .env("NOTION_API_URL", notion.url())
        .env("MAGIC_EDEN_API_URL", magic_eden.url())
        .env("RUST_LOG", "info")
        .output()
        .await
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No new sales."), "{stdout}");
    pages.assert_async().await;
}

#[tokio::test]
async fn logs_imported_count_for_two_days() {
    let mut notion = Server::new_async().await;
    let mut magic_eden = Server::new_async().await;

    let _checkpoint = notion
        .mock("POST", "/v1/databases/sales-db/query")
        .with_status(200)
        .with_body(json!({ "object": "list", "results": [] }).to_string())
        .create_async()
        .await;
    let _activities = magic_eden
        .mock("GET", "/v3/rtp/ethereum/collections/0xcollection/activities")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!([
                { "signature": "0xsecondsale0000", "blockTime": 1700000000, "price": "2500000000000000000" },
                { "signature": "0xfirstsale00000", "blockTime": 1699900000, "price": "1000000000000000000" }
            ])
            .to_string(),
        )
        .create_async()
        .await;
    let summary_lookups = notion
        .mock("POST", "/v1/databases/summary-db/query")
        .with_status(200)
        .with_body(json!({ "object": "list", "results": [] }).to_string())
        .expect(2)
        .create_async()
        .await;
    let summaries = notion
        .mock("POST", "/v1/pages")
        .match_body(Matcher::PartialJson(
            json!({ "parent": { "database_id": "summary-db" } }),
        ))
        .with_status(200)
        .with_body(json!({ "object": "page", "id": "summary-1" }).to_string())
        .expect(2)
        .create_async()
        .await;
    let sales = notion
        .mock("POST", "/v1/pages")
        .match_body(Matcher::PartialJson(
            json!({ "parent": { "database_id": "sales-db" } }),
        ))
        .with_status(200)
        .with_body(json!({ "object": "page", "id": "sale-1" }).to_string())
        .expect(2)
        .create_async()
        .await;

    let output = Command::new(BIN)
        .env_clear()
        .env("NOTION_TOKEN", "secret_test_token")
        .env("SALES_DB_ID", "sales-db")
        .env("SUMMARY_DB_ID", "summary-db")
        .env("ME_COLLECTION", "0xcollection")
        .env("NOTION_API_URL", notion.url())
        .env("MAGIC_EDEN_API_URL", magic_eden.url())
        .env("RUST_LOG", "info")
        .output()
        .await
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Imported 2 sales."), "{stdout}");
    summary_lookups.assert_async().await;
    summaries.assert_async().await;
    sales.assert_async().await;
}
