use chainwatch::models::Network;
use chainwatch::services::{
    BaseService, Monitor, Notifier, PriceOracle, SolanaService, TransactionStore,
};
use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;

const BASE_WALLET: &str = "0x75f39d9Bff76d376F3960028d98F324aAbB6c5e6";
const SOLANA_WALLET: &str = "FeB1jqjCFKyQ2vVTPLgYmZu1yLvBWhsGoudP46fhhF8z";

fn temp_store(name: &str) -> Arc<TransactionStore> {
    let path = std::env::temp_dir().join(format!(
        "chainwatch-pipeline-{}-{}.db",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    Arc::new(TransactionStore::open(&path).unwrap())
}

fn monitor_for(
    server: &mockito::Server,
    store: Arc<TransactionStore>,
    webhook: Option<String>,
) -> Monitor {
    let client = reqwest::Client::new();
    let oracle = Arc::new(PriceOracle::new(
        client.clone(),
        &server.url(),
        &server.url(),
    ));
    let base = Arc::new(BaseService::new(
        client.clone(),
        &format!("{}/base", server.url()),
        BASE_WALLET,
        oracle.clone(),
    ));
    let solana = Arc::new(SolanaService::new(
        client.clone(),
        &format!("{}/solana", server.url()),
        SOLANA_WALLET,
        oracle,
    ));
    let notifier = Arc::new(Notifier::new(client, webhook));
    Monitor::new(base, solana, store, notifier)
}

async fn mock_prices(server: &mut mockito::Server) {
    server
        .mock("GET", "/simple/price")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"ethereum":{"usd":3000.0},"solana":{"usd":100.0}}"#)
        .create_async()
        .await;
}

async fn mock_base_transfers(server: &mut mockito::Server) {
    // Both directions get the same page; the fetcher dedupes the union.
    server
        .mock("POST", "/base")
        .with_status(200)
        .with_body(
            r#"{"jsonrpc":"2.0","id":1,"result":{"transfers":[
                {"hash":"0xaaa","from":"0x75f39d9Bff76d376F3960028d98F324aAbB6c5e6","to":"0x1",
                 "value":"1000000000000000000","asset":"ETH","blockNum":"0x10",
                 "metadata":{"blockTimestamp":"2024-03-01T12:00:00Z"}},
                {"hash":"0xbbb","from":"0x2","to":"0x75f39d9Bff76d376F3960028d98F324aAbB6c5e6",
                 "value":"500000000000000000","asset":"ETH","blockNum":"0x11",
                 "metadata":{"blockTimestamp":"2024-03-01T13:00:00Z"}}
            ]}}"#,
        )
        .create_async()
        .await;
}

async fn mock_solana_activity(server: &mut mockito::Server) {
    server
        .mock("POST", "/solana")
        .match_body(Matcher::PartialJson(json!({"method": "getSignaturesForAddress"})))
        .with_status(200)
        .with_body(r#"{"jsonrpc":"2.0","id":1,"result":[{"signature":"sig1","slot":99,"blockTime":1700000000}]}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/solana")
        .match_body(Matcher::PartialJson(json!({"method": "getTransaction"})))
        .with_status(200)
        .with_body(
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": {
                    "slot": 99,
                    "blockTime": 1700000000,
                    "meta": {
                        "err": null,
                        "preBalances": [1_000_000_000u64, 0],
                        "postBalances": [500_000_000u64, 500_000_000]
                    },
                    "transaction": {
                        "message": {
                            "accountKeys": [
                                {"pubkey": SOLANA_WALLET, "signer": true, "writable": true},
                                {"pubkey": "Receiver1111", "signer": false, "writable": true}
                            ]
                        }
                    }
                }
            })
            .to_string(),
        )
        .create_async()
        .await;
}

#[tokio::test]
async fn repeated_cycles_are_idempotent() {
    let mut server = mockito::Server::new_async().await;
    mock_prices(&mut server).await;
    mock_base_transfers(&mut server).await;
    mock_solana_activity(&mut server).await;

    // Three new rows on the first cycle, none afterwards.
    let webhook = server
        .mock("POST", "/webhook")
        .with_status(204)
        .expect(3)
        .create_async()
        .await;

    let store = temp_store("idempotent");
    let monitor = monitor_for(
        &server,
        store.clone(),
        Some(format!("{}/webhook", server.url())),
    );

    monitor.run_cycle().await.unwrap();
    let after_first = store.recent_transactions(100).await.unwrap();
    assert_eq!(after_first.len(), 3);

    monitor.run_cycle().await.unwrap();
    let after_second = store.recent_transactions(100).await.unwrap();
    assert_eq!(after_second.len(), 3);

    webhook.assert_async().await;

    // Snapshots append every cycle: one per network per cycle.
    let snapshots = store.snapshots_since(0).await.unwrap();
    assert_eq!(snapshots.len(), 4);

    // Normalized records carry the derived USD values.
    let base_tx = after_second.iter().find(|r| r.hash == "0xaaa").unwrap();
    assert_eq!(base_tx.value, "1000000000000000000");
    assert_eq!(base_tx.usd_value, "3000.0");
    let sol_tx = after_second.iter().find(|r| r.hash == "sig1").unwrap();
    assert_eq!(sol_tx.network, Network::Solana);
    assert_eq!(sol_tx.value, "0.5");
    assert_eq!(sol_tx.usd_value, "50.0");
}

#[tokio::test]
async fn base_outage_does_not_block_solana_or_snapshots() {
    let mut server = mockito::Server::new_async().await;
    mock_prices(&mut server).await;
    mock_solana_activity(&mut server).await;
    server
        .mock("POST", "/base")
        .with_status(500)
        .create_async()
        .await;

    let store = temp_store("isolation");
    let monitor = monitor_for(&server, store.clone(), None);

    monitor.run_cycle().await.unwrap();

    let rows = store.recent_transactions(100).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].network, Network::Solana);
    assert_eq!(store.snapshots_since(0).await.unwrap().len(), 2);
}
