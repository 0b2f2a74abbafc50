use crate::models::{
    decimal_string, AssetTransfer, AssetTransfersResult, Network, RpcEnvelope, TransactionRecord,
    TxStatus,
};
use crate::services::PriceOracle;
use chrono::Utc;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;

/// Upstream page size per direction (0x32 = 50 transfers).
const TRANSFER_PAGE_SIZE: &str = "0x32";

const WEI_PER_ETH: f64 = 1e18;

pub struct BaseService {
    client: reqwest::Client,
    rpc_url: String,
    wallet: String,
    oracle: Arc<PriceOracle>,
}

impl BaseService {
    pub fn new(
        client: reqwest::Client,
        rpc_url: &str,
        wallet: &str,
        oracle: Arc<PriceOracle>,
    ) -> Self {
        Self {
            client,
            rpc_url: rpc_url.to_string(),
            wallet: wallet.to_string(),
            oracle,
        }
    }

    /// Most recent transfers touching the wallet: outgoing and incoming
    /// queries unioned and deduplicated by hash. Either direction failing
    /// upstream degrades to an empty page, never an error.
    pub async fn fetch_transfers(&self) -> Vec<AssetTransfer> {
        let mut all = self.fetch_page("fromAddress", 1).await;
        all.extend(self.fetch_page("toAddress", 2).await);

        let mut seen = HashSet::new();
        all.retain(|tx| !tx.hash.is_empty() && seen.insert(tx.hash.clone()));
        all
    }

    async fn fetch_page(&self, direction: &str, id: u32) -> Vec<AssetTransfer> {
        let mut filter = json!({
            "fromBlock": "0x0",
            "toBlock": "latest",
            "category": ["external", "erc20", "erc721", "erc1155"],
            "withMetadata": true,
            "maxCount": TRANSFER_PAGE_SIZE,
        });
        filter[direction] = json!(self.wallet);

        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "alchemy_getAssetTransfers",
            "params": [filter],
        });

        let response = match self.client.post(&self.rpc_url).json(&body).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::error!("Error fetching Base transfers ({}): {}", direction, e);
                return Vec::new();
            }
        };

        let envelope: RpcEnvelope<AssetTransfersResult> = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                tracing::error!("Malformed Base transfer response ({}): {}", direction, e);
                return Vec::new();
            }
        };

        if let Some(err) = envelope.error {
            tracing::error!("Alchemy API error ({}): {}", direction, err.message);
            return Vec::new();
        }

        let transfers = envelope.result.map(|r| r.transfers).unwrap_or_default();
        tracing::info!(
            "Found {} {} Base transfers",
            transfers.len(),
            if direction == "fromAddress" { "outgoing" } else { "incoming" }
        );
        transfers
    }

    /// Maps one raw transfer into the canonical record. Price lookups that
    /// fail produce a "0" USD value, never an error.
    pub async fn normalize(&self, tx: &AssetTransfer) -> TransactionRecord {
        let token_symbol = tx
            .asset
            .clone()
            .unwrap_or_else(|| Network::Base.native_symbol().to_string());
        let token_address = tx
            .raw_contract
            .as_ref()
            .and_then(|c| c.address.clone())
            .unwrap_or_default();

        let value = raw_value_string(tx.value.as_ref());
        let numeric = value.parse::<f64>().unwrap_or(0.0);

        let usd = if numeric == 0.0 {
            0.0
        } else if token_address.is_empty() {
            // Native transfer values are wei-denominated strings.
            (numeric / WEI_PER_ETH) * self.oracle.native_prices().await.eth_usd
        } else {
            // Token transfer values arrive decimal-adjusted from the API.
            numeric
                * self
                    .oracle
                    .token_price(&token_address, Network::Base.as_str())
                    .await
        };

        let timestamp = tx
            .metadata
            .as_ref()
            .and_then(|m| m.block_timestamp.as_deref())
            .and_then(parse_block_timestamp)
            .unwrap_or_else(|| Utc::now().timestamp());

        let block_number = tx.block_num.as_deref().map(parse_hex_u64).unwrap_or(0);

        TransactionRecord {
            hash: tx.hash.clone(),
            network: Network::Base,
            from_address: tx.from.clone(),
            to_address: tx.to.clone().unwrap_or_default(),
            value,
            timestamp,
            block_number: block_number as i64,
            status: TxStatus::Confirmed,
            gas_used: "0".to_string(),
            token_symbol,
            token_address,
            usd_value: decimal_string(usd),
            notified: false,
        }
    }
}

fn raw_value_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => "0".to_string(),
    }
}

fn parse_block_timestamp(raw: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.timestamp())
}

fn parse_hex_u64(raw: &str) -> u64 {
    u64::from_str_radix(raw.trim_start_matches("0x"), 16).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn oracle_for(server: &mockito::Server) -> Arc<PriceOracle> {
        Arc::new(PriceOracle::new(
            reqwest::Client::new(),
            &server.url(),
            &server.url(),
        ))
    }

    fn transfer(raw: serde_json::Value) -> AssetTransfer {
        serde_json::from_value(raw).unwrap()
    }

    #[tokio::test]
    async fn normalizes_native_transfer_with_usd_value() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/simple/price")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"ethereum":{"usd":3000.0},"solana":{"usd":150.0}}"#)
            .create_async()
            .await;

        let service = BaseService::new(
            reqwest::Client::new(),
            &server.url(),
            "0xwallet",
            oracle_for(&server),
        );

        let tx = transfer(json!({
            "hash": "0xabc",
            "from": "0xwallet",
            "to": "0xother",
            "value": "1000000000000000000",
            "asset": "ETH",
            "blockNum": "0x1b4",
            "metadata": {"blockTimestamp": "2024-03-01T12:00:00Z"}
        }));

        let record = service.normalize(&tx).await;
        assert_eq!(record.hash, "0xabc");
        assert_eq!(record.network, Network::Base);
        assert_eq!(record.value, "1000000000000000000");
        assert_eq!(record.usd_value, "3000.0");
        assert_eq!(record.token_symbol, "ETH");
        assert_eq!(record.token_address, "");
        assert_eq!(record.block_number, 436);
        assert_eq!(record.status, TxStatus::Confirmed);
        assert_eq!(record.timestamp, 1_709_294_400);
    }

    #[tokio::test]
    async fn normalizes_token_transfer_via_pair_feed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/latest/dex/tokens/0xtoken")
            .with_status(200)
            .with_body(r#"{"pairs":[{"chainId":"base","priceUsd":"5.0","liquidity":{"usd":1000.0}}]}"#)
            .create_async()
            .await;

        let service = BaseService::new(
            reqwest::Client::new(),
            &server.url(),
            "0xwallet",
            oracle_for(&server),
        );

        let tx = transfer(json!({
            "hash": "0xdef",
            "from": "0xother",
            "to": "0xwallet",
            "value": 2.0,
            "asset": "FOO",
            "rawContract": {"address": "0xtoken"}
        }));

        let record = service.normalize(&tx).await;
        assert_eq!(record.value, "2.0");
        assert_eq!(record.usd_value, "10.0");
        assert_eq!(record.token_symbol, "FOO");
        assert_eq!(record.token_address, "0xtoken");
        // No metadata: ingestion wall-clock fallback.
        assert!(record.timestamp > 0);
        assert_eq!(record.block_number, 0);
    }

    #[tokio::test]
    async fn missing_fields_default_without_failing() {
        let server = mockito::Server::new_async().await;
        let service = BaseService::new(
            reqwest::Client::new(),
            &server.url(),
            "0xwallet",
            oracle_for(&server),
        );

        let record = service.normalize(&transfer(json!({"hash": "0x1"}))).await;
        assert_eq!(record.value, "0");
        assert_eq!(record.usd_value, "0");
        assert_eq!(record.token_symbol, "ETH");
        assert_eq!(record.to_address, "");
    }

    #[tokio::test]
    async fn fetch_unions_and_dedupes_by_hash() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "params": [{"fromAddress": "0xwallet"}]
            })))
            .with_status(200)
            .with_body(
                r#"{"jsonrpc":"2.0","id":1,"result":{"transfers":[
                    {"hash":"0xaaa","from":"0xwallet","to":"0x1"},
                    {"hash":"0xbbb","from":"0xwallet","to":"0x2"}
                ]}}"#,
            )
            .create_async()
            .await;
        server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "params": [{"toAddress": "0xwallet"}]
            })))
            .with_status(200)
            .with_body(
                r#"{"jsonrpc":"2.0","id":2,"result":{"transfers":[
                    {"hash":"0xbbb","from":"0xwallet","to":"0x2"},
                    {"hash":"0xccc","from":"0x3","to":"0xwallet"}
                ]}}"#,
            )
            .create_async()
            .await;

        let service = BaseService::new(
            reqwest::Client::new(),
            &server.url(),
            "0xwallet",
            oracle_for(&server),
        );

        let transfers = service.fetch_transfers().await;
        let hashes: Vec<&str> = transfers.iter().map(|t| t.hash.as_str()).collect();
        assert_eq!(hashes, vec!["0xaaa", "0xbbb", "0xccc"]);
    }

    #[tokio::test]
    async fn partial_failure_keeps_succeeding_direction() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "params": [{"fromAddress": "0xwallet"}]
            })))
            .with_status(200)
            .with_body(r#"{"jsonrpc":"2.0","id":1,"result":{"transfers":[{"hash":"0xaaa","from":"0xwallet"}]}}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "params": [{"toAddress": "0xwallet"}]
            })))
            .with_status(200)
            .with_body(r#"{"jsonrpc":"2.0","id":2,"error":{"code":-32000,"message":"rate limited"}}"#)
            .create_async()
            .await;

        let service = BaseService::new(
            reqwest::Client::new(),
            &server.url(),
            "0xwallet",
            oracle_for(&server),
        );

        let transfers = service.fetch_transfers().await;
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].hash, "0xaaa");
    }

    #[tokio::test]
    async fn unreachable_upstream_yields_empty_list() {
        let server = mockito::Server::new_async().await;
        let service = BaseService::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1",
            "0xwallet",
            oracle_for(&server),
        );
        assert!(service.fetch_transfers().await.is_empty());
    }

    #[test]
    fn hex_block_numbers_decode_with_zero_fallback() {
        assert_eq!(parse_hex_u64("0x1b4"), 436);
        assert_eq!(parse_hex_u64("bogus"), 0);
    }
}
