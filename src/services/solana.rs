use crate::models::{
    decimal_string, Network, RpcEnvelope, SignatureInfo, SolanaTransaction, SolanaTransactionMeta,
    TransactionRecord, TxStatus,
};
use crate::services::PriceOracle;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

const SIGNATURE_PAGE_LIMIT: usize = 50;

/// Detail fetches are the expensive half of the RPC budget; only the most
/// recent signatures get expanded.
const DETAIL_FETCH_LIMIT: usize = 10;

const LAMPORTS_PER_SOL: f64 = 1e9;

/// One signature with its fully parsed transaction body.
#[derive(Debug, Clone)]
pub struct SolanaActivity {
    pub signature: String,
    pub detail: SolanaTransaction,
}

pub struct SolanaService {
    client: reqwest::Client,
    rpc_url: String,
    wallet: String,
    oracle: Arc<PriceOracle>,
}

impl SolanaService {
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

    /// Recent wallet activity: signature listing followed by capped detail
    /// expansion. A signature whose detail fetch fails is excluded outright.
    pub async fn fetch_transactions(&self) -> Vec<SolanaActivity> {
        let signatures = self.fetch_signatures().await;

        let mut activity = Vec::new();
        for info in signatures.into_iter().take(DETAIL_FETCH_LIMIT) {
            if let Some(detail) = self.fetch_detail(&info.signature).await {
                activity.push(SolanaActivity {
                    signature: info.signature,
                    detail,
                });
            }
        }
        activity
    }

    async fn fetch_signatures(&self) -> Vec<SignatureInfo> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getSignaturesForAddress",
            "params": [self.wallet, {"limit": SIGNATURE_PAGE_LIMIT}],
        });

        let response = match self.client.post(&self.rpc_url).json(&body).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::error!("Error fetching Solana signatures: {}", e);
                return Vec::new();
            }
        };

        let envelope: RpcEnvelope<Vec<SignatureInfo>> = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                tracing::error!("Malformed Solana signature response: {}", e);
                return Vec::new();
            }
        };

        if let Some(err) = envelope.error {
            tracing::error!("Alchemy API error (signatures): {}", err.message);
            return Vec::new();
        }

        let signatures = envelope.result.unwrap_or_default();
        tracing::info!("Found {} Solana signatures", signatures.len());
        signatures
    }

    async fn fetch_detail(&self, signature: &str) -> Option<SolanaTransaction> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getTransaction",
            "params": [signature, {"encoding": "jsonParsed", "maxSupportedTransactionVersion": 0}],
        });

        let response = match self.client.post(&self.rpc_url).json(&body).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Error fetching Solana transaction {}: {}", signature, e);
                return None;
            }
        };

        let envelope: RpcEnvelope<SolanaTransaction> = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Malformed Solana transaction {}: {}", signature, e);
                return None;
            }
        };

        if let Some(err) = envelope.error {
            tracing::warn!("Alchemy API error (transaction {}): {}", signature, err.message);
            return None;
        }

        envelope.result
    }

    /// Maps one parsed transaction into the canonical record via the wallet's
    /// pre/post balance delta. A wallet missing from the account list still
    /// produces a (degraded) record with empty addresses and zero value.
    pub async fn normalize(&self, activity: &SolanaActivity) -> TransactionRecord {
        let detail = &activity.detail;

        let keys: Vec<&str> = detail
            .transaction
            .as_ref()
            .and_then(|t| t.message.as_ref())
            .map(|m| m.account_keys.iter().map(|k| k.pubkey.as_str()).collect())
            .unwrap_or_default();

        let mut from_address = String::new();
        let mut to_address = String::new();
        let mut sol_moved = 0.0_f64;

        let wallet_index = keys.iter().position(|k| *k == self.wallet);
        if let (Some(idx), Some(meta)) = (wallet_index, detail.meta.as_ref()) {
            let delta = balance_delta(meta, idx);
            sol_moved = delta.unsigned_abs() as f64 / LAMPORTS_PER_SOL;

            // Counterparty attribution is a heuristic: the first other
            // account whose balance moved the opposite way wins, which can
            // misattribute multi-party transactions.
            if delta > 0 {
                to_address = self.wallet.clone();
                from_address = counterparty(&keys, meta, idx, |d| d < 0);
            } else if delta < 0 {
                from_address = self.wallet.clone();
                to_address = counterparty(&keys, meta, idx, |d| d > 0);
            }
        }

        let usd = if sol_moved == 0.0 {
            0.0
        } else {
            sol_moved * self.oracle.native_prices().await.sol_usd
        };

        let status = match detail.meta.as_ref().and_then(|m| m.err.as_ref()) {
            Some(_) => TxStatus::Failed,
            None => TxStatus::Confirmed,
        };

        TransactionRecord {
            hash: activity.signature.clone(),
            network: Network::Solana,
            from_address,
            to_address,
            value: decimal_string(sol_moved),
            timestamp: detail
                .block_time
                .unwrap_or_else(|| Utc::now().timestamp()),
            block_number: detail.slot.unwrap_or(0) as i64,
            status,
            gas_used: "0".to_string(),
            token_symbol: Network::Solana.native_symbol().to_string(),
            token_address: String::new(),
            usd_value: decimal_string(usd),
            notified: false,
        }
    }
}

fn balance_delta(meta: &SolanaTransactionMeta, index: usize) -> i64 {
    let pre = meta.pre_balances.get(index).copied().unwrap_or(0) as i64;
    let post = meta.post_balances.get(index).copied().unwrap_or(0) as i64;
    post - pre
}

fn counterparty<F>(keys: &[&str], meta: &SolanaTransactionMeta, wallet_index: usize, moved: F) -> String
where
    F: Fn(i64) -> bool,
{
    for (i, key) in keys.iter().enumerate() {
        if i == wallet_index {
            continue;
        }
        if moved(balance_delta(meta, i)) {
            return key.to_string();
        }
    }
    String::new()
}
