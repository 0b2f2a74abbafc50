use serde::Deserialize;
use serde_json::Value;

/// JSON-RPC envelope shared by every Alchemy call.
#[derive(Debug, Deserialize)]
pub struct RpcEnvelope<T> {
    pub result: Option<T>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

// --- Base: alchemy_getAssetTransfers ---

#[derive(Debug, Deserialize)]
pub struct AssetTransfersResult {
    #[serde(default)]
    pub transfers: Vec<AssetTransfer>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetTransfer {
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub from: String,
    pub to: Option<String>,
    /// Number or string upstream; stored verbatim, parsed only for USD math.
    pub value: Option<Value>,
    pub asset: Option<String>,
    pub block_num: Option<String>,
    pub raw_contract: Option<RawContract>,
    pub metadata: Option<TransferMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContract {
    pub address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferMetadata {
    pub block_timestamp: Option<String>,
}

// --- Solana: getSignaturesForAddress / getTransaction ---

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInfo {
    pub signature: String,
    pub slot: Option<u64>,
    pub block_time: Option<i64>,
    pub err: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolanaTransaction {
    pub slot: Option<u64>,
    pub block_time: Option<i64>,
    pub meta: Option<SolanaTransactionMeta>,
    pub transaction: Option<SolanaTransactionBody>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolanaTransactionMeta {
    pub err: Option<Value>,
    #[serde(default)]
    pub pre_balances: Vec<u64>,
    #[serde(default)]
    pub post_balances: Vec<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolanaTransactionBody {
    pub message: Option<SolanaMessage>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolanaMessage {
    #[serde(default)]
    pub account_keys: Vec<SolanaAccountKey>,
}

/// jsonParsed account entry; only the pubkey matters here.
#[derive(Debug, Clone, Deserialize)]
pub struct SolanaAccountKey {
    pub pubkey: String,
}
