use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Base,
    Solana,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Base => "base",
            Network::Solana => "solana",
        }
    }

    pub fn native_symbol(&self) -> &'static str {
        match self {
            Network::Base => "ETH",
            Network::Solana => "SOL",
        }
    }

    pub fn explorer_tx_url(&self, hash: &str) -> String {
        match self {
            Network::Base => format!("https://basescan.org/tx/{}", hash),
            Network::Solana => format!("https://explorer.solana.com/tx/{}", hash),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Confirmed,
    Failed,
}

impl TxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxStatus::Confirmed => "confirmed",
            TxStatus::Failed => "failed",
        }
    }
}

/// Canonical transaction row, one per observed transfer. Immutable once
/// stored; `hash` is the primary key across both networks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub hash: String,
    pub network: Network,
    pub from_address: String,
    pub to_address: String,
    /// Wei string on Base, SOL float string on Solana. The unit mismatch is
    /// carried through unchanged for read-API compatibility.
    pub value: String,
    pub timestamp: i64,
    pub block_number: i64,
    pub status: TxStatus,
    pub gas_used: String,
    pub token_symbol: String,
    /// Empty for native-asset transfers.
    pub token_address: String,
    pub usd_value: String,
    pub notified: bool,
}

/// Append-only per-network aggregate taken once per monitoring cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySnapshot {
    pub id: i64,
    pub timestamp: i64,
    pub network: Network,
    pub transaction_count: i64,
    pub total_value: String,
}

/// "0" for unknown or zero amounts, shortest round-trip float otherwise.
pub fn decimal_string(v: f64) -> String {
    if v == 0.0 {
        "0".to_string()
    } else {
        format!("{:?}", v)
    }
}
