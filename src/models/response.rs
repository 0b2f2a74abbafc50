use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct StatsResponse {
    pub total_transactions: i64,
    pub base_transactions: i64,
    pub solana_transactions: i64,
    pub recent_24h: i64,
    pub total_value_eth: f64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub alchemy_configured: bool,
    pub discord_configured: bool,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}
