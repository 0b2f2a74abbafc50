use crate::models::{Network, TransactionRecord};
use chrono::{TimeZone, Utc};
use serde_json::json;

/// Fire-and-forget Discord webhook alerts. Delivery failures are logged and
/// swallowed; there is no retry or queue.
pub struct Notifier {
    client: reqwest::Client,
    webhook_url: Option<String>,
}

impl Notifier {
    pub fn new(client: reqwest::Client, webhook_url: Option<String>) -> Self {
        Self {
            client,
            webhook_url,
        }
    }

    pub async fn notify(&self, record: &TransactionRecord) {
        let Some(url) = self.webhook_url.as_deref() else {
            return;
        };

        let payload = json!({ "embeds": [build_embed(record)] });
        match self.client.post(url).json(&payload).send().await {
            Ok(_) => tracing::info!("Discord notification sent for tx: {}", record.hash),
            Err(e) => tracing::error!("Failed to send Discord notification: {}", e),
        }
    }
}

fn build_embed(record: &TransactionRecord) -> serde_json::Value {
    let (emoji, color) = match record.network {
        Network::Base => ("\u{1F535}", 5_814_783),
        Network::Solana => ("\u{1F7E3}", 9_055_202),
    };

    let timestamp = Utc
        .timestamp_opt(record.timestamp, 0)
        .single()
        .unwrap_or_else(Utc::now)
        .to_rfc3339();

    json!({
        "title": format!(
            "{} New Transaction on {}",
            emoji,
            record.network.as_str().to_uppercase()
        ),
        "color": color,
        "fields": [
            {
                "name": "From",
                "value": format!("`{}`", truncate_address(&record.from_address)),
                "inline": true
            },
            {
                "name": "To",
                "value": format!("`{}`", truncate_address(&record.to_address)),
                "inline": true
            },
            {
                "name": "Value",
                "value": format!(
                    "{:.6} {}",
                    display_value(record),
                    record.network.native_symbol()
                ),
                "inline": true
            },
            {
                "name": "Hash",
                "value": format!(
                    "[View on Explorer]({})",
                    record.network.explorer_tx_url(&record.hash)
                ),
                "inline": false
            }
        ],
        "timestamp": timestamp,
    })
}

/// Stored values are wei on Base but already SOL-denominated on Solana.
fn display_value(record: &TransactionRecord) -> f64 {
    let raw = record.value.parse::<f64>().unwrap_or(0.0);
    match record.network {
        Network::Base => raw / 1e18,
        Network::Solana => raw,
    }
}

fn truncate_address(addr: &str) -> String {
    if addr.len() <= 18 {
        return addr.to_string();
    }
    format!("{}...{}", &addr[..10], &addr[addr.len() - 8..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TxStatus;

    fn record(network: Network, value: &str) -> TransactionRecord {
        TransactionRecord {
            hash: "0xabc".to_string(),
            network,
            from_address: "0x75f39d9Bff76d376F3960028d98F324aAbB6c5e6".to_string(),
            to_address: "0xshort".to_string(),
            value: value.to_string(),
            timestamp: 1_700_000_000,
            block_number: 1,
            status: TxStatus::Confirmed,
            gas_used: "0".to_string(),
            token_symbol: "ETH".to_string(),
            token_address: String::new(),
            usd_value: "0".to_string(),
            notified: false,
        }
    }

    #[tokio::test]
    async fn notify_posts_embed_to_webhook() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/webhook")
            .with_status(204)
            .create_async()
            .await;

        let notifier = Notifier::new(
            reqwest::Client::new(),
            Some(format!("{}/webhook", server.url())),
        );
        notifier.notify(&record(Network::Base, "1000000000000000000")).await;

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_webhook_is_a_noop() {
        let notifier = Notifier::new(reqwest::Client::new(), None);
        notifier.notify(&record(Network::Base, "0")).await;
    }

    #[test]
    fn addresses_truncate_long_and_pass_short() {
        assert_eq!(
            truncate_address("0x75f39d9Bff76d376F3960028d98F324aAbB6c5e6"),
            "0x75f39d9B...AbB6c5e6"
        );
        assert_eq!(truncate_address(""), "");
        assert_eq!(truncate_address("0xshort"), "0xshort");
    }

    #[test]
    fn values_convert_per_network() {
        assert_eq!(display_value(&record(Network::Base, "1000000000000000000")), 1.0);
        assert_eq!(display_value(&record(Network::Solana, "0.5")), 0.5);
    }
}
