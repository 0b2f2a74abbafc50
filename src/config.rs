use anyhow::{bail, Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: String,

    // Upstream credentials (optional; health probe reports whether they are set)
    pub alchemy_api_key: Option<String>,
    pub discord_webhook: Option<String>,

    // Monitored wallets
    pub base_wallet: String,
    pub solana_wallet: String,

    // Upstream endpoints
    pub base_rpc_url: String,
    pub solana_rpc_url: String,
    pub coingecko_url: String,
    pub dexscreener_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let alchemy_api_key = std::env::var("ALCHEMY_API_KEY")
            .ok()
            .filter(|k| !k.is_empty());
        let discord_webhook = std::env::var("DISCORD_WEBHOOK")
            .ok()
            .filter(|u| !u.is_empty());

        let api_key = alchemy_api_key.clone().unwrap_or_default();

        let config = Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .context("Invalid PORT")?,

            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| "data/onchain.db".to_string()),

            base_wallet: std::env::var("BASE_WALLET")
                .unwrap_or_else(|_| "0x75f39d9Bff76d376F3960028d98F324aAbB6c5e6".to_string()),
            solana_wallet: std::env::var("SOLANA_WALLET")
                .unwrap_or_else(|_| "FeB1jqjCFKyQ2vVTPLgYmZu1yLvBWhsGoudP46fhhF8z".to_string()),

            base_rpc_url: std::env::var("BASE_RPC_URL").unwrap_or_else(|_| {
                format!("https://base-mainnet.g.alchemy.com/v2/{}", api_key)
            }),
            solana_rpc_url: std::env::var("SOLANA_RPC_URL").unwrap_or_else(|_| {
                format!("https://solana-mainnet.g.alchemy.com/v2/{}", api_key)
            }),
            coingecko_url: std::env::var("COINGECKO_URL")
                .unwrap_or_else(|_| "https://api.coingecko.com/api/v3".to_string()),
            dexscreener_url: std::env::var("DEXSCREENER_URL")
                .unwrap_or_else(|_| "https://api.dexscreener.com".to_string()),

            alchemy_api_key,
            discord_webhook,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !self.base_rpc_url.starts_with("http") {
            bail!("BASE_RPC_URL must be HTTP(S) URL");
        }
        if !self.solana_rpc_url.starts_with("http") {
            bail!("SOLANA_RPC_URL must be HTTP(S) URL");
        }

        if self.alchemy_api_key.is_none() {
            tracing::warn!("ALCHEMY_API_KEY not set, upstream fetches will return nothing");
        }
        if self.discord_webhook.is_none() {
            tracing::warn!("DISCORD_WEBHOOK not set, notifications disabled");
        }

        Ok(())
    }
}
