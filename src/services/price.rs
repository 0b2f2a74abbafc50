use crate::models::{NativePrices, SimplePriceResponse, TokenPairsResponse};
use anyhow::Result;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

/// Generic-feed prices are served from a single shared slot for this long.
const PRICE_CACHE_TTL_SECS: u64 = 300;

/// Time source for cache expiry. Injected so tests can move time instead of
/// sleeping through the TTL.
pub trait Clock: Send + Sync {
    fn now_unix(&self) -> u64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

struct CachedPrices {
    prices: NativePrices,
    fetched_at: u64,
}

pub struct PriceOracle {
    client: reqwest::Client,
    coingecko_url: String,
    dexscreener_url: String,
    cache: RwLock<Option<CachedPrices>>,
    clock: Box<dyn Clock>,
}

impl PriceOracle {
    pub fn new(client: reqwest::Client, coingecko_url: &str, dexscreener_url: &str) -> Self {
        Self::with_clock(client, coingecko_url, dexscreener_url, Box::new(SystemClock))
    }

    pub fn with_clock(
        client: reqwest::Client,
        coingecko_url: &str,
        dexscreener_url: &str,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            client,
            coingecko_url: coingecko_url.trim_end_matches('/').to_string(),
            dexscreener_url: dexscreener_url.trim_end_matches('/').to_string(),
            cache: RwLock::new(None),
            clock,
        }
    }

    /// Native-asset USD prices, refreshed at most once per TTL window. A
    /// failed refresh falls back to the last cached value, or zeros when
    /// nothing was ever fetched.
    pub async fn native_prices(&self) -> NativePrices {
        let now = self.clock.now_unix();

        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if now.saturating_sub(cached.fetched_at) < PRICE_CACHE_TTL_SECS {
                    return cached.prices;
                }
            }
        }

        match self.fetch_native_prices().await {
            Ok(prices) => {
                let mut cache = self.cache.write().await;
                *cache = Some(CachedPrices {
                    prices,
                    fetched_at: now,
                });
                prices
            }
            Err(e) => {
                tracing::warn!("Native price refresh failed: {}", e);
                let cache = self.cache.read().await;
                cache.as_ref().map(|c| c.prices).unwrap_or_default()
            }
        }
    }

    async fn fetch_native_prices(&self) -> Result<NativePrices> {
        let url = format!(
            "{}/simple/price?ids=ethereum,solana&vs_currencies=usd",
            self.coingecko_url
        );
        let body: SimplePriceResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(NativePrices {
            eth_usd: body.ethereum.and_then(|p| p.usd).unwrap_or(0.0),
            sol_usd: body.solana.and_then(|p| p.usd).unwrap_or(0.0),
        })
    }

    /// Per-token USD price from the most liquid pair on the given chain.
    /// Uncached; returns 0.0 on any failure or when no pair matches.
    pub async fn token_price(&self, token_address: &str, chain: &str) -> f64 {
        match self.fetch_token_price(token_address, chain).await {
            Ok(price) => price,
            Err(e) => {
                tracing::warn!("Token price lookup failed for {}: {}", token_address, e);
                0.0
            }
        }
    }

    async fn fetch_token_price(&self, token_address: &str, chain: &str) -> Result<f64> {
        let url = format!("{}/latest/dex/tokens/{}", self.dexscreener_url, token_address);
        let body: TokenPairsResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let best = body
            .pairs
            .unwrap_or_default()
            .into_iter()
            .filter(|p| p.chain_id == chain)
            .max_by(|a, b| a.liquidity_usd().total_cmp(&b.liquidity_usd()));

        Ok(best
            .and_then(|p| p.price_usd)
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.0))
    }
}
