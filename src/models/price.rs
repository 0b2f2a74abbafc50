use serde::{Deserialize, Serialize};

/// USD prices for the two native assets, fetched in one batched call.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NativePrices {
    pub eth_usd: f64,
    pub sol_usd: f64,
}

// CoinGecko /simple/price?ids=ethereum,solana&vs_currencies=usd
#[derive(Debug, Deserialize)]
pub struct SimplePriceResponse {
    pub ethereum: Option<AssetPrice>,
    pub solana: Option<AssetPrice>,
}

#[derive(Debug, Deserialize)]
pub struct AssetPrice {
    pub usd: Option<f64>,
}

// DexScreener /latest/dex/tokens/{address}
#[derive(Debug, Deserialize)]
pub struct TokenPairsResponse {
    pub pairs: Option<Vec<TokenPair>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    #[serde(default)]
    pub chain_id: String,
    pub price_usd: Option<String>,
    pub liquidity: Option<PairLiquidity>,
}

impl TokenPair {
    pub fn liquidity_usd(&self) -> f64 {
        self.liquidity.as_ref().and_then(|l| l.usd).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PairLiquidity {
    pub usd: Option<f64>,
}
