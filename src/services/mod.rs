pub mod base;
pub mod monitor;
pub mod notifier;
pub mod price;
pub mod solana;
pub mod store;

pub use base::BaseService;
pub use monitor::Monitor;
pub use notifier::Notifier;
pub use price::{Clock, PriceOracle, SystemClock};
pub use solana::SolanaService;
pub use store::TransactionStore;
