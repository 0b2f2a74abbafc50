pub mod activity;
pub mod health;
pub mod stats;
pub mod transactions;

pub use activity::*;
pub use health::*;
pub use stats::*;
pub use transactions::*;

use crate::services::TransactionStore;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TransactionStore>,
    pub alchemy_configured: bool,
    pub discord_configured: bool,
    pub started_at: Instant,
}
