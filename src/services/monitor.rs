use crate::models::{decimal_string, Network, TransactionRecord};
use crate::services::{BaseService, Notifier, SolanaService, TransactionStore};
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tokio::time::{interval, Duration};

const POLL_INTERVAL: Duration = Duration::from_secs(300);

/// The ingestion scheduler: fetch, normalize, insert-if-absent, notify, and
/// snapshot, once per interval. Runs beside the API server and shares only
/// the store with it.
pub struct Monitor {
    base: Arc<BaseService>,
    solana: Arc<SolanaService>,
    store: Arc<TransactionStore>,
    notifier: Arc<Notifier>,
}

impl Monitor {
    pub fn new(
        base: Arc<BaseService>,
        solana: Arc<SolanaService>,
        store: Arc<TransactionStore>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            base,
            solana,
            store,
            notifier,
        }
    }

    /// Infinite polling loop. A failed cycle is logged and the loop moves on
    /// to the next tick; nothing here terminates the task.
    pub async fn run(&self) {
        tracing::info!("Starting transaction monitoring...");

        let mut ticker = interval(POLL_INTERVAL);
        loop {
            ticker.tick().await;
            if let Err(e) = self.run_cycle().await {
                tracing::error!("Error in monitoring loop: {}", e);
            }
        }
    }

    /// One full ingestion cycle. Public so tests can drive synthetic ticks.
    pub async fn run_cycle(&self) -> Result<()> {
        let base_transfers = self.base.fetch_transfers().await;
        for tx in &base_transfers {
            let record = self.base.normalize(tx).await;
            self.ingest(record).await;
        }

        let solana_activity = self.solana.fetch_transactions().await;
        for activity in &solana_activity {
            let record = self.solana.normalize(activity).await;
            self.ingest(record).await;
        }

        self.snapshot().await?;

        tracing::info!(
            "Monitoring cycle complete. Base: {} txs, Solana: {} txs",
            base_transfers.len(),
            solana_activity.len()
        );
        Ok(())
    }

    async fn ingest(&self, record: TransactionRecord) {
        match self.store.insert_if_absent(&record).await {
            Ok(true) => self.notifier.notify(&record).await,
            Ok(false) => {}
            Err(e) => tracing::error!("Failed to store transaction {}: {}", record.hash, e),
        }
    }

    async fn snapshot(&self) -> Result<()> {
        let now = Utc::now().timestamp();
        for network in [Network::Base, Network::Solana] {
            let (count, total) = self.store.network_totals(network).await?;
            self.store
                .record_snapshot(network, count, &decimal_string(total), now)
                .await?;
        }
        Ok(())
    }
}
