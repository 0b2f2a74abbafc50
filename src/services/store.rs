use crate::models::{ActivitySnapshot, Network, StatsResponse, TransactionRecord, TxStatus};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ValueRef};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS transactions (
    hash TEXT PRIMARY KEY,
    network TEXT NOT NULL,
    from_address TEXT NOT NULL DEFAULT '',
    to_address TEXT NOT NULL DEFAULT '',
    value TEXT NOT NULL DEFAULT '0',
    timestamp INTEGER NOT NULL,
    block_number INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL,
    gas_used TEXT NOT NULL DEFAULT '0',
    token_symbol TEXT NOT NULL DEFAULT '',
    token_address TEXT NOT NULL DEFAULT '',
    usd_value TEXT NOT NULL DEFAULT '0',
    notified INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS activity_snapshots (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp INTEGER NOT NULL,
    network TEXT NOT NULL,
    transaction_count INTEGER NOT NULL,
    total_value TEXT NOT NULL
);
";

impl FromSql for Network {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "base" => Ok(Network::Base),
            "solana" => Ok(Network::Solana),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

impl FromSql for TxStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "confirmed" => Ok(TxStatus::Confirmed),
            "failed" => Ok(TxStatus::Failed),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

/// SQLite persistence shared by the single-writer scheduler and the
/// read-only API handlers. Every operation opens its own short-lived
/// connection; SQLite's file locking covers the writer/reader overlap.
pub struct TransactionStore {
    db_path: PathBuf,
}

impl TransactionStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            db_path: path.to_path_buf(),
        })
    }

    async fn with_conn<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&path).context("Failed to open database")?;
            op(&conn)
        })
        .await
        .context("Storage task panicked")?
    }

    pub async fn exists(&self, hash: &str) -> Result<bool> {
        let hash = hash.to_string();
        self.with_conn(move |conn| {
            let found = conn
                .query_row(
                    "SELECT hash FROM transactions WHERE hash = ?1",
                    params![hash],
                    |_| Ok(()),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }

    /// Inserts the record unless its hash is already present. The primary
    /// key does the dedupe; zero rows changed means a duplicate.
    pub async fn insert_if_absent(&self, record: &TransactionRecord) -> Result<bool> {
        let rec = record.clone();
        self.with_conn(move |conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO transactions
                 (hash, network, from_address, to_address, value, timestamp, block_number,
                  status, gas_used, token_symbol, token_address, usd_value, notified)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    rec.hash,
                    rec.network.as_str(),
                    rec.from_address,
                    rec.to_address,
                    rec.value,
                    rec.timestamp,
                    rec.block_number,
                    rec.status.as_str(),
                    rec.gas_used,
                    rec.token_symbol,
                    rec.token_address,
                    rec.usd_value,
                    rec.notified,
                ],
            )?;
            Ok(inserted > 0)
        })
        .await
    }

    /// Appends one aggregate row; snapshots are never deduplicated.
    pub async fn record_snapshot(
        &self,
        network: Network,
        count: i64,
        total_value: &str,
        timestamp: i64,
    ) -> Result<()> {
        let total_value = total_value.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO activity_snapshots (timestamp, network, transaction_count, total_value)
                 VALUES (?1, ?2, ?3, ?4)",
                params![timestamp, network.as_str(), count, total_value],
            )?;
            Ok(())
        })
        .await
    }

    /// Cumulative count and value sum for one network, as fed into snapshots.
    pub async fn network_totals(&self, network: Network) -> Result<(i64, f64)> {
        self.with_conn(move |conn| {
            let totals = conn.query_row(
                "SELECT COUNT(*), SUM(CAST(value AS REAL)) FROM transactions WHERE network = ?1",
                params![network.as_str()],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, Option<f64>>(1)?)),
            )?;
            Ok((totals.0, totals.1.unwrap_or(0.0)))
        })
        .await
    }

    pub async fn stats(&self) -> Result<StatsResponse> {
        self.with_conn(move |conn| {
            let count_for = |network: &str| {
                conn.query_row(
                    "SELECT COUNT(*) FROM transactions WHERE network = ?1",
                    params![network],
                    |row| row.get::<_, i64>(0),
                )
            };
            let base_transactions = count_for("base")?;
            let solana_transactions = count_for("solana")?;

            let cutoff = Utc::now().timestamp() - 86_400;
            let recent_24h: i64 = conn.query_row(
                "SELECT COUNT(*) FROM transactions WHERE timestamp > ?1",
                params![cutoff],
                |row| row.get(0),
            )?;

            let total_wei: Option<f64> = conn.query_row(
                "SELECT SUM(CAST(value AS REAL)) FROM transactions WHERE network = 'base'",
                [],
                |row| row.get(0),
            )?;

            Ok(StatsResponse {
                total_transactions: base_transactions + solana_transactions,
                base_transactions,
                solana_transactions,
                recent_24h,
                total_value_eth: total_wei.unwrap_or(0.0) / 1e18,
            })
        })
        .await
    }

    pub async fn recent_transactions(&self, limit: i64) -> Result<Vec<TransactionRecord>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT hash, network, from_address, to_address, value, timestamp, block_number,
                        status, gas_used, token_symbol, token_address, usd_value, notified
                 FROM transactions
                 ORDER BY timestamp DESC
                 LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit], |row| {
                Ok(TransactionRecord {
                    hash: row.get(0)?,
                    network: row.get(1)?,
                    from_address: row.get(2)?,
                    to_address: row.get(3)?,
                    value: row.get(4)?,
                    timestamp: row.get(5)?,
                    block_number: row.get(6)?,
                    status: row.get(7)?,
                    gas_used: row.get(8)?,
                    token_symbol: row.get(9)?,
                    token_address: row.get(10)?,
                    usd_value: row.get(11)?,
                    notified: row.get(12)?,
                })
            })?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
        .await
    }

    pub async fn snapshots_since(&self, cutoff: i64) -> Result<Vec<ActivitySnapshot>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, timestamp, network, transaction_count, total_value
                 FROM activity_snapshots
                 WHERE timestamp > ?1
                 ORDER BY timestamp ASC",
            )?;
            let rows = stmt.query_map(params![cutoff], |row| {
                Ok(ActivitySnapshot {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    network: row.get(2)?,
                    transaction_count: row.get(3)?,
                    total_value: row.get(4)?,
                })
            })?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
        .await
    }
}
