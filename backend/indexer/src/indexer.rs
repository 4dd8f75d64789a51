//! Long-running background task that polls the Soroban RPC and writes
//! decoded PostInvest events to the database.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::Config;
use crate::db;
use crate::errors::Result;
use crate::rpc;

pub struct IndexerState {
    pub pool: SqlitePool,
    pub config: Config,
    pub client: Client,
}

/// Where the next `getEvents` call should start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub ledger: u32,
    pub cursor: Option<String>,
}

impl Position {
    /// A saved ledger wins over the configured start ledger.
    pub fn resume(saved_ledger: i64, saved_cursor: Option<String>, start_ledger: u32) -> Self {
        let ledger = u32::try_from(saved_ledger)
            .ok()
            .filter(|l| *l > 0)
            .unwrap_or(start_ledger);
        Self {
            ledger,
            cursor: saved_cursor,
        }
    }

    /// Advance after a page was fetched.
    ///
    /// A returned cursor is kept so the next call paginates within the same
    /// range; the ledger only ever moves forward.
    pub fn advance(&self, next_cursor: Option<String>, latest_ledger: Option<u64>) -> Self {
        let ledger = latest_ledger
            .and_then(|l| u32::try_from(l).ok())
            .map(|l| l.max(self.ledger))
            .unwrap_or(self.ledger);
        Self {
            ledger,
            cursor: next_cursor,
        }
    }
}

/// Run the indexer loop until `shutdown` is cancelled.
pub async fn run(state: Arc<IndexerState>, shutdown: CancellationToken) {
    info!("Indexer starting, contract: {}", state.config.contract_id);

    let saved_ledger = db::get_last_ledger(&state.pool).await.unwrap_or(0);
    let saved_cursor = db::get_cursor_string(&state.pool).await.unwrap_or(None);
    let mut position = Position::resume(saved_ledger, saved_cursor, state.config.start_ledger);

    info!("Resuming from ledger {}", position.ledger);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            result = poll_once(&state, &position) => match result {
                Ok(next) => position = next,
                Err(e) => error!("Indexer poll error: {e}"),
            },
        }

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(Duration::from_secs(state.config.poll_interval_secs)) => {}
        }
    }

    info!("Indexer stopped at ledger {}", position.ledger);
}

/// Perform a single poll iteration and return the next position.
async fn poll_once(state: &IndexerState, position: &Position) -> Result<Position> {
    let config = &state.config;
    let (raw_events, next_cursor, latest_ledger) = rpc::fetch_events(
        &state.client,
        &config.rpc_url,
        &config.contract_id,
        position.ledger,
        position.cursor.as_deref(),
        config.events_per_page,
    )
    .await?;

    if !raw_events.is_empty() {
        let decoded = rpc::decode_events(&raw_events, &config.contract_id);
        let inserted = db::insert_events(&state.pool, &decoded).await?;
        info!(
            "Polled {} raw events → {} new records stored",
            raw_events.len(),
            inserted
        );
    }

    let next = position.advance(next_cursor, latest_ledger);

    // Persist so restarts are deterministic.
    db::save_cursor(&state.pool, i64::from(next.ledger), next.cursor.as_deref()).await?;

    Ok(next)
}
