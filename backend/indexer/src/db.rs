//! Database layer: migrations, queries, and cursor management.

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::info;

use crate::errors::{IndexerError, Result};
use crate::events::{EventKind, EventRecord, FlowTotals, PostInvestEvent};

const EVENT_COLUMNS: &str = "id, event_key, event_type, project_id, story_id, actor, amount, \
                             ledger, timestamp, contract_id, tx_hash, created_at";

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };
    // Create the database file on first start.
    let url = if url.contains(":memory:") || url.contains("mode=") {
        url
    } else if url.contains('?') {
        format!("{url}&mode=rwc")
    } else {
        format!("{url}?mode=rwc")
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await?;

    run_migrations(&pool).await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied successfully");
    Ok(())
}

// ─────────────────────────────────────────────────────────
// Cursor helpers
// ─────────────────────────────────────────────────────────

/// Read the last-seen ledger from the cursor row.
/// Returns `0` when no cursor has been persisted yet.
pub async fn get_last_ledger(pool: &SqlitePool) -> Result<i64> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT last_ledger FROM indexer_cursor WHERE id = 1")
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(v,)| v).unwrap_or(0))
}

/// Persist the last-seen ledger (and optionally a pagination cursor string).
pub async fn save_cursor(
    pool: &SqlitePool,
    last_ledger: i64,
    last_cursor: Option<&str>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO indexer_cursor (id, last_ledger, last_cursor) VALUES (1, ?1, ?2)
        ON CONFLICT(id) DO UPDATE SET last_ledger = excluded.last_ledger,
                                      last_cursor = excluded.last_cursor
        "#,
    )
    .bind(last_ledger)
    .bind(last_cursor)
    .execute(pool)
    .await?;
    Ok(())
}

/// Read back the raw cursor string (used to resume pagination mid-ledger).
pub async fn get_cursor_string(pool: &SqlitePool) -> Result<Option<String>> {
    let row: Option<(Option<String>,)> =
        sqlx::query_as("SELECT last_cursor FROM indexer_cursor WHERE id = 1")
            .fetch_optional(pool)
            .await?;
    Ok(row.and_then(|(v,)| v))
}

// ─────────────────────────────────────────────────────────
// Event writes
// ─────────────────────────────────────────────────────────

/// Persist a batch of decoded events in one transaction.
///
/// Events whose `event_key` is already stored are skipped, so replaying a
/// page after a restart is harmless. Returns the number of new rows.
pub async fn insert_events(pool: &SqlitePool, events: &[PostInvestEvent]) -> Result<usize> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;
    for ev in events {
        let rows_affected = sqlx::query(
            r#"
            INSERT OR IGNORE INTO events
                (event_key, event_type, project_id, story_id, actor, amount,
                 ledger, timestamp, contract_id, tx_hash)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&ev.event_key)
        .bind(&ev.event_type)
        .bind(&ev.project_id)
        .bind(&ev.story_id)
        .bind(&ev.actor)
        .bind(&ev.amount)
        .bind(ev.ledger)
        .bind(ev.timestamp)
        .bind(&ev.contract_id)
        .bind(&ev.tx_hash)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        count += rows_affected as usize;
    }
    tx.commit().await?;
    Ok(count)
}

// ─────────────────────────────────────────────────────────
// Event reads
// ─────────────────────────────────────────────────────────

/// Fetch all events, optionally restricted to one stored event type.
pub async fn get_all_events(
    pool: &SqlitePool,
    event_type: Option<&str>,
) -> Result<Vec<EventRecord>> {
    let rows = match event_type {
        Some(kind) => {
            sqlx::query_as::<_, EventRecord>(&format!(
                "SELECT {EVENT_COLUMNS} FROM events WHERE event_type = ?1 \
                 ORDER BY ledger ASC, id ASC"
            ))
            .bind(kind)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, EventRecord>(&format!(
                "SELECT {EVENT_COLUMNS} FROM events ORDER BY ledger ASC, id ASC"
            ))
            .fetch_all(pool)
            .await?
        }
    };
    Ok(rows)
}

/// Fetch all events for a given project, including its stories' creation events.
pub async fn get_events_for_project(
    pool: &SqlitePool,
    project_id: &str,
) -> Result<Vec<EventRecord>> {
    events_where(pool, "project_id", project_id).await
}

/// Fetch the lifecycle of a single user story.
pub async fn get_events_for_story(pool: &SqlitePool, story_id: &str) -> Result<Vec<EventRecord>> {
    events_where(pool, "story_id", story_id).await
}

/// Fetch every event in which `address` was the acting party.
pub async fn get_events_for_actor(pool: &SqlitePool, address: &str) -> Result<Vec<EventRecord>> {
    events_where(pool, "actor", address).await
}

async fn events_where(
    pool: &SqlitePool,
    column: &'static str,
    value: &str,
) -> Result<Vec<EventRecord>> {
    let rows = sqlx::query_as::<_, EventRecord>(&format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE {column} = ?1 ORDER BY ledger ASC, id ASC"
    ))
    .bind(value)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Sum the amounts of value-moving events.
///
/// Amounts are stored as decimal text since they are `i128` on chain.
pub async fn get_flow_totals(pool: &SqlitePool) -> Result<FlowTotals> {
    let rows: Vec<(String, Option<String>)> = sqlx::query_as(
        r#"
        SELECT event_type, amount
        FROM   events
        WHERE  event_type IN (?1, ?2, ?3)
        "#,
    )
    .bind(EventKind::FundsReceived.as_str())
    .bind(EventKind::DarfRedeemed.as_str())
    .bind(EventKind::StoryPaidOut.as_str())
    .fetch_all(pool)
    .await?;

    let mut totals = FlowTotals::default();
    for (event_type, amount) in rows {
        let Some(raw) = amount else { continue };
        let value: i128 = raw
            .parse()
            .map_err(|_| IndexerError::EventParse(format!("non-numeric amount {raw:?}")))?;
        let slot = if event_type == EventKind::FundsReceived.as_str() {
            &mut totals.funded
        } else if event_type == EventKind::DarfRedeemed.as_str() {
            &mut totals.redeemed
        } else {
            &mut totals.paid_to_projects
        };
        *slot = slot
            .checked_add(value)
            .ok_or_else(|| IndexerError::EventParse(format!("{event_type} total overflowed")))?;
    }
    Ok(totals)
}
