//! Database Connection Pool Module
//!
//! PostgreSQL connection pooling using deadpool-postgres, and the
//! PostgreSQL implementation of [`RecordStore`].
//!
//! Counter increments are single `UPDATE ... SET c = c + $n` statements, so
//! the row lock PostgreSQL takes for the update is what serializes
//! concurrent increments. Writes that activate a challenge run in one
//! transaction that first takes a transaction-scoped advisory lock, clears
//! every other active row, then applies the write. A partial unique index on
//! the active flag rejects anything that slips past that path.

use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolError, RecyclingMethod, Runtime};
use std::time::Duration;
use tokio_postgres::{error::SqlState, NoTls, Row};
use vigil_core::{
    Challenge, ChallengeUpdate, Counter, EntityType, Intention, NewChallenge, NewIntention,
    PrayerKind, RecordId, StorageError, ValidationError, VigilError, VigilResult,
};
use vigil_storage::{ChallengeWrite, RecordStore, StoreStatistics};

use crate::error::{ApiError, ApiResult};

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Wait/create timeout for pooled connections
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "vigil".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("VIGIL_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("VIGIL_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("VIGIL_DB_NAME").unwrap_or_else(|_| "vigil".to_string()),
            user: std::env::var("VIGIL_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("VIGIL_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("VIGIL_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            timeout: Duration::from_secs(
                std::env::var("VIGIL_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_cfg = deadpool_postgres::PoolConfig::new(self.max_size);
        pool_cfg.timeouts.wait = Some(self.timeout);
        pool_cfg.timeouts.create = Some(self.timeout);
        cfg.pool = Some(pool_cfg);

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))?;

        Ok(pool)
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

/// Idempotent DDL applied at startup.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS intentions (
    id               BIGSERIAL PRIMARY KEY,
    content          TEXT        NOT NULL,
    name             TEXT,
    prayer_type      TEXT,
    hail_mary_count  INTEGER     NOT NULL DEFAULT 0 CHECK (hail_mary_count >= 0),
    our_father_count INTEGER     NOT NULL DEFAULT 0 CHECK (our_father_count >= 0),
    rosary_count     INTEGER     NOT NULL DEFAULT 0 CHECK (rosary_count >= 0),
    is_printed       BOOLEAN     NOT NULL DEFAULT FALSE,
    created_at       TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS challenges (
    id            BIGSERIAL PRIMARY KEY,
    title         TEXT        NOT NULL,
    prayer_type   TEXT        NOT NULL,
    total_target  INTEGER     NOT NULL CHECK (total_target > 0),
    current_count INTEGER     NOT NULL DEFAULT 0 CHECK (current_count >= 0),
    is_active     BOOLEAN     NOT NULL DEFAULT TRUE,
    created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE UNIQUE INDEX IF NOT EXISTS challenges_single_active
    ON challenges ((is_active)) WHERE is_active;
"#;

/// Advisory lock key serializing writes that change the active challenge.
const ACTIVE_CHALLENGE_LOCK_KEY: i64 = 0x5649_4749_4c00_0001;

macro_rules! intention_columns {
    () => {
        "id, content, name, prayer_type, hail_mary_count, our_father_count, rosary_count, is_printed, created_at"
    };
}

macro_rules! challenge_columns {
    () => {
        "id, title, prayer_type, total_target, current_count, is_active, created_at"
    };
}

/// One statement per counter column; the column is never taken from input.
fn intention_increment_sql(kind: PrayerKind) -> &'static str {
    match kind {
        PrayerKind::HailMary => concat!(
            "UPDATE intentions SET hail_mary_count = hail_mary_count + $2 WHERE id = $1 RETURNING ",
            intention_columns!()
        ),
        PrayerKind::OurFather => concat!(
            "UPDATE intentions SET our_father_count = our_father_count + $2 WHERE id = $1 RETURNING ",
            intention_columns!()
        ),
        PrayerKind::Rosary => concat!(
            "UPDATE intentions SET rosary_count = rosary_count + $2 WHERE id = $1 RETURNING ",
            intention_columns!()
        ),
    }
}

// ============================================================================
// ERROR MAPPING
// ============================================================================

fn backend_error(operation: &'static str, err: tokio_postgres::Error) -> VigilError {
    tracing::error!(operation, error = ?err, "Database error");
    StorageError::Backend {
        reason: format!("{} failed: {}", operation, err),
    }
    .into()
}

fn pool_error(err: PoolError) -> VigilError {
    tracing::error!(error = ?err, "Connection pool error");
    StorageError::Backend {
        reason: format!("failed to acquire database connection: {}", err),
    }
    .into()
}

fn insert_error(entity_type: EntityType, err: tokio_postgres::Error) -> VigilError {
    tracing::error!(entity = %entity_type, error = ?err, "Insert failed");
    StorageError::InsertFailed {
        entity_type,
        reason: err.to_string(),
    }
    .into()
}

/// A counter that would exceed the INTEGER range is a caller error.
fn counter_error(counter: Counter, id: RecordId, err: tokio_postgres::Error) -> VigilError {
    if err.code() == Some(&SqlState::NUMERIC_VALUE_OUT_OF_RANGE) {
        return ValidationError::out_of_range(counter.field_name(), "counter would overflow").into();
    }
    tracing::error!(record_id = id, counter = %counter, error = ?err, "Counter update failed");
    StorageError::UpdateFailed {
        entity_type: counter.entity_type(),
        id,
        reason: err.to_string(),
    }
    .into()
}

/// Errors inside an activating transaction.
fn activation_error(err: tokio_postgres::Error) -> VigilError {
    if err.code() == Some(&SqlState::UNIQUE_VIOLATION) {
        tracing::warn!(error = ?err, "Active challenge index rejected write");
        return StorageError::TransactionFailed {
            reason: "another challenge was activated concurrently".to_string(),
        }
        .into();
    }
    backend_error("challenge transaction", err)
}

// ============================================================================
// ROW MAPPING
// ============================================================================

fn column<'a, T>(row: &'a Row, name: &'static str) -> VigilResult<T>
where
    T: tokio_postgres::types::FromSql<'a>,
{
    row.try_get(name).map_err(|e| {
        VigilError::from(StorageError::Backend {
            reason: format!("column '{}': {}", name, e),
        })
    })
}

fn intention_from_row(row: &Row) -> VigilResult<Intention> {
    Ok(Intention {
        id: column(row, "id")?,
        content: column(row, "content")?,
        name: column(row, "name")?,
        prayer_type: column(row, "prayer_type")?,
        hail_mary_count: column(row, "hail_mary_count")?,
        our_father_count: column(row, "our_father_count")?,
        rosary_count: column(row, "rosary_count")?,
        is_printed: column(row, "is_printed")?,
        created_at: column(row, "created_at")?,
    })
}

fn challenge_from_row(row: &Row) -> VigilResult<Challenge> {
    Ok(Challenge {
        id: column(row, "id")?,
        title: column(row, "title")?,
        prayer_type: column(row, "prayer_type")?,
        total_target: column(row, "total_target")?,
        current_count: column(row, "current_count")?,
        is_active: column(row, "is_active")?,
        created_at: column(row, "created_at")?,
    })
}

/// Serialize activating writes until the transaction ends.
///
/// Taken before any challenge row lock, so two activators never wait on
/// each other's rows.
async fn lock_activation(tx: &tokio_postgres::Transaction<'_>) -> Result<(), tokio_postgres::Error> {
    tx.execute("SELECT pg_advisory_xact_lock($1)", &[&ACTIVE_CHALLENGE_LOCK_KEY])
        .await?;
    Ok(())
}

/// Clear the active flag on every challenge except `keep`. Returns the ids
/// that were cleared. The caller holds the activation lock.
async fn deactivate_others(
    tx: &tokio_postgres::Transaction<'_>,
    keep: Option<RecordId>,
) -> Result<Vec<RecordId>, tokio_postgres::Error> {
    let rows = tx
        .query(
            "UPDATE challenges SET is_active = FALSE \
             WHERE is_active AND id IS DISTINCT FROM $1 RETURNING id",
            &[&keep],
        )
        .await?;
    rows.iter().map(|row| row.try_get::<_, i64>(0)).collect()
}

// ============================================================================
// DATABASE CLIENT WRAPPER
// ============================================================================

/// PostgreSQL-backed record store.
#[derive(Clone)]
pub struct DbClient {
    pool: Pool,
}

impl DbClient {
    /// Create a new database client with the given pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a new database client from configuration.
    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool))
    }

    /// Apply the schema. Safe to run on every start.
    pub async fn migrate(&self) -> ApiResult<()> {
        let conn = self.pool.get().await?;
        conn.batch_execute(SCHEMA).await?;
        tracing::info!("Database schema is up to date");
        Ok(())
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> VigilResult<deadpool_postgres::Object> {
        self.pool.get().await.map_err(pool_error)
    }
}

#[async_trait]
impl RecordStore for DbClient {
    // ========================================================================
    // INTENTION OPERATIONS
    // ========================================================================

    async fn intention_insert(&self, new: &NewIntention) -> VigilResult<Intention> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_one(
                concat!(
                    "INSERT INTO intentions (content, name, prayer_type) VALUES ($1, $2, $3) RETURNING ",
                    intention_columns!()
                ),
                &[&new.content, &new.name, &new.prayer_type],
            )
            .await
            .map_err(|e| insert_error(EntityType::Intention, e))?;
        let intention = intention_from_row(&row)?;
        tracing::debug!(intention_id = intention.id, "intention inserted");
        Ok(intention)
    }

    async fn intention_get(&self, id: RecordId) -> VigilResult<Option<Intention>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                concat!("SELECT ", intention_columns!(), " FROM intentions WHERE id = $1"),
                &[&id],
            )
            .await
            .map_err(|e| backend_error("intention_get", e))?;
        row.as_ref().map(intention_from_row).transpose()
    }

    async fn intention_list(&self) -> VigilResult<Vec<Intention>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                concat!(
                    "SELECT ",
                    intention_columns!(),
                    " FROM intentions ORDER BY created_at DESC, id DESC"
                ),
                &[],
            )
            .await
            .map_err(|e| backend_error("intention_list", e))?;
        rows.iter().map(intention_from_row).collect()
    }

    async fn intention_increment(
        &self,
        id: RecordId,
        kind: PrayerKind,
        delta: i32,
    ) -> VigilResult<Option<Intention>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(intention_increment_sql(kind), &[&id, &delta])
            .await
            .map_err(|e| counter_error(Counter::from(kind), id, e))?;
        row.as_ref().map(intention_from_row).transpose()
    }

    async fn intention_mark_printed(&self, id: RecordId) -> VigilResult<Option<Intention>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                concat!(
                    "UPDATE intentions SET is_printed = TRUE WHERE id = $1 RETURNING ",
                    intention_columns!()
                ),
                &[&id],
            )
            .await
            .map_err(|e| backend_error("intention_mark_printed", e))?;
        row.as_ref().map(intention_from_row).transpose()
    }

    // ========================================================================
    // CHALLENGE OPERATIONS
    // ========================================================================

    async fn challenge_insert(&self, new: &NewChallenge) -> VigilResult<ChallengeWrite> {
        let mut conn = self.get_conn().await?;
        let tx = conn.transaction().await.map_err(activation_error)?;

        let is_active = new.activates();
        let deactivated = if is_active {
            lock_activation(&tx).await.map_err(activation_error)?;
            deactivate_others(&tx, None).await.map_err(activation_error)?
        } else {
            Vec::new()
        };

        let row = tx
            .query_one(
                concat!(
                    "INSERT INTO challenges (title, prayer_type, total_target, is_active) \
                     VALUES ($1, $2, $3, $4) RETURNING ",
                    challenge_columns!()
                ),
                &[&new.title, &new.prayer_type, &new.total_target, &is_active],
            )
            .await
            .map_err(|e| match e.code() {
                Some(code) if code == &SqlState::UNIQUE_VIOLATION => activation_error(e),
                _ => insert_error(EntityType::Challenge, e),
            })?;
        let challenge = challenge_from_row(&row)?;

        tx.commit().await.map_err(activation_error)?;
        Ok(ChallengeWrite {
            challenge,
            deactivated,
        })
    }

    async fn challenge_get(&self, id: RecordId) -> VigilResult<Option<Challenge>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                concat!("SELECT ", challenge_columns!(), " FROM challenges WHERE id = $1"),
                &[&id],
            )
            .await
            .map_err(|e| backend_error("challenge_get", e))?;
        row.as_ref().map(challenge_from_row).transpose()
    }

    async fn challenge_list(&self) -> VigilResult<Vec<Challenge>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                concat!(
                    "SELECT ",
                    challenge_columns!(),
                    " FROM challenges ORDER BY created_at DESC, id DESC"
                ),
                &[],
            )
            .await
            .map_err(|e| backend_error("challenge_list", e))?;
        rows.iter().map(challenge_from_row).collect()
    }

    async fn challenge_update(
        &self,
        id: RecordId,
        update: &ChallengeUpdate,
    ) -> VigilResult<Option<ChallengeWrite>> {
        let mut conn = self.get_conn().await?;
        let tx = conn.transaction().await.map_err(activation_error)?;

        if update.activates() {
            lock_activation(&tx).await.map_err(activation_error)?;
        }
        let exists = tx
            .query_opt("SELECT id FROM challenges WHERE id = $1 FOR UPDATE", &[&id])
            .await
            .map_err(activation_error)?;
        if exists.is_none() {
            // Dropping the transaction rolls it back
            return Ok(None);
        }

        let deactivated = if update.activates() {
            deactivate_others(&tx, Some(id)).await.map_err(activation_error)?
        } else {
            Vec::new()
        };

        let row = tx
            .query_one(
                concat!(
                    "UPDATE challenges SET \
                     title = COALESCE($2, title), \
                     prayer_type = COALESCE($3, prayer_type), \
                     total_target = COALESCE($4, total_target), \
                     current_count = COALESCE($5, current_count), \
                     is_active = COALESCE($6, is_active) \
                     WHERE id = $1 RETURNING ",
                    challenge_columns!()
                ),
                &[
                    &id,
                    &update.title,
                    &update.prayer_type,
                    &update.total_target,
                    &update.current_count,
                    &update.is_active,
                ],
            )
            .await
            .map_err(|e| match e.code() {
                Some(code) if code == &SqlState::UNIQUE_VIOLATION => activation_error(e),
                _ => {
                    tracing::error!(challenge_id = id, error = ?e, "Challenge update failed");
                    VigilError::from(StorageError::UpdateFailed {
                        entity_type: EntityType::Challenge,
                        id,
                        reason: e.to_string(),
                    })
                }
            })?;
        let challenge = challenge_from_row(&row)?;

        tx.commit().await.map_err(activation_error)?;
        Ok(Some(ChallengeWrite {
            challenge,
            deactivated,
        }))
    }

    async fn challenge_delete(&self, id: RecordId) -> VigilResult<bool> {
        let conn = self.get_conn().await?;
        let removed = conn
            .execute("DELETE FROM challenges WHERE id = $1", &[&id])
            .await
            .map_err(|e| backend_error("challenge_delete", e))?;
        Ok(removed > 0)
    }

    async fn challenge_get_active(&self) -> VigilResult<Option<Challenge>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                concat!(
                    "SELECT ",
                    challenge_columns!(),
                    " FROM challenges WHERE is_active ORDER BY created_at DESC, id DESC LIMIT 1"
                ),
                &[],
            )
            .await
            .map_err(|e| backend_error("challenge_get_active", e))?;
        row.as_ref().map(challenge_from_row).transpose()
    }

    async fn challenge_increment(&self, id: RecordId, delta: i32) -> VigilResult<Option<Challenge>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                concat!(
                    "UPDATE challenges SET current_count = current_count + $2 WHERE id = $1 RETURNING ",
                    challenge_columns!()
                ),
                &[&id, &delta],
            )
            .await
            .map_err(|e| counter_error(Counter::ChallengeProgress, id, e))?;
        row.as_ref().map(challenge_from_row).transpose()
    }

    // ========================================================================
    // HEALTH & DIAGNOSTICS
    // ========================================================================

    async fn health_check(&self) -> VigilResult<()> {
        let conn = self.get_conn().await?;
        conn.query_one("SELECT 1", &[])
            .await
            .map_err(|e| backend_error("health_check", e))?;
        Ok(())
    }

    async fn statistics(&self) -> VigilResult<StoreStatistics> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_one(
                "SELECT \
                 (SELECT COUNT(*) FROM intentions) AS intention_count, \
                 (SELECT COUNT(*) FROM challenges) AS challenge_count, \
                 (SELECT COUNT(*) FROM challenges WHERE is_active) AS active_challenge_count",
                &[],
            )
            .await
            .map_err(|e| backend_error("statistics", e))?;
        Ok(StoreStatistics {
            intention_count: column(&row, "intention_count")?,
            challenge_count: column(&row, "challenge_count")?,
            active_challenge_count: column(&row, "active_challenge_count")?,
        })
    }
}
