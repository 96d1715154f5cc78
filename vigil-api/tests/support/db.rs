#![allow(dead_code)]

use once_cell::sync::Lazy;
use tokio::sync::{Mutex, MutexGuard};
use vigil_api::db::{DbClient, DbConfig};

static CHALLENGE_TABLE: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Database client for the DB-backed suites, with the schema applied.
pub async fn test_db_client() -> DbClient {
    let config = DbConfig::from_env();
    let client = DbClient::from_config(&config).expect("Failed to create database client");
    client.migrate().await.expect("Failed to apply schema");
    client
}

/// Exclusive use of an empty `challenges` table.
///
/// Hold the guard for the whole test. Suites that assert on the global
/// active set must go through here so no other test writes challenges
/// meanwhile.
pub async fn isolated_challenges() -> MutexGuard<'static, ()> {
    let guard = CHALLENGE_TABLE.lock().await;
    let pool = DbConfig::from_env()
        .create_pool()
        .expect("Failed to create database pool");
    let conn = pool.get().await.expect("Failed to get connection");
    conn.batch_execute("TRUNCATE challenges")
        .await
        .expect("Failed to truncate challenges");
    guard
}
