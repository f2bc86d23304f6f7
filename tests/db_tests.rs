//! Database and schema tests
//!
//! Tests SQLite migrations, the counter upsert and the guarded appointment
//! writes at the SQL level.

use appointment_api::infrastructure::repositories::next_sequence;
use chrono::{NaiveDateTime, Utc};
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use uuid::Uuid;

/// Counter for unique test database URIs
static TEST_DB_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Setup test database with migrations and returns pool
async fn setup_test_db() -> SqlitePool {
    let db_num = TEST_DB_COUNTER.fetch_add(1, Ordering::SeqCst);
    // Shared cache so every pooled connection sees the same in-memory DB
    let db_url = format!("sqlite:file:dbtest{}?mode=memory&cache=shared", db_num);

    let pool = SqlitePool::connect(&db_url).await.unwrap();
    sqlx::migrate!().run(&pool).await.unwrap();
    pool
}

fn ts(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").unwrap()
}

/// Seeds one client and one admin so appointment rows satisfy their
/// foreign keys; returns the internal references.
async fn seed_parties(pool: &SqlitePool) -> (Uuid, Uuid) {
    let client = Uuid::new_v4();
    let admin = Uuid::new_v4();

    sqlx::query(
        "INSERT INTO clients (id, client_id, name, email, phone, password_hash, role, created_at)
         VALUES (?, 'CL-08051301', 'Ada', 'ada@example.com', '0123456789', 'x', 'Client', ?)",
    )
    .bind(client)
    .bind(Utc::now())
    .execute(pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO admins (id, admin_id, name, email, phone, password_hash, role, created_at)
         VALUES (?, 'AD-08051301', 'Dana', 'dana@example.com', '0123456780', 'x', 'Admin', ?)",
    )
    .bind(admin)
    .bind(Utc::now())
    .execute(pool)
    .await
    .unwrap();

    (client, admin)
}

/// Runs the same guarded insert the repository uses.
async fn guarded_insert(
    pool: &SqlitePool,
    client: Uuid,
    admin: Uuid,
    public_id: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> u64 {
    sqlx::query(
        "INSERT INTO appointments
             (id, appointment_id, client, admin, start_time, end_time, purpose,
              payment_id, payment_status, status, cancel_reason, created_at, updated_at)
         SELECT ?, ?, ?, ?, ?, ?, 'checkup', '', 'Pending', 'Upcoming', NULL, ?, ?
         WHERE NOT EXISTS (
             SELECT 1 FROM appointments
             WHERE admin = ? AND status = 'Upcoming'
               AND start_time < ? AND end_time > ?
         )",
    )
    .bind(Uuid::new_v4())
    .bind(public_id)
    .bind(client)
    .bind(admin)
    .bind(start)
    .bind(end)
    .bind(Utc::now())
    .bind(Utc::now())
    .bind(admin)
    .bind(end)
    .bind(start)
    .execute(pool)
    .await
    .unwrap()
    .rows_affected()
}

#[tokio::test]
async fn test_database_migrations_work() {
    let pool = setup_test_db().await;

    let tables = sqlx::query("SELECT name FROM sqlite_master WHERE type='table'")
        .fetch_all(&pool)
        .await
        .unwrap();

    // counters, clients, admins, appointments (+ sqlx migration bookkeeping)
    assert!(tables.len() >= 4);
}

#[tokio::test]
async fn test_next_sequence_starts_at_one_and_increments() {
    let pool = setup_test_db().await;

    assert_eq!(next_sequence(&pool, "appointmentId").await.unwrap(), 1);
    assert_eq!(next_sequence(&pool, "appointmentId").await.unwrap(), 2);
    assert_eq!(next_sequence(&pool, "appointmentId").await.unwrap(), 3);
}

#[tokio::test]
async fn test_counters_are_independent_per_name() {
    let pool = setup_test_db().await;

    assert_eq!(next_sequence(&pool, "clientId").await.unwrap(), 1);
    assert_eq!(next_sequence(&pool, "adminId").await.unwrap(), 1);
    assert_eq!(next_sequence(&pool, "clientId").await.unwrap(), 2);
}

#[tokio::test]
async fn test_concurrent_issuance_never_repeats() {
    // A single connection keeps SQLite's shared-cache locking out of the
    // picture; the tasks still interleave at the pool checkout.
    let db_num = TEST_DB_COUNTER.fetch_add(1, Ordering::SeqCst);
    let db_url = format!("sqlite:file:dbtestseq{}?mode=memory&cache=shared", db_num);
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&db_url)
        .await
        .unwrap();
    sqlx::migrate!().run(&pool).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..20 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            next_sequence(&pool, "appointmentId").await.unwrap()
        }));
    }

    let mut seen = HashSet::new();
    for handle in handles {
        assert!(seen.insert(handle.await.unwrap()));
    }

    assert_eq!(seen.len(), 20);
    assert_eq!(*seen.iter().max().unwrap(), 20);
}

#[tokio::test]
async fn test_same_slot_race_has_one_winner() {
    let db_num = TEST_DB_COUNTER.fetch_add(1, Ordering::SeqCst);
    let db_url = format!("sqlite:file:dbtestrace{}?mode=memory&cache=shared", db_num);
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&db_url)
        .await
        .unwrap();
    sqlx::migrate!().run(&pool).await.unwrap();
    let (client, admin) = seed_parties(&pool).await;

    let mut handles = Vec::new();
    for n in 0..4i64 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            guarded_insert(
                &pool,
                client,
                admin,
                &format!("AP-080513{:02}", n + 1),
                ts("2025-03-10 09:00:00"),
                ts("2025-03-10 09:30:00"),
            )
            .await
        }));
    }

    let mut winners = 0;
    for handle in handles {
        winners += handle.await.unwrap();
    }

    // The guard and the write are one statement; the losers insert nothing.
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn test_guarded_insert_rejects_overlap() {
    let pool = setup_test_db().await;
    let (client, admin) = seed_parties(&pool).await;

    let first = guarded_insert(
        &pool,
        client,
        admin,
        "AP-08051301",
        ts("2025-03-10 09:00:00"),
        ts("2025-03-10 09:30:00"),
    )
    .await;
    assert_eq!(first, 1);

    // 09:15 overlaps [09:00, 09:30)
    let second = guarded_insert(
        &pool,
        client,
        admin,
        "AP-08051302",
        ts("2025-03-10 09:15:00"),
        ts("2025-03-10 09:45:00"),
    )
    .await;
    assert_eq!(second, 0);
}

#[tokio::test]
async fn test_back_to_back_slots_do_not_collide() {
    let pool = setup_test_db().await;
    let (client, admin) = seed_parties(&pool).await;

    guarded_insert(
        &pool,
        client,
        admin,
        "AP-08051301",
        ts("2025-03-10 09:00:00"),
        ts("2025-03-10 09:30:00"),
    )
    .await;

    // Half-open intervals: the 09:30 boundary itself is free
    let adjacent = guarded_insert(
        &pool,
        client,
        admin,
        "AP-08051302",
        ts("2025-03-10 09:30:00"),
        ts("2025-03-10 10:00:00"),
    )
    .await;
    assert_eq!(adjacent, 1);
}

#[tokio::test]
async fn test_non_upcoming_rows_do_not_block() {
    let pool = setup_test_db().await;
    let (client, admin) = seed_parties(&pool).await;

    guarded_insert(
        &pool,
        client,
        admin,
        "AP-08051301",
        ts("2025-03-10 09:00:00"),
        ts("2025-03-10 09:30:00"),
    )
    .await;

    sqlx::query("UPDATE appointments SET status = 'Cancelled' WHERE appointment_id = ?")
        .bind("AP-08051301")
        .execute(&pool)
        .await
        .unwrap();

    let rebooked = guarded_insert(
        &pool,
        client,
        admin,
        "AP-08051302",
        ts("2025-03-10 09:00:00"),
        ts("2025-03-10 09:30:00"),
    )
    .await;
    assert_eq!(rebooked, 1);
}

#[tokio::test]
async fn test_guarded_reschedule_excludes_itself() {
    let pool = setup_test_db().await;
    let (client, admin) = seed_parties(&pool).await;

    guarded_insert(
        &pool,
        client,
        admin,
        "AP-08051301",
        ts("2025-03-10 09:00:00"),
        ts("2025-03-10 09:30:00"),
    )
    .await;

    // Moving the row onto its own window must not self-conflict
    let moved = sqlx::query(
        "UPDATE appointments
         SET start_time = ?, end_time = ?, status = 'Rescheduled', updated_at = ?
         WHERE appointment_id = ?
           AND NOT EXISTS (
             SELECT 1 FROM appointments other
             WHERE other.admin = appointments.admin
               AND other.id <> appointments.id
               AND other.status = 'Upcoming'
               AND other.start_time < ? AND other.end_time > ?
         )",
    )
    .bind(ts("2025-03-10 09:00:00"))
    .bind(ts("2025-03-10 09:30:00"))
    .bind(Utc::now())
    .bind("AP-08051301")
    .bind(ts("2025-03-10 09:30:00"))
    .bind(ts("2025-03-10 09:00:00"))
    .execute(&pool)
    .await
    .unwrap()
    .rows_affected();

    assert_eq!(moved, 1);
}
