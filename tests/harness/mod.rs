//! Shared test harness: seeded in-memory store and a test server around it.
//!
//! Seed data:
//! - Codes 100, 110, 120, 130, 600, 700, 9954
//! - Neighborhoods 1..=5
//! - Incidents 19245020, 19245016, 19245014, 19244900

#![allow(dead_code)]

use axum_test::TestServer;
use crime_api::prelude::*;
use serde_json::{Value, json};
use std::time::Duration;

pub const SEED_CODES: &[(i64, &str)] = &[
    (100, "Murder"),
    (110, "Murder, Non Negligent Manslaughter"),
    (120, "Murder, Negligent Manslaughter"),
    (130, "Rape"),
    (600, "Theft"),
    (700, "Auto Theft"),
    (9954, "Proactive Police Visit"),
];

pub const SEED_NEIGHBORHOODS: &[(i64, &str)] = &[
    (1, "Conway/Battlecreek/Highwood"),
    (2, "Greater East Side"),
    (3, "West Side"),
    (4, "Dayton's Bluff"),
    (5, "Payne/Phalen"),
];

/// (case_number, date_time, code, incident, police_grid, neighborhood_number, block)
pub const SEED_INCIDENTS: &[(&str, &str, i64, &str, i64, i64, &str)] = &[
    ("19245020", "2019-10-30T23:57:08", 700, "Auto Theft", 95, 4, "79X 6 ST E"),
    ("19245016", "2019-10-30T23:29:43", 9954, "Proactive Police Visit", 119, 5, "THOMAS AV  & VICTORIA"),
    ("19245014", "2019-10-30T23:20:11", 600, "Theft", 87, 1, "98X UNIVERSITY AV W"),
    ("19244900", "2019-10-29T18:00:00", 600, "Theft", 18, 1, "12X SUBURBAN AV"),
];

/// In-memory store with the schema applied and seed rows inserted
pub async fn seeded_store() -> SqliteStore {
    let store = SqliteStore::in_memory().await.expect("in-memory store");
    let pool = store.pool();

    for (code, incident_type) in SEED_CODES {
        sqlx::query("INSERT INTO Codes (code, incident_type) VALUES (?, ?)")
            .bind(*code)
            .bind(*incident_type)
            .execute(pool)
            .await
            .expect("seed code");
    }

    for (number, name) in SEED_NEIGHBORHOODS {
        sqlx::query(
            "INSERT INTO Neighborhoods (neighborhood_number, neighborhood_name) VALUES (?, ?)",
        )
        .bind(*number)
        .bind(*name)
        .execute(pool)
        .await
        .expect("seed neighborhood");
    }

    for (case_number, date_time, code, incident, grid, neighborhood, block) in SEED_INCIDENTS {
        sqlx::query(
            "INSERT INTO Incidents (case_number, date_time, code, incident, police_grid, \
             neighborhood_number, block) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(*case_number)
        .bind(*date_time)
        .bind(*code)
        .bind(*incident)
        .bind(*grid)
        .bind(*neighborhood)
        .bind(*block)
        .execute(pool)
        .await
        .expect("seed incident");
    }

    store
}

/// Test server over any store, with a short request deadline
pub fn server_for(store: impl Store + 'static) -> TestServer {
    let router = ServerBuilder::new()
        .with_store(store)
        .with_request_timeout(Duration::from_millis(500))
        .build()
        .expect("router");
    TestServer::new(router).expect("test server")
}

/// Number of incident rows with this case number, read straight from the pool
pub async fn incident_count(store: &SqliteStore, case_number: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM Incidents WHERE case_number = ?")
        .bind(case_number)
        .fetch_one(store.pool())
        .await
        .expect("count incidents")
}

pub async fn total_incidents(store: &SqliteStore) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM Incidents")
        .fetch_one(store.pool())
        .await
        .expect("count incidents")
}

/// A complete, valid create-incident body
pub fn incident_body(case_number: &str) -> Value {
    json!({
        "case_number": case_number,
        "date_time": "2023-01-15T08:30:00",
        "code": 600,
        "incident": "Theft",
        "police_grid": 87,
        "neighborhood_number": 3,
        "block": "1XX WABASHA ST S"
    })
}
