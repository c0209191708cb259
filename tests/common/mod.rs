#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::Once;
use uuid::Uuid;

use ember_match_lib::{init_database, SessionContext, UserId};

/// One database file per test binary run. Every test calls this first so the
/// store is ready no matter which test the parallel runner starts with.
pub fn init_test_db(init: &Once, dir: &str, prefix: &str) {
    init.call_once(|| {
        fs::create_dir_all(dir).expect("Failed to create test directory");

        let db_path = format!(
            "{}/{}_{}.db",
            dir,
            prefix,
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("Time went backwards")
                .as_nanos()
        );

        init_database(db_path.clone()).expect("Failed to initialise database");
        assert!(
            Path::new(&db_path).exists(),
            "Database file should exist after initialization"
        );
    });
}

/// Tests run in parallel against the shared store, so each scenario works
/// with fresh users instead of truncating tables between tests.
pub fn fresh_user() -> UserId {
    UserId::from(*Uuid::now_v7().as_bytes())
}

pub fn fresh_session() -> SessionContext {
    SessionContext::new(fresh_user())
}
