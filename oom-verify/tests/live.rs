//! Runs against real servers. Start them, export the URLs, then
//! `cargo test -p oom-verify --test live -- --ignored`.

use oom_data::Dialect;
use oom_data_sqlx::PoolSettings;
use oom_verify::{verify_backend, Backend, Tester2};
use serial_test::serial;

async fn run_live(dialect: Dialect, env: &str) {
    let url = std::env::var(env).unwrap_or_else(|_| panic!("{env} must be set"));
    let report = verify_backend(&Backend::new(dialect).with_url(url), &PoolSettings::default())
        .await
        .unwrap_or_else(|e| panic!("{e}"));
    assert!(report.generated_id > 0);
    assert_eq!(
        report.reloaded,
        Tester2 {
            id: report.generated_id,
            ..Tester2::sample()
        }
    );
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_mysql_round_trip() {
    run_live(Dialect::MySql, "OOM_MYSQL_URL").await;
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_postgres_round_trip() {
    run_live(Dialect::Postgres, "OOM_POSTGRES_URL").await;
}
