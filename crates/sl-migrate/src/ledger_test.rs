use super::*;
use sl_db::DuckDbBackend;

fn db() -> DuckDbBackend {
    DuckDbBackend::in_memory().unwrap()
}

#[tokio::test]
async fn test_ensure_ledger_is_idempotent() {
    let db = db();
    let ledger = Ledger::with_default_table(&db);
    assert!(!ledger.exists().await.unwrap());

    ledger.ensure_ledger().await.unwrap();
    ledger.ensure_ledger().await.unwrap();
    assert!(ledger.exists().await.unwrap());
    assert!(ledger.applied_entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_record_and_lookup() {
    let db = db();
    let ledger = Ledger::with_default_table(&db);
    ledger.ensure_ledger().await.unwrap();

    assert!(!ledger.is_applied("0001_init.sql").await.unwrap());
    ledger.record_applied("0001_init.sql").await.unwrap();
    assert!(ledger.is_applied("0001_init.sql").await.unwrap());
    assert!(!ledger.is_applied("0002_next.sql").await.unwrap());
}

#[tokio::test]
async fn test_entries_keep_insertion_order() {
    let db = db();
    let ledger = Ledger::with_default_table(&db);
    ledger.ensure_ledger().await.unwrap();

    for name in ["0002_b.sql", "0001_a.sql", "0003_c.sql"] {
        ledger.record_applied(name).await.unwrap();
    }

    let entries = ledger.applied_entries().await.unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["0002_b.sql", "0001_a.sql", "0003_c.sql"]);
    assert!(entries.iter().all(|e| e.applied_at.is_some()));
}

#[tokio::test]
async fn test_double_record_is_invariant_violation() {
    let db = db();
    let ledger = Ledger::with_default_table(&db);
    ledger.ensure_ledger().await.unwrap();
    ledger.record_applied("0001_init.sql").await.unwrap();

    let err = ledger.record_applied("0001_init.sql").await.unwrap_err();
    assert!(
        matches!(err, MigrateError::InvariantViolation(ref msg) if msg.contains("0001_init.sql")),
        "got {err}"
    );
    assert_eq!(ledger.applied_entries().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_custom_schema_qualified_table() {
    let db = db();
    let ledger = Ledger::new(&db, "ops.schema_history").unwrap();
    ledger.ensure_ledger().await.unwrap();
    assert!(ledger.exists().await.unwrap());

    ledger.record_applied("0001_init.sql").await.unwrap();
    assert!(ledger.is_applied("0001_init.sql").await.unwrap());

    let default = Ledger::with_default_table(&db);
    assert!(!default.exists().await.unwrap());
}

#[test]
fn test_rejects_unsafe_table_name() {
    let db = db();
    for name in ["", "drop table x;--", "a.b.c", "1abc", "MyLedger"] {
        assert!(
            matches!(Ledger::new(&db, name), Err(MigrateError::Configuration(_))),
            "{name:?} should be rejected"
        );
    }
}

#[tokio::test]
async fn test_read_before_create_is_ledger_error() {
    let db = db();
    let ledger = Ledger::with_default_table(&db);
    let err = ledger.is_applied("0001_init.sql").await.unwrap_err();
    assert!(matches!(err, MigrateError::Ledger { .. }), "got {err}");
}
