use super::*;

fn exec_err(code: &str) -> DbError {
    DbError::execution(code, "statement failed")
}

#[test]
fn test_default_table_relation_exists() {
    let classifier = ErrorClassifier::default();
    assert_eq!(
        classifier.classify(&exec_err("42P07")),
        Classification::Ignorable(CollisionKind::Relation)
    );
}

#[test]
fn test_default_table_column_exists() {
    assert_eq!(
        ErrorClassifier::default().classify(&exec_err("42701")),
        Classification::Ignorable(CollisionKind::Column)
    );
}

#[test]
fn test_default_table_object_exists() {
    assert_eq!(
        ErrorClassifier::default().classify(&exec_err("42710")),
        Classification::Ignorable(CollisionKind::Object)
    );
}

#[test]
fn test_other_codes_are_fatal() {
    let classifier = ErrorClassifier::default();
    for code in ["42601", "42501", "23505", "23503", "42P01", "08006", "42P06"] {
        assert_eq!(
            classifier.classify(&exec_err(code)),
            Classification::Fatal,
            "code {code} must be fatal"
        );
    }
}

#[test]
fn test_missing_code_is_fatal() {
    let err = DbError::ExecutionError {
        code: None,
        message: "relation \"a\" already exists".to_string(),
    };
    assert_eq!(ErrorClassifier::default().classify(&err), Classification::Fatal);
}

#[test]
fn test_connection_errors_are_fatal() {
    let classifier = ErrorClassifier::default();
    assert_eq!(
        classifier.classify(&DbError::ConnectionError("reset by peer".into())),
        Classification::Fatal
    );
    assert_eq!(classifier.classify(&DbError::Closed), Classification::Fatal);
}

#[test]
fn test_empty_classifier_is_strict() {
    assert_eq!(
        ErrorClassifier::empty().classify(&exec_err("42P07")),
        Classification::Fatal
    );
    assert!(ErrorClassifier::empty().codes().is_empty());
}

#[test]
fn test_with_ignorable_adds_code() {
    let classifier = ErrorClassifier::default().with_ignorable("42P06", CollisionKind::Object);
    assert!(classifier.classify(&exec_err("42P06")).is_ignorable());
    assert_eq!(classifier.codes(), vec!["42701", "42710", "42P06", "42P07"]);
}

#[test]
fn test_extend_merges_config_table() {
    let extra = vec![("42P16".to_string(), CollisionKind::Relation)];
    let classifier = ErrorClassifier::default().extend(extra);
    assert_eq!(
        classifier.classify(&exec_err("42P16")),
        Classification::Ignorable(CollisionKind::Relation)
    );
    assert!(classifier.classify(&exec_err("42P07")).is_ignorable());
}

#[test]
fn test_custom_table_for_other_backend() {
    let classifier = ErrorClassifier::new([("SQLITE_TABLE_EXISTS", CollisionKind::Relation)]);
    assert!(classifier
        .classify(&exec_err("SQLITE_TABLE_EXISTS"))
        .is_ignorable());
    assert_eq!(
        classifier.classify(&exec_err("42P07")),
        Classification::Fatal
    );
}

#[test]
fn test_duckdb_collisions_classify_like_postgres() {
    let classifier = ErrorClassifier::default();
    let err = DbError::ExecutionError {
        code: crate::error::duckdb_condition_code(
            "Catalog Error: Column with name x already exists!",
        )
        .map(str::to_string),
        message: "Catalog Error: Column with name x already exists!".into(),
    };
    assert_eq!(
        classifier.classify(&err),
        Classification::Ignorable(CollisionKind::Column)
    );
}
