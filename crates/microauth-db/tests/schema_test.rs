//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    microauth_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    assert!(info_str.contains("account"), "missing account table");
    assert!(
        info_str.contains("organization"),
        "missing organization table"
    );
    assert!(info_str.contains("member"), "missing member table");
    assert!(
        info_str.contains("member_invite"),
        "missing member_invite table"
    );
    assert!(info_str.contains("_migration"), "missing _migration table");
}

#[tokio::test]
async fn migration_is_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    microauth_db::run_migrations(&db).await.unwrap();
    microauth_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("SELECT * FROM _migration").await.unwrap();
    let records: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    assert_eq!(records.len(), 1, "expected exactly one migration record");
}

#[tokio::test]
async fn migration_records_version_and_name() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    microauth_db::run_migrations(&db).await.unwrap();

    let mut result = db
        .query("SELECT VALUE version FROM _migration; SELECT VALUE name FROM _migration;")
        .await
        .unwrap();
    let versions: Vec<u32> = result.take(0).unwrap();
    let names: Vec<String> = result.take(1).unwrap();
    assert_eq!(versions, vec![1]);
    assert_eq!(names, vec!["initial_schema".to_string()]);
}

#[tokio::test]
async fn member_role_is_constrained() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    microauth_db::run_migrations(&db).await.unwrap();

    let result = db
        .query(
            "CREATE member SET organization_id = 'o', account_id = 'a', \
             role = 'owner', app_role = ''",
        )
        .await
        .unwrap()
        .check();
    assert!(result.is_err(), "unknown role should be rejected");
}
