//! Catalog scans, key lookups and administrative statements

mod common;

use common::{column, key, rows, table, ScriptedDb};
use sqlmason::{Caches, ColumnKind, DatabaseBackend, QueryBuilder, SqlValue};
use std::sync::Arc;

fn qb(backend: DatabaseBackend) -> QueryBuilder {
    QueryBuilder::new(backend)
}

#[tokio::test]
async fn test_scan_resolves_qualified_and_bare_names() {
    let db = ScriptedDb::new("main")
        .with_tables(vec![
            table(None, "orders"),
            table(Some("app_data"), "settings"),
        ])
        .with_columns(vec![
            column("ID", "ORDERS", ColumnKind::Int),
            column("KEY", "ORDERS", ColumnKind::VarChar),
        ]);
    let builder = qb(DatabaseBackend::Postgres);

    let hit = builder
        .scan_table_column(&db, "ORDERS", "id", |schema, table, meta| {
            (schema.map(str::to_string), table.to_string(), meta.name.clone())
        })
        .await
        .unwrap();
    let (schema, table_name, column_name) = hit.unwrap();
    assert_eq!(schema, None);
    assert_eq!(table_name, "orders");
    assert_eq!(column_name, "ID");

    let hit = builder
        .scan_table_column(&db, "app_data.SETTINGS", "key", |schema, _, _| {
            schema.map(str::to_string)
        })
        .await
        .unwrap();
    assert_eq!(hit.unwrap(), Some("app_data".to_string()));

    // A bare name never reaches into a private schema
    let miss = builder
        .scan_table_column(&db, "settings", "key", |_, _, _| ())
        .await
        .unwrap();
    assert!(miss.is_none());

    let miss = builder
        .scan_table_column(&db, "orders", "missing", |_, _, _| ())
        .await
        .unwrap();
    assert!(miss.is_none());
}

#[tokio::test]
async fn test_table_listings_qualify_private_schemas() {
    let db = ScriptedDb::new("main")
        .with_tables(vec![
            table(None, "orders"),
            table(Some("app_data"), "settings"),
        ])
        .with_views(vec![table(Some("public"), "v_orders")]);
    let builder = qb(DatabaseBackend::Postgres);

    assert_eq!(
        builder.all_tables(&db).await.unwrap(),
        ["orders", "app_data.settings"]
    );
    assert_eq!(builder.all_views(&db).await.unwrap(), ["v_orders"]);
}

#[tokio::test]
async fn test_transaction_id_depends_on_the_backend() {
    let db = ScriptedDb::new("main").respond(rows(
        &[("TXID", ColumnKind::BigInt)],
        vec![vec![SqlValue::BigInt(987654)]],
    ));
    let txid = qb(DatabaseBackend::Postgres)
        .transaction_id(&db)
        .await
        .unwrap();
    assert_eq!(txid.as_deref(), Some("987654"));
    assert_eq!(db.fetched_sql(), ["SELECT txid_current()"]);

    let derby = ScriptedDb::new("d").with_backend(DatabaseBackend::Derby);
    let txid = qb(DatabaseBackend::Derby)
        .transaction_id(&derby)
        .await
        .unwrap();
    assert!(txid.is_none());
    assert!(derby.fetched_sql().is_empty());
}

#[tokio::test]
async fn test_foreign_key_toggles_report_success() {
    let db = ScriptedDb::new("main");
    let builder = qb(DatabaseBackend::Postgres);

    assert!(builder.disable_foreign_keys(&db, "ORDERS").await);
    assert!(builder.enable_foreign_keys(&db, "ORDERS").await);
    assert_eq!(
        db.executed_sql(),
        [
            "ALTER TABLE ORDERS DISABLE TRIGGER ALL",
            "ALTER TABLE ORDERS ENABLE TRIGGER ALL",
        ]
    );

    let mysql = ScriptedDb::new("m").with_backend(DatabaseBackend::MySQL);
    assert!(!qb(DatabaseBackend::MySQL).disable_foreign_keys(&mysql, "ORDERS").await);
    assert!(mysql.executed_sql().is_empty());

    let failing = ScriptedDb::new("f").failing_execute();
    assert!(!builder.disable_foreign_keys(&failing, "ORDERS").await);
}

#[tokio::test]
async fn test_sequence_values_where_sequences_exist() {
    let db = ScriptedDb::new("main").respond(rows(
        &[("NEXTVAL", ColumnKind::BigInt)],
        vec![vec![SqlValue::BigInt(7)]],
    ));
    let next = qb(DatabaseBackend::Postgres)
        .next_sequence_value(&db, "order_seq")
        .await
        .unwrap();
    assert_eq!(next, 7);
    assert_eq!(db.fetched_sql(), ["SELECT nextval('order_seq'::regclass)"]);

    let empty = ScriptedDb::new("e");
    let next = qb(DatabaseBackend::Postgres)
        .next_sequence_value(&empty, "order_seq")
        .await
        .unwrap();
    assert_eq!(next, 0);

    let mysql = ScriptedDb::new("m").with_backend(DatabaseBackend::MySQL);
    let err = qb(DatabaseBackend::MySQL)
        .next_sequence_value(&mysql, "order_seq")
        .await
        .unwrap_err();
    assert!(err.is_unsupported());
    assert!(mysql.fetched_sql().is_empty());
}

#[tokio::test]
async fn test_key_positions_come_from_the_cached_catalog() {
    let db = ScriptedDb::new("main").with_keys(vec![key("COMPANY_ID", 1), key("ORDER_NO", 2)]);
    let caches = Caches::new();
    let builder = qb(DatabaseBackend::Postgres);

    let position = builder
        .key_position(&db, &caches, None, "ORDERS", "order_no")
        .await
        .unwrap();
    assert_eq!(position, 2);

    let position = builder
        .key_position(&db, &caches, None, "ORDERS", "missing")
        .await
        .unwrap();
    assert_eq!(position, 0);

    let keys = builder
        .primary_keys(&db, &caches, None, "ORDERS")
        .await
        .unwrap();
    let again = builder
        .primary_keys(&db, &caches, None, "ORDERS")
        .await
        .unwrap();
    assert_eq!(keys.len(), 2);
    assert!(Arc::ptr_eq(&keys, &again));
}

#[tokio::test]
async fn test_schema_cache_shares_loaded_shapes() {
    let db = ScriptedDb::new("main").with_columns(vec![
        column("ID", "CUSTOMERS", ColumnKind::Int),
        column("NAME", "CUSTOMERS", ColumnKind::VarChar),
    ]);
    let caches = Caches::new();

    let first = caches.schemas.get_or_load(&db, None, "CUSTOMERS").await.unwrap();
    let second = caches.schemas.get_or_load(&db, None, "customers").await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.number_of_columns(), 2);
    assert_eq!(first.index_of("name"), Some(2));

    caches.flush();
    assert!(caches.schemas.get("main", "customers").is_none());
}
