use rusqlite::{params, Connection};
use tempfile::tempdir;

use asset_sync_core::{CatalogRecord, CatalogSource, Error, SqliteCatalog};

const SCHEMA: &str = "CREATE TABLE products (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    images TEXT,
    is_active INTEGER NOT NULL DEFAULT 1
);";

fn seed(conn: &Connection) {
    conn.execute_batch(SCHEMA).unwrap();
    let rows: &[(&str, &str, Option<&str>, i64)] = &[
        ("p1", "Classic V Cut", Some("[]"), 1),
        ("p2", "Untitled", Some(r#"["http://x/y.png"]"#), 1),
        ("p3", "Retired Brief", Some("[]"), 0),
        ("p4", "Apple V Cut", None, 1),
        ("p5", "Broken", Some("{oops"), 1),
    ];
    for (id, name, images, active) in rows {
        conn.execute(
            "INSERT INTO products (id, name, images, is_active) VALUES (?1, ?2, ?3, ?4)",
            params![id, name, images, active],
        )
        .unwrap();
    }
}

#[test]
fn test_reads_only_active_records() {
    let conn = Connection::open_in_memory().unwrap();
    seed(&conn);
    let catalog = SqliteCatalog::from_connection(conn).unwrap();

    let records = catalog.active_records().unwrap();
    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["p4", "p5", "p1", "p2"]);

    assert_eq!(records[0], CatalogRecord::new("p4", "Apple V Cut", vec![]));
    assert!(records[1].images.is_empty());
    assert_eq!(records[3].images, vec!["http://x/y.png".to_string()]);
}

#[test]
fn test_open_file_database() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("storefront.db");
    {
        let conn = Connection::open(&path).unwrap();
        seed(&conn);
    }

    let catalog = SqliteCatalog::open(path.to_str().unwrap()).unwrap();
    assert_eq!(catalog.active_records().unwrap().len(), 4);
}

#[test]
fn test_missing_database_is_unavailable() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("nope.db");
    let result = SqliteCatalog::open(path.to_str().unwrap());
    assert!(matches!(result, Err(Error::CatalogUnavailable(_))));
    assert!(!path.exists());
}

#[test]
fn test_database_without_products_table_is_unavailable() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("empty.db");
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE users (id INTEGER);").unwrap();
    }
    let result = SqliteCatalog::open(path.to_str().unwrap());
    assert!(matches!(result, Err(Error::CatalogUnavailable(_))));
}

#[test]
fn test_numeric_ids_read_as_text() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE products (id INTEGER PRIMARY KEY, name TEXT, images TEXT, is_active INTEGER);
         INSERT INTO products VALUES (42, 'Vest', '[]', 1);",
    )
    .unwrap();
    let catalog = SqliteCatalog::from_connection(conn).unwrap();
    assert_eq!(catalog.active_records().unwrap()[0].id, "42");
}
