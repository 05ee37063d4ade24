use rusqlite::Connection;

use cpd_storage::migrations::{self, v001_initial, v002_sync_columns};
use cpd_storage::Database;

#[test]
fn fresh_database_reaches_latest_version() {
    let conn = Connection::open_in_memory().unwrap();
    migrations::run_migrations(&conn).unwrap();
    assert_eq!(migrations::current_version(&conn).unwrap(), 4);
}

#[test]
fn rerunning_migrations_is_a_no_op() {
    let conn = Connection::open_in_memory().unwrap();
    migrations::run_migrations(&conn).unwrap();
    migrations::run_migrations(&conn).unwrap();
    assert_eq!(migrations::current_version(&conn).unwrap(), 4);

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
        .unwrap();
    assert_eq!(rows, 4);
}

#[test]
fn role_backfill_from_legacy_columns() {
    let conn = Connection::open_in_memory().unwrap();

    // Build a database frozen at v002, before roles existed.
    conn.execute_batch(
        "CREATE TABLE schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )",
    )
    .unwrap();
    v001_initial::migrate(&conn).unwrap();
    v002_sync_columns::migrate(&conn).unwrap();
    conn.execute("INSERT INTO schema_version (version) VALUES (1), (2)", [])
        .unwrap();

    conn.execute_batch(
        "INSERT INTO assets (id, name, category, purchase_date, price, is_composite)
             VALUES ('sys-1', 'PC build', 'Tech', '2024-01-01T00:00:00Z', 30000, 1);
         INSERT INTO assets (id, name, category, purchase_date, price, parent_id)
             VALUES ('part-1', 'GPU', 'Tech', '2024-02-01T00:00:00Z', 18000, 'sys-1');
         INSERT INTO assets (id, name, category, purchase_date, price)
             VALUES ('solo-1', 'Camera', 'Tech', '2024-03-01T00:00:00Z', 25000);",
    )
    .unwrap();

    migrations::run_migrations(&conn).unwrap();

    let role_of = |id: &str| -> (String, Option<String>) {
        conn.query_row(
            "SELECT role, system_id FROM assets WHERE id = ?1",
            [id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap()
    };

    assert_eq!(role_of("sys-1"), ("System".to_string(), None));
    assert_eq!(
        role_of("part-1"),
        ("Component".to_string(), Some("sys-1".to_string()))
    );
    assert_eq!(role_of("solo-1"), ("Standalone".to_string(), None));
}

#[test]
fn composite_wins_over_parent_id_in_backfill() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )",
    )
    .unwrap();
    v001_initial::migrate(&conn).unwrap();
    v002_sync_columns::migrate(&conn).unwrap();
    conn.execute("INSERT INTO schema_version (version) VALUES (1), (2)", [])
        .unwrap();
    conn.execute(
        "INSERT INTO assets (id, name, category, purchase_date, price, parent_id, is_composite)
             VALUES ('odd-1', 'both flags', 'Tech', '2024-01-01T00:00:00Z', 1, 'sys-x', 1)",
        [],
    )
    .unwrap();

    migrations::run_migrations(&conn).unwrap();

    let role: String = conn
        .query_row("SELECT role FROM assets WHERE id = 'odd-1'", [], |r| {
            r.get(0)
        })
        .unwrap();
    assert_eq!(role, "System");
}

#[test]
fn file_backed_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cpd.db");

    {
        let db = Database::open(&path).unwrap();
        let asset = cpd_core::model::Asset::new("SSD", cpd_core::model::AssetCategory::Tech, 2_500.0);
        db.add_asset(&asset).unwrap();
    }

    let db = Database::open(&path).unwrap();
    assert_eq!(db.all_assets().unwrap().len(), 1);
}
