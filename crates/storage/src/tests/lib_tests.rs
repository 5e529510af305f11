use super::*;
use shared::domain::{Member, MemberId};

fn temp_database_url(label: &str) -> (PathBuf, String) {
    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = std::env::temp_dir().join(format!("standup_storage_{label}_{suffix}"));
    let db_path = temp_root.join("nested").join("storage.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));
    (temp_root, database_url)
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let (temp_root, database_url) = temp_database_url("create");

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    let db_path = temp_root.join("nested").join("storage.db");
    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );

    std::fs::remove_dir_all(temp_root).expect("cleanup");
}

#[tokio::test]
async fn kv_put_overwrites_and_delete_reports_presence() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    assert_eq!(storage.get_value("k").await.expect("get"), None);

    storage.put_value("k", "one").await.expect("put");
    storage.put_value("k", "two").await.expect("overwrite");
    assert_eq!(storage.get_value("k").await.expect("get").as_deref(), Some("two"));

    assert!(storage.delete_value("k").await.expect("delete"));
    assert!(!storage.delete_value("k").await.expect("second delete"));
}

#[tokio::test]
async fn missing_roster_yields_defaults() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let sectors = storage.list_sectors().await.expect("list");
    assert_eq!(sectors.len(), 3);
    assert_eq!(sectors[0].manager, "Diego");
}

#[tokio::test]
async fn saved_sector_is_returned_by_get_and_list() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let mut sector = storage
        .get_sector(&SectorId::new("3"))
        .await
        .expect("sector");
    sector
        .members
        .push(Member::new(MemberId::new("sec-99"), "Nova Pessoa"));
    storage.save_sector(sector.clone()).await.expect("save");

    let reloaded = storage
        .get_sector(&SectorId::new("3"))
        .await
        .expect("reload");
    assert_eq!(reloaded, sector);

    let raw = storage
        .get_value(ROSTER_KEY)
        .await
        .expect("get")
        .expect("roster persisted under fixed key");
    assert!(raw.contains("Nova Pessoa"));
}

#[tokio::test]
async fn reset_to_defaults_discards_edits() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let mut sector = storage
        .get_sector(&SectorId::new("1"))
        .await
        .expect("sector");
    sector.members.clear();
    storage.save_sector(sector).await.expect("save");

    storage.reset_to_defaults().await.expect("reset");

    let restored = storage
        .get_sector(&SectorId::new("1"))
        .await
        .expect("restored");
    assert_eq!(restored.members.len(), 17);
    assert_eq!(storage.get_value(ROSTER_KEY).await.expect("get"), None);
}

#[tokio::test]
async fn malformed_roster_falls_back_to_defaults() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage
        .put_value(ROSTER_KEY, "{not json")
        .await
        .expect("put garbage");

    let roster = storage.load_roster().await.expect("load");
    assert_eq!(roster, default_roster());
}

#[tokio::test]
async fn unknown_sector_is_an_error() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let err = storage
        .get_sector(&SectorId::new("missing"))
        .await
        .expect_err("unknown sector");
    assert!(err.to_string().contains("missing"));
}

#[tokio::test]
async fn roster_survives_reopening_the_database_file() {
    let (temp_root, database_url) = temp_database_url("reopen");

    {
        let storage = Storage::new(&database_url).await.expect("db");
        let mut sector = storage
            .get_sector(&SectorId::new("2"))
            .await
            .expect("sector");
        sector.manager = "Outra Pessoa".into();
        storage.save_sector(sector).await.expect("save");
        storage.pool().close().await;
    }

    let storage = Storage::new(&database_url).await.expect("reopen");
    let sector = storage
        .get_sector(&SectorId::new("2"))
        .await
        .expect("sector");
    assert_eq!(sector.manager, "Outra Pessoa");
    storage.pool().close().await;

    std::fs::remove_dir_all(temp_root).expect("cleanup");
}

#[tokio::test]
async fn memory_store_behaves_like_sqlite_store() {
    let store = MemoryRosterStore::default();
    assert_eq!(store.list_sectors().await.expect("list").len(), 3);

    let mut sector = store.get_sector(&SectorId::new("3")).await.expect("sector");
    sector.name = "SecOps".into();
    store.save_sector(sector).await.expect("save");
    assert_eq!(
        store
            .get_sector(&SectorId::new("3"))
            .await
            .expect("sector")
            .name,
        "SecOps"
    );

    store.reset_to_defaults().await.expect("reset");
    assert_eq!(
        store
            .get_sector(&SectorId::new("3"))
            .await
            .expect("sector")
            .name,
        "Cibersegurança"
    );
}
