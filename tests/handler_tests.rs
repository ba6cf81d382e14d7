mod common;

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use tempfile::TempDir;
use zonesync::SyncError;
use zonesync::config::HandlerConfig;
use zonesync::handler::UpdateHandler;
use zonesync::notify::NotifyDispatcher;
use zonesync::zone::ZoneConfigStore;

fn sender() -> SocketAddr {
    "88.99.47.253:41953".parse().unwrap()
}

fn update_handler() -> UpdateHandler {
    UpdateHandler::new(NotifyDispatcher::new(vec!["88.99.47.253".parse().unwrap()]))
}

fn bind_handler(dir: &Path) -> HandlerConfig {
    HandlerConfig {
        name: "test bind".to_string(),
        kind: "bind".to_string(),
        config_file: dir.join("zones.conf"),
        zonefiles_path: dir.join("zonefiles"),
    }
}

#[tokio::test]
async fn test_notify_creates_missing_config_file() {
    let dir = TempDir::new().unwrap();
    let config = bind_handler(dir.path());
    let msg = common::notify_message("mjui.de");

    update_handler()
        .handle(&config, &msg, sender())
        .await
        .unwrap();

    let mut store = ZoneConfigStore::new();
    store.load(&config.config_file).unwrap();

    let zone = store.get_zone("mjui.de").unwrap();
    assert!(zone.is_valid());
    assert_eq!(zone.masters, vec!["88.99.47.253".to_string()]);
    assert_eq!(
        zone.file,
        dir.path()
            .join("zonefiles/mjui.de.host")
            .to_string_lossy()
            .into_owned()
    );
}

#[tokio::test]
async fn test_notify_keeps_existing_zones() {
    let dir = TempDir::new().unwrap();
    let config = bind_handler(dir.path());

    let existing = "zone \"dau.fun\" {\n\
                    \x20       type slave;\n\
                    \x20       masters {\n\
                    \x20               88.99.47.253;\n\
                    \x20               };\n\
                    \x20       file \"/etc/bind/db.dau.fun\";\n\
                    };\n";
    fs::write(&config.config_file, existing).unwrap();

    let msg = common::notify_message("mjui.de");
    update_handler()
        .handle(&config, &msg, sender())
        .await
        .unwrap();

    let mut store = ZoneConfigStore::new();
    store.load(&config.config_file).unwrap();

    assert_eq!(store.len(), 2);
    assert!(store.get_zone("dau.fun").is_some());
    assert!(store.get_zone("mjui.de").is_some());
}

#[tokio::test]
async fn test_repeated_notify_is_an_upsert() {
    let dir = TempDir::new().unwrap();
    let config = bind_handler(dir.path());
    let handler = update_handler();
    let msg = common::notify_message("mjui.de");

    handler.handle(&config, &msg, sender()).await.unwrap();
    handler.handle(&config, &msg, sender()).await.unwrap();

    // A second NOTIFY from another master replaces, never accumulates.
    let other_sender: SocketAddr = "10.0.0.2:53".parse().unwrap();
    handler.handle(&config, &msg, other_sender).await.unwrap();

    let mut store = ZoneConfigStore::new();
    store.load(&config.config_file).unwrap();

    assert_eq!(store.len(), 1);
    let zone = store.get_zone("mjui.de").unwrap();
    assert_eq!(zone.masters, vec!["10.0.0.2".to_string()]);
}

#[tokio::test]
async fn test_unknown_handler_type_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut config = bind_handler(dir.path());
    config.kind = "powerdns".to_string();

    let msg = common::notify_message("mjui.de");
    let err = update_handler()
        .handle(&config, &msg, sender())
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::NoSuchHandlerType(kind) if kind == "powerdns"));
}

#[tokio::test]
async fn test_non_notify_message_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let config = bind_handler(dir.path());

    let msg = common::query_message("mjui.de");
    update_handler()
        .handle(&config, &msg, sender())
        .await
        .unwrap();

    // Not actionable is a successful no-op; the config file is never
    // created.
    assert!(!config.config_file.exists());
}

#[tokio::test]
async fn test_concurrent_notifies_for_one_file_all_land() {
    let dir = TempDir::new().unwrap();
    let config = bind_handler(dir.path());
    let handler = std::sync::Arc::new(update_handler());

    let mut tasks = Vec::new();
    for i in 0..8 {
        let handler = handler.clone();
        let config = config.clone();
        let msg = common::notify_message(&format!("zone{i}.tld"));
        tasks.push(tokio::spawn(async move {
            handler.handle(&config, &msg, sender()).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    // Per-file locking serializes the load-modify-save cycles, so no
    // update is lost to an interleaved writer.
    let mut store = ZoneConfigStore::new();
    store.load(&config.config_file).unwrap();
    assert_eq!(store.len(), 8);
}
