//! Tests running resolved operations against in-memory and file stores.

use super::*;
use crate::commands::{Operation, PictureChanges};
use crate::config::StoreConfig;
use camino::Utf8PathBuf;
use picturedb_core::test_support::{MemoryStore, picture_at};
use picturedb_core::{CsvDialect, Picture, PictureStore, PictureStoreError};
use rstest::{fixture, rstest};
use tempfile::TempDir;

#[fixture]
fn store() -> MemoryStore {
    MemoryStore::with_pictures([
        picture_at(10.0, 10.0).with_id(1),
        picture_at(10.5, 10.5).with_id(2),
        picture_at(12.0, 12.0).with_id(3),
    ])
}

fn run(operation: Operation, store: &mut MemoryStore) -> Result<String, CliError> {
    let mut out = Vec::new();
    execute(operation, store, &mut out)?;
    Ok(String::from_utf8(out).expect("UTF-8 output"))
}

fn pictures(json: &str) -> Vec<Picture> {
    serde_json::from_str(json).expect("picture list JSON")
}

#[rstest]
fn count_prints_a_number(mut store: MemoryStore) {
    assert_eq!(run(Operation::Count, &mut store).expect("count"), "3\n");
}

#[rstest]
fn near_prints_pictures_on_the_boundary(mut store: MemoryStore) {
    let json = run(
        Operation::Near {
            longitude: 10.0,
            latitude: 10.0,
            deviation: 0.5,
        },
        &mut store,
    )
    .expect("near");
    let ids: Vec<u64> = pictures(&json).iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[rstest]
fn get_reports_missing_pictures(mut store: MemoryStore) {
    let err = run(Operation::Get { id: 9 }, &mut store).expect_err("no picture 9");
    assert!(matches!(
        err,
        CliError::Store(PictureStoreError::NotFound { id: 9 })
    ));
}

#[rstest]
fn insert_prints_the_assigned_identifier(mut store: MemoryStore) {
    let json = run(Operation::Insert(picture_at(0.0, 0.0)), &mut store).expect("insert");
    let stored: Picture = serde_json::from_str(&json).expect("picture JSON");
    assert_eq!(stored.id, 4);
    assert_eq!(store.count().expect("count"), 4);
}

#[rstest]
fn update_overlays_only_given_fields(mut store: MemoryStore) {
    let changes = PictureChanges {
        id: 2,
        date: None,
        longitude: Some(-1.0),
        latitude: None,
        title: Some(String::from("Moved")),
        url: None,
    };
    run(Operation::Update(changes), &mut store).expect("update");

    let updated = store.find_by_id(2).expect("find").expect("present");
    let original = picture_at(10.5, 10.5);
    assert_eq!(updated.title, "Moved");
    assert_eq!(updated.longitude(), -1.0);
    assert_eq!(updated.latitude(), 10.5);
    assert_eq!(updated.url, original.url);
}

#[rstest]
fn delete_prints_the_removed_picture(mut store: MemoryStore) {
    let json = run(Operation::Delete { id: 3 }, &mut store).expect("delete");
    let removed: Picture = serde_json::from_str(&json).expect("picture JSON");
    assert_eq!(removed.id, 3);
    assert_eq!(store.find_by_id(3).expect("find"), None);
}

#[rstest]
fn invocation_runs_against_a_picture_file() {
    let dir = TempDir::new().expect("tempdir");
    let db = Utf8PathBuf::from_path_buf(dir.path().join("albums/pictures.csv"))
        .expect("utf-8 workspace");
    let config = StoreConfig {
        db: db.clone(),
        dialect: CsvDialect::default(),
    };

    let mut out = Vec::new();
    run_invocation(
        Invocation {
            store: config.clone(),
            operation: Operation::Insert(picture_at(7.0, 8.0)),
        },
        &mut out,
    )
    .expect("insert through the file store");

    let mut listing = Vec::new();
    run_invocation(
        Invocation {
            store: config,
            operation: Operation::List,
        },
        &mut listing,
    )
    .expect("list through the file store");

    let listed = pictures(&String::from_utf8(listing).expect("UTF-8 output"));
    assert_eq!(listed, vec![picture_at(7.0, 8.0).with_id(1)]);
    assert!(db.is_file());
}
