//! Behavioural tests for `FilePictureStore` using rstest-bdd.

use std::cell::RefCell;

use camino::Utf8PathBuf;
use chrono::NaiveDate;
use geo::Coord;
use picturedb_core::{
    Column, FilePictureStore, Picture, PictureStore, PictureStoreError, ProjectionError,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;
use url::Url;

/// Shared state for picture store scenarios.
#[derive(Debug)]
struct StoreWorld {
    temp_dir: TempDir,
    store: RefCell<Option<FilePictureStore>>,
    open_error: RefCell<Option<PictureStoreError>>,
    operation_error: RefCell<Option<PictureStoreError>>,
    inserted: RefCell<Vec<Picture>>,
    snapshot: RefCell<Option<Vec<u8>>>,
    results: RefCell<Vec<Picture>>,
}

impl StoreWorld {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("create temp dir"),
            store: RefCell::new(None),
            open_error: RefCell::new(None),
            operation_error: RefCell::new(None),
            inserted: RefCell::new(Vec::new()),
            snapshot: RefCell::new(None),
            results: RefCell::new(Vec::new()),
        }
    }

    fn path(&self) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.temp_dir.path().join("pictures.csv"))
            .expect("temp dir is UTF-8")
    }

    fn open(&self) {
        match FilePictureStore::open(self.path()) {
            Ok(store) => {
                self.store.replace(Some(store));
                self.open_error.replace(None);
            }
            Err(err) => {
                self.store.replace(None);
                self.open_error.replace(Some(err));
            }
        }
    }

    fn with_store<T>(&self, action: impl FnOnce(&mut FilePictureStore) -> T) -> T {
        let mut borrowed = self.store.borrow_mut();
        let store = borrowed
            .as_mut()
            .expect("store should be open before it is used");
        action(store)
    }

    fn insert(&self, mut picture: Picture) {
        self.with_store(|store| store.insert(&mut picture))
            .expect("insert picture");
        self.inserted.borrow_mut().push(picture);
    }

    fn contents(&self) -> Vec<u8> {
        std::fs::read(self.path()).expect("read picture file")
    }
}

#[fixture]
fn world() -> StoreWorld {
    StoreWorld::new()
}

fn picture(title: &str, longitude: f64, latitude: f64) -> Picture {
    let date = NaiveDate::from_ymd_opt(2015, 10, 21)
        .and_then(|day| day.and_hms_opt(16, 29, 0))
        .expect("valid date");
    let url = Url::parse(&format!("https://example.com/{title}.jpg")).expect("valid url");
    Picture::new(
        date,
        Coord {
            x: longitude,
            y: latitude,
        },
        title,
        url,
    )
}

#[given("an empty picture store")]
fn empty_store(world: &StoreWorld) {
    world.open();
}

#[given("a picture store holding one picture")]
fn store_with_one(world: &StoreWorld) {
    world.open();
    world.insert(picture("only", 1.0, 1.0));
}

#[given("a picture file whose header lacks latitude")]
fn header_without_latitude(world: &StoreWorld) {
    std::fs::write(world.path(), "id;date;longitude;title;url\n").expect("seed header");
}

#[given("a picture store with pictures at 10, 10.5 and 12 degrees")]
fn store_with_grid(world: &StoreWorld) {
    world.open();
    for value in [10.0, 10.5, 12.0] {
        world.insert(picture("spot", value, value));
    }
}

#[when("I open the picture store")]
fn open_store(world: &StoreWorld) {
    world.open();
}

#[when("I insert three pictures")]
fn insert_three(world: &StoreWorld) {
    for title in ["first", "second", "third"] {
        world.insert(picture(title, 0.0, 0.0));
    }
}

#[when("I delete the second picture")]
fn delete_second(world: &StoreWorld) {
    let second = world
        .inserted
        .borrow()
        .get(1)
        .cloned()
        .expect("second picture inserted");
    world
        .with_store(|store| store.delete(&second))
        .expect("delete picture");
}

#[when("I insert another picture")]
fn insert_another(world: &StoreWorld) {
    world.insert(picture("another", 5.0, 5.0));
}

#[when("I update a picture that is not stored")]
fn update_missing(world: &StoreWorld) {
    world.snapshot.replace(Some(world.contents()));
    let ghost = picture("ghost", 2.0, 2.0).with_id(99);
    let outcome = world.with_store(|store| store.update(&ghost));
    world.operation_error.replace(outcome.err());
}

#[when("I query within half a degree of 10, 10")]
fn query_near(world: &StoreWorld) {
    let results = world
        .with_store(|store| store.find_by_position(10.0, 10.0, 0.5))
        .expect("query pictures");
    world.results.replace(results);
}

#[then("the pictures have identifiers 1, 2 and 3")]
fn identifiers_sequential(world: &StoreWorld) {
    let ids: Vec<u64> = world.inserted.borrow().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[then("the store counts three pictures")]
fn counts_three(world: &StoreWorld) {
    let count = world
        .with_store(|store| store.count())
        .expect("count pictures");
    assert_eq!(count, 3);
}

#[then("the newest picture has identifier 4")]
fn newest_is_four(world: &StoreWorld) {
    let newest = world
        .inserted
        .borrow()
        .last()
        .map(|picture| picture.id);
    assert_eq!(newest, Some(4));
}

#[then("the store reports that the picture was not found")]
fn reports_not_found(world: &StoreWorld) {
    let error = world.operation_error.borrow();
    assert!(matches!(
        error.as_ref(),
        Some(PictureStoreError::NotFound { id: 99 })
    ));
}

#[then("the picture file is unchanged")]
fn file_unchanged(world: &StoreWorld) {
    let before = world.snapshot.borrow().clone().expect("snapshot taken");
    assert_eq!(world.contents(), before);
}

#[then("opening fails with a missing latitude column")]
fn missing_latitude(world: &StoreWorld) {
    let error = world.open_error.borrow();
    assert!(matches!(
        error.as_ref(),
        Some(PictureStoreError::Header {
            source: ProjectionError::MissingColumn {
                column: Column::Latitude
            },
            ..
        })
    ));
}

#[then("the pictures at 10 and 10.5 degrees are returned")]
fn boundary_results(world: &StoreWorld) {
    let ids: Vec<u64> = world.results.borrow().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[scenario(path = "tests/features/file_picture_store.feature", index = 0)]
fn sequential_identifiers(world: StoreWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/file_picture_store.feature", index = 1)]
fn identifiers_not_reused(world: StoreWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/file_picture_store.feature", index = 2)]
fn missing_update_is_harmless(world: StoreWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/file_picture_store.feature", index = 3)]
fn header_validation(world: StoreWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/file_picture_store.feature", index = 4)]
fn boundary_inclusive_query(world: StoreWorld) {
    let _ = world;
}
