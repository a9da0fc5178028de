//! Property-based tests for row projection and the file store.
//!
//! # Invariants tested
//!
//! - **Projection round trip:** writing a picture into a row and parsing the
//!   rendered line yields the same picture.
//! - **Identifier allocation:** the file store hands out one more than the
//!   largest stored identifier, whatever was deleted before.

use camino::Utf8PathBuf;
use chrono::{DateTime, NaiveDateTime};
use geo::Coord;
use picturedb_core::{
    DEFAULT_DATE_FORMAT, DEFAULT_DELIMITER, FilePictureStore, Picture, PictureStore, Projection,
};
use proptest::prelude::*;
use tempfile::TempDir;
use url::Url;

const HEADER: [&str; 7] = ["url", "id", "notes", "title", "latitude", "date", "longitude"];

fn date_strategy() -> impl Strategy<Value = NaiveDateTime> {
    // 1970 to 2100 keeps years at four digits.
    (0_i64..=4_102_444_800).prop_filter_map("timestamp in range", |secs| {
        DateTime::from_timestamp(secs, 0).map(|moment| moment.naive_utc())
    })
}

fn picture_strategy() -> impl Strategy<Value = Picture> {
    (
        any::<u64>(),
        date_strategy(),
        -180.0_f64..=180.0,
        -90.0_f64..=90.0,
        "[A-Za-z0-9 ,.'()-]{0,40}",
        "[a-z0-9]{1,12}",
    )
        .prop_map(|(id, date, longitude, latitude, title, stem)| {
            let url = Url::parse(&format!("https://pictures.example.com/{stem}.jpg"))
                .expect("generated URL parses");
            Picture::new(
                date,
                Coord {
                    x: longitude,
                    y: latitude,
                },
                title,
                url,
            )
            .with_id(id)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: a picture applied to a row survives rendering and re-parsing
    /// unchanged, apart from the identifier the row already carried.
    #[test]
    fn applied_picture_survives_rendering(
        picture in picture_strategy(),
        row_id in any::<u64>(),
    ) {
        let projection = Projection::new(DEFAULT_DATE_FORMAT, &HEADER).expect("complete header");
        // Fields in header order: url, id, notes, title, latitude, date, longitude.
        let line = format!(";{row_id};kept;;;;");
        let mut row = projection.split(&line, DEFAULT_DELIMITER);
        row.apply(&picture).expect("picture renders");

        let rendered = row.join(DEFAULT_DELIMITER);
        let reparsed = projection.split(&rendered, DEFAULT_DELIMITER);
        prop_assert_eq!(reparsed.fields().get(2).map(String::as_str), Some("kept"));
        let parsed = reparsed.to_picture().expect("rendered row parses");

        prop_assert_eq!(parsed, picture.with_id(row_id));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Property: every insert returns one more than the largest stored
    /// identifier.
    #[test]
    fn identifiers_follow_the_largest_stored(deletions in proptest::collection::vec(any::<bool>(), 1..8)) {
        let dir = TempDir::new().expect("create temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("pictures.csv"))
            .expect("temp dir is UTF-8");
        let mut store = FilePictureStore::open(&path).expect("open store");

        for delete_after in deletions {
            let largest = store
                .find_all()
                .expect("list")
                .iter()
                .map(|stored| stored.id)
                .max()
                .unwrap_or(0);
            let mut picture = Picture::new(
                DateTime::from_timestamp(0, 0).expect("epoch").naive_utc(),
                Coord { x: 0.0, y: 0.0 },
                "step",
                Url::parse("https://pictures.example.com/step.jpg").expect("valid url"),
            );
            let id = store.insert(&mut picture).expect("insert");
            prop_assert_eq!(id, largest + 1);
            if delete_after {
                store.delete(&picture).expect("delete");
            }
        }
    }
}
