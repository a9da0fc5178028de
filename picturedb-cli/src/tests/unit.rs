//! Focused unit tests covering conversion of merged arguments.

use super::*;
use crate::commands::{Operation, PictureChanges};
use camino::Utf8PathBuf;
use chrono::NaiveDate;
use picturedb_core::{CsvDialect, DEFAULT_DATE_FORMAT, DialectError};
use rstest::rstest;

fn db() -> Option<Utf8PathBuf> {
    Some(Utf8PathBuf::from("pictures.csv"))
}

fn insert_args() -> InsertArgs {
    InsertArgs {
        db: db(),
        date: Some(String::from("2022-06-30 21:15:00")),
        longitude: Some(-3.19),
        latitude: Some(55.95),
        title: Some(String::from("Calton Hill")),
        url: Some(String::from("https://example.com/calton.jpg")),
        ..InsertArgs::default()
    }
}

#[rstest]
fn converting_without_db_errors() {
    let err = Invocation::try_from(CountArgs::default()).expect_err("missing db should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_DB);
            assert_eq!(env, "PICTUREDB_CMDS_COUNT_DB");
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn store_settings_default_to_the_standard_dialect() {
    let invocation = Invocation::try_from(ListArgs {
        db: db(),
        ..ListArgs::default()
    })
    .expect("list resolves");
    assert_eq!(invocation.store.db, Utf8PathBuf::from("pictures.csv"));
    assert_eq!(invocation.store.dialect, CsvDialect::default());
    assert_eq!(invocation.operation, Operation::List);
}

#[rstest]
fn store_settings_take_overrides() {
    let invocation = Invocation::try_from(CountArgs {
        db: db(),
        delimiter: Some('|'),
        date_format: Some(String::from("%d/%m/%Y %H:%M")),
    })
    .expect("count resolves");
    assert_eq!(invocation.store.dialect.delimiter, '|');
    assert_eq!(invocation.store.dialect.date_format, "%d/%m/%Y %H:%M");
}

#[rstest]
#[case('\n')]
#[case('\r')]
fn line_breaks_are_rejected_as_delimiters(#[case] delimiter: char) {
    let err = Invocation::try_from(CountArgs {
        db: db(),
        delimiter: Some(delimiter),
        ..CountArgs::default()
    })
    .expect_err("line break delimiter");
    assert!(matches!(
        err,
        CliError::InvalidDialect(DialectError::LineBreakDelimiter { .. })
    ));
}

#[rstest]
fn date_formats_without_a_time_are_rejected() {
    let err = Invocation::try_from(GetArgs {
        db: db(),
        date_format: Some(String::from("%Y-%m-%d")),
        id: Some(1),
        ..GetArgs::default()
    })
    .expect_err("date-only format");
    assert!(matches!(
        err,
        CliError::InvalidDialect(DialectError::LossyDateFormat { .. })
    ));
}

#[rstest]
#[case(InsertArgs { date: None, ..insert_args() }, ARG_DATE)]
#[case(InsertArgs { longitude: None, ..insert_args() }, ARG_LONGITUDE)]
#[case(InsertArgs { latitude: None, ..insert_args() }, ARG_LATITUDE)]
#[case(InsertArgs { title: None, ..insert_args() }, ARG_TITLE)]
#[case(InsertArgs { url: None, ..insert_args() }, ARG_URL)]
fn insert_requires_every_picture_field(#[case] args: InsertArgs, #[case] expected: &str) {
    let err = Invocation::try_from(args).expect_err("missing field should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, expected);
            assert!(env.starts_with("PICTUREDB_CMDS_INSERT_"));
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn insert_builds_an_unstored_picture() {
    let invocation = Invocation::try_from(insert_args()).expect("insert resolves");
    let Operation::Insert(picture) = invocation.operation else {
        panic!("expected an insert operation");
    };
    let expected_date = NaiveDate::from_ymd_opt(2022, 6, 30)
        .and_then(|day| day.and_hms_opt(21, 15, 0))
        .expect("valid date");
    assert_eq!(picture.id, 0);
    assert_eq!(picture.date, expected_date);
    assert_eq!(picture.longitude(), -3.19);
    assert_eq!(picture.title, "Calton Hill");
}

#[rstest]
fn insert_reports_dates_not_matching_the_format() {
    let args = InsertArgs {
        date: Some(String::from("30.06.2022")),
        ..insert_args()
    };
    let err = Invocation::try_from(args).expect_err("bad date");
    match err {
        CliError::InvalidDate { value, format, .. } => {
            assert_eq!(value, "30.06.2022");
            assert_eq!(format, DEFAULT_DATE_FORMAT);
        }
        other => panic!("expected InvalidDate, found {other:?}"),
    }
}

#[rstest]
fn insert_reports_malformed_urls() {
    let args = InsertArgs {
        url: Some(String::from("not a url")),
        ..insert_args()
    };
    let err = Invocation::try_from(args).expect_err("bad url");
    assert!(matches!(err, CliError::InvalidUrl { .. }));
}

#[rstest]
fn update_keeps_unset_fields_empty() {
    let invocation = Invocation::try_from(UpdateArgs {
        db: db(),
        id: Some(4),
        title: Some(String::from("Renamed")),
        ..UpdateArgs::default()
    })
    .expect("update resolves");
    assert_eq!(
        invocation.operation,
        Operation::Update(PictureChanges {
            id: 4,
            date: None,
            longitude: None,
            latitude: None,
            title: Some(String::from("Renamed")),
            url: None,
        })
    );
}

#[rstest]
fn near_requires_deviation() {
    let err = Invocation::try_from(NearArgs {
        db: db(),
        longitude: Some(1.0),
        latitude: Some(2.0),
        ..NearArgs::default()
    })
    .expect_err("missing deviation");
    assert!(matches!(
        err,
        CliError::MissingArgument {
            field: ARG_DEVIATION,
            ..
        }
    ));
}

#[rstest]
fn delete_requires_an_identifier() {
    let err = Invocation::try_from(DeleteArgs {
        db: db(),
        ..DeleteArgs::default()
    })
    .expect_err("missing id");
    assert!(matches!(err, CliError::MissingArgument { field: ARG_ID, .. }));
}
