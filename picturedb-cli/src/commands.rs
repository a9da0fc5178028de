//! Subcommand arguments and their execution against a picture store.
//!
//! Every subcommand merges its options from CLI flags, configuration files
//! and `PICTUREDB_CMDS_<COMMAND>_<FIELD>` environment variables, then
//! resolves them into an [`Invocation`]: where the store lives and which
//! [`Operation`] to run.

use std::io::Write;

use camino::Utf8PathBuf;
use chrono::NaiveDateTime;
use clap::Parser;
use geo::Coord;
use log::debug;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use picturedb_core::{Picture, PictureStore, PictureStoreError};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::{StoreConfig, parse_url, require};
use crate::{
    ARG_DATE, ARG_DATE_FORMAT, ARG_DB, ARG_DELIMITER, ARG_DEVIATION, ARG_ID, ARG_LATITUDE,
    ARG_LONGITUDE, ARG_TITLE, ARG_URL, CMD_COUNT, CMD_DELETE, CMD_GET, CMD_INSERT, CMD_LIST,
    CMD_NEAR, CMD_UPDATE, CliError,
};

/// CLI arguments for the `count` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Print the number of stored pictures")]
#[ortho_config(prefix = "PICTUREDB")]
pub(crate) struct CountArgs {
    /// Path to the picture file.
    #[arg(long = ARG_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) db: Option<Utf8PathBuf>,
    /// Field delimiter of the picture file (default `;`).
    #[arg(long = ARG_DELIMITER, value_name = "char")]
    #[serde(default)]
    pub(crate) delimiter: Option<char>,
    /// `strftime` format of the date column.
    #[arg(long = ARG_DATE_FORMAT, value_name = "format")]
    #[serde(default)]
    pub(crate) date_format: Option<String>,
}

/// CLI arguments for the `list` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Print every readable picture as JSON")]
#[ortho_config(prefix = "PICTUREDB")]
pub(crate) struct ListArgs {
    /// Path to the picture file.
    #[arg(long = ARG_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) db: Option<Utf8PathBuf>,
    /// Field delimiter of the picture file (default `;`).
    #[arg(long = ARG_DELIMITER, value_name = "char")]
    #[serde(default)]
    pub(crate) delimiter: Option<char>,
    /// `strftime` format of the date column.
    #[arg(long = ARG_DATE_FORMAT, value_name = "format")]
    #[serde(default)]
    pub(crate) date_format: Option<String>,
}

/// CLI arguments for the `get` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Print the picture with the given identifier")]
#[ortho_config(prefix = "PICTUREDB")]
pub(crate) struct GetArgs {
    /// Path to the picture file.
    #[arg(long = ARG_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) db: Option<Utf8PathBuf>,
    /// Field delimiter of the picture file (default `;`).
    #[arg(long = ARG_DELIMITER, value_name = "char")]
    #[serde(default)]
    pub(crate) delimiter: Option<char>,
    /// `strftime` format of the date column.
    #[arg(long = ARG_DATE_FORMAT, value_name = "format")]
    #[serde(default)]
    pub(crate) date_format: Option<String>,
    /// Identifier of the picture.
    #[arg(long = ARG_ID, value_name = "id")]
    #[serde(default)]
    pub(crate) id: Option<u64>,
}

/// CLI arguments for the `near` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Print pictures whose longitude and latitude each lie within \
                 the deviation of the given position, boundary included. The \
                 region is a square in degrees, not a circle.",
    about = "Print pictures around a position"
)]
#[ortho_config(prefix = "PICTUREDB")]
pub(crate) struct NearArgs {
    /// Path to the picture file.
    #[arg(long = ARG_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) db: Option<Utf8PathBuf>,
    /// Field delimiter of the picture file (default `;`).
    #[arg(long = ARG_DELIMITER, value_name = "char")]
    #[serde(default)]
    pub(crate) delimiter: Option<char>,
    /// `strftime` format of the date column.
    #[arg(long = ARG_DATE_FORMAT, value_name = "format")]
    #[serde(default)]
    pub(crate) date_format: Option<String>,
    /// Longitude of the centre in degrees.
    #[arg(long = ARG_LONGITUDE, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) longitude: Option<f64>,
    /// Latitude of the centre in degrees.
    #[arg(long = ARG_LATITUDE, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) latitude: Option<f64>,
    /// Maximum distance from the centre on each axis, in degrees.
    #[arg(long = ARG_DEVIATION, value_name = "degrees")]
    #[serde(default)]
    pub(crate) deviation: Option<f64>,
}

/// CLI arguments for the `insert` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Store a new picture and print it with its identifier")]
#[ortho_config(prefix = "PICTUREDB")]
pub(crate) struct InsertArgs {
    /// Path to the picture file.
    #[arg(long = ARG_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) db: Option<Utf8PathBuf>,
    /// Field delimiter of the picture file (default `;`).
    #[arg(long = ARG_DELIMITER, value_name = "char")]
    #[serde(default)]
    pub(crate) delimiter: Option<char>,
    /// `strftime` format of the date column.
    #[arg(long = ARG_DATE_FORMAT, value_name = "format")]
    #[serde(default)]
    pub(crate) date_format: Option<String>,
    /// When the picture was taken, in the configured date format.
    #[arg(long = ARG_DATE, value_name = "date")]
    #[serde(default)]
    pub(crate) date: Option<String>,
    /// Longitude in degrees.
    #[arg(long = ARG_LONGITUDE, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) longitude: Option<f64>,
    /// Latitude in degrees.
    #[arg(long = ARG_LATITUDE, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) latitude: Option<f64>,
    /// Caption of the picture.
    #[arg(long = ARG_TITLE, value_name = "text")]
    #[serde(default)]
    pub(crate) title: Option<String>,
    /// Where the image is stored.
    #[arg(long = ARG_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) url: Option<String>,
}

/// CLI arguments for the `update` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Change a stored picture. Only the fields given are \
                 replaced; the rest keep their stored values.",
    about = "Change a stored picture and print the result"
)]
#[ortho_config(prefix = "PICTUREDB")]
pub(crate) struct UpdateArgs {
    /// Path to the picture file.
    #[arg(long = ARG_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) db: Option<Utf8PathBuf>,
    /// Field delimiter of the picture file (default `;`).
    #[arg(long = ARG_DELIMITER, value_name = "char")]
    #[serde(default)]
    pub(crate) delimiter: Option<char>,
    /// `strftime` format of the date column.
    #[arg(long = ARG_DATE_FORMAT, value_name = "format")]
    #[serde(default)]
    pub(crate) date_format: Option<String>,
    /// Identifier of the picture to change.
    #[arg(long = ARG_ID, value_name = "id")]
    #[serde(default)]
    pub(crate) id: Option<u64>,
    /// New date, in the configured date format.
    #[arg(long = ARG_DATE, value_name = "date")]
    #[serde(default)]
    pub(crate) date: Option<String>,
    /// New longitude in degrees.
    #[arg(long = ARG_LONGITUDE, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) longitude: Option<f64>,
    /// New latitude in degrees.
    #[arg(long = ARG_LATITUDE, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) latitude: Option<f64>,
    /// New caption.
    #[arg(long = ARG_TITLE, value_name = "text")]
    #[serde(default)]
    pub(crate) title: Option<String>,
    /// New image location.
    #[arg(long = ARG_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) url: Option<String>,
}

/// CLI arguments for the `delete` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Remove a picture and print what was removed")]
#[ortho_config(prefix = "PICTUREDB")]
pub(crate) struct DeleteArgs {
    /// Path to the picture file.
    #[arg(long = ARG_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) db: Option<Utf8PathBuf>,
    /// Field delimiter of the picture file (default `;`).
    #[arg(long = ARG_DELIMITER, value_name = "char")]
    #[serde(default)]
    pub(crate) delimiter: Option<char>,
    /// `strftime` format of the date column.
    #[arg(long = ARG_DATE_FORMAT, value_name = "format")]
    #[serde(default)]
    pub(crate) date_format: Option<String>,
    /// Identifier of the picture to remove.
    #[arg(long = ARG_ID, value_name = "id")]
    #[serde(default)]
    pub(crate) id: Option<u64>,
}

/// Fields to overwrite on a stored picture.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PictureChanges {
    pub(crate) id: u64,
    pub(crate) date: Option<NaiveDateTime>,
    pub(crate) longitude: Option<f64>,
    pub(crate) latitude: Option<f64>,
    pub(crate) title: Option<String>,
    pub(crate) url: Option<Url>,
}

impl PictureChanges {
    fn apply_to(self, picture: &mut Picture) {
        if let Some(date) = self.date {
            picture.date = date;
        }
        if let Some(longitude) = self.longitude {
            picture.location.x = longitude;
        }
        if let Some(latitude) = self.latitude {
            picture.location.y = latitude;
        }
        if let Some(title) = self.title {
            picture.title = title;
        }
        if let Some(url) = self.url {
            picture.url = url;
        }
    }
}

/// Store operation requested on the command line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Operation {
    Count,
    List,
    Get {
        id: u64,
    },
    Near {
        longitude: f64,
        latitude: f64,
        deviation: f64,
    },
    Insert(Picture),
    Update(PictureChanges),
    Delete {
        id: u64,
    },
}

/// Fully resolved subcommand.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Invocation {
    pub(crate) store: StoreConfig,
    pub(crate) operation: Operation,
}

/// Merge `args` with configuration files and environment variables, then
/// resolve the result.
pub(crate) fn merged_invocation<A>(args: &A) -> Result<Invocation, CliError>
where
    A: SubcmdConfigMerge + Serialize + Default,
    Invocation: TryFrom<A, Error = CliError>,
{
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    Invocation::try_from(merged)
}

impl TryFrom<CountArgs> for Invocation {
    type Error = CliError;

    fn try_from(args: CountArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            store: StoreConfig::resolve(CMD_COUNT, args.db, args.delimiter, args.date_format)?,
            operation: Operation::Count,
        })
    }
}

impl TryFrom<ListArgs> for Invocation {
    type Error = CliError;

    fn try_from(args: ListArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            store: StoreConfig::resolve(CMD_LIST, args.db, args.delimiter, args.date_format)?,
            operation: Operation::List,
        })
    }
}

impl TryFrom<GetArgs> for Invocation {
    type Error = CliError;

    fn try_from(args: GetArgs) -> Result<Self, Self::Error> {
        let store = StoreConfig::resolve(CMD_GET, args.db, args.delimiter, args.date_format)?;
        let id = require(args.id, CMD_GET, ARG_ID)?;
        Ok(Self {
            store,
            operation: Operation::Get { id },
        })
    }
}

impl TryFrom<NearArgs> for Invocation {
    type Error = CliError;

    fn try_from(args: NearArgs) -> Result<Self, Self::Error> {
        let store = StoreConfig::resolve(CMD_NEAR, args.db, args.delimiter, args.date_format)?;
        let operation = Operation::Near {
            longitude: require(args.longitude, CMD_NEAR, ARG_LONGITUDE)?,
            latitude: require(args.latitude, CMD_NEAR, ARG_LATITUDE)?,
            deviation: require(args.deviation, CMD_NEAR, ARG_DEVIATION)?,
        };
        Ok(Self { store, operation })
    }
}

impl TryFrom<InsertArgs> for Invocation {
    type Error = CliError;

    fn try_from(args: InsertArgs) -> Result<Self, Self::Error> {
        let store = StoreConfig::resolve(CMD_INSERT, args.db, args.delimiter, args.date_format)?;
        let date = store.parse_date(&require(args.date, CMD_INSERT, ARG_DATE)?)?;
        let longitude = require(args.longitude, CMD_INSERT, ARG_LONGITUDE)?;
        let latitude = require(args.latitude, CMD_INSERT, ARG_LATITUDE)?;
        let title = require(args.title, CMD_INSERT, ARG_TITLE)?;
        let url = parse_url(&require(args.url, CMD_INSERT, ARG_URL)?)?;

        let picture = Picture::new(
            date,
            Coord {
                x: longitude,
                y: latitude,
            },
            title,
            url,
        );
        Ok(Self {
            store,
            operation: Operation::Insert(picture),
        })
    }
}

impl TryFrom<UpdateArgs> for Invocation {
    type Error = CliError;

    fn try_from(args: UpdateArgs) -> Result<Self, Self::Error> {
        let store = StoreConfig::resolve(CMD_UPDATE, args.db, args.delimiter, args.date_format)?;
        let id = require(args.id, CMD_UPDATE, ARG_ID)?;
        let date = args
            .date
            .map(|value| store.parse_date(&value))
            .transpose()?;
        let url = args.url.map(|value| parse_url(&value)).transpose()?;

        let changes = PictureChanges {
            id,
            date,
            longitude: args.longitude,
            latitude: args.latitude,
            title: args.title,
            url,
        };
        Ok(Self {
            store,
            operation: Operation::Update(changes),
        })
    }
}

impl TryFrom<DeleteArgs> for Invocation {
    type Error = CliError;

    fn try_from(args: DeleteArgs) -> Result<Self, Self::Error> {
        let store = StoreConfig::resolve(CMD_DELETE, args.db, args.delimiter, args.date_format)?;
        let id = require(args.id, CMD_DELETE, ARG_ID)?;
        Ok(Self {
            store,
            operation: Operation::Delete { id },
        })
    }
}

/// Run `operation` against `store` and write its result to `writer` as JSON.
pub(crate) fn execute(
    operation: Operation,
    store: &mut dyn PictureStore,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    match operation {
        Operation::Count => write_json(writer, &store.count()?),
        Operation::List => write_json(writer, &store.find_all()?),
        Operation::Get { id } => write_json(writer, &stored(store, id)?),
        Operation::Near {
            longitude,
            latitude,
            deviation,
        } => write_json(
            writer,
            &store.find_by_position(longitude, latitude, deviation)?,
        ),
        Operation::Insert(mut picture) => {
            store.insert(&mut picture)?;
            write_json(writer, &picture)
        }
        Operation::Update(changes) => {
            let mut picture = stored(store, changes.id)?;
            changes.apply_to(&mut picture);
            store.update(&picture)?;
            write_json(writer, &picture)
        }
        Operation::Delete { id } => {
            let picture = stored(store, id)?;
            store.delete(&picture)?;
            debug!("removed picture {id}");
            write_json(writer, &picture)
        }
    }
}

fn stored(store: &dyn PictureStore, id: u64) -> Result<Picture, CliError> {
    store
        .find_by_id(id)?
        .ok_or(CliError::Store(PictureStoreError::NotFound { id }))
}

fn write_json<T: Serialize + ?Sized>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}
