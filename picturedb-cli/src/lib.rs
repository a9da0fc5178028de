//! Command-line interface for the PictureDB record store.
#![forbid(unsafe_code)]

use std::io::Write;

use clap::{Parser, Subcommand};
use log::debug;
use picturedb_core::FilePictureStore;

mod commands;
mod config;
mod error;

use commands::{
    CountArgs, DeleteArgs, GetArgs, InsertArgs, Invocation, ListArgs, NearArgs, UpdateArgs,
    execute, merged_invocation,
};
pub use error::CliError;

const ENV_PREFIX: &str = "PICTUREDB";

const CMD_COUNT: &str = "count";
const CMD_LIST: &str = "list";
const CMD_GET: &str = "get";
const CMD_NEAR: &str = "near";
const CMD_INSERT: &str = "insert";
const CMD_UPDATE: &str = "update";
const CMD_DELETE: &str = "delete";

const ARG_DB: &str = "db";
const ARG_DELIMITER: &str = "delimiter";
const ARG_DATE_FORMAT: &str = "date-format";
const ARG_ID: &str = "id";
const ARG_DATE: &str = "date";
const ARG_LONGITUDE: &str = "longitude";
const ARG_LATITUDE: &str = "latitude";
const ARG_DEVIATION: &str = "deviation";
const ARG_TITLE: &str = "title";
const ARG_URL: &str = "url";

/// Run the PictureDB CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => return Err(CliError::ArgumentParsing(err)),
    };
    let mut stdout = std::io::stdout().lock();
    run_with(cli, &mut stdout)
}

fn run_with(cli: Cli, writer: &mut dyn Write) -> Result<(), CliError> {
    let invocation = match cli.command {
        Command::Count(args) => merged_invocation(&args)?,
        Command::List(args) => merged_invocation(&args)?,
        Command::Get(args) => merged_invocation(&args)?,
        Command::Near(args) => merged_invocation(&args)?,
        Command::Insert(args) => merged_invocation(&args)?,
        Command::Update(args) => merged_invocation(&args)?,
        Command::Delete(args) => merged_invocation(&args)?,
    };
    run_invocation(invocation, writer)
}

fn run_invocation(invocation: Invocation, writer: &mut dyn Write) -> Result<(), CliError> {
    let Invocation { store, operation } = invocation;
    debug!("opening picture store {}", store.db);
    let mut pictures = FilePictureStore::open_with_dialect(&store.db, store.dialect)?;
    execute(operation, &mut pictures, writer)
}

#[derive(Debug, Parser)]
#[command(
    name = "picturedb",
    about = "Query and edit a CSV picture store",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the number of stored pictures.
    Count(CountArgs),
    /// Print every readable picture as JSON.
    List(ListArgs),
    /// Print the picture with the given identifier.
    Get(GetArgs),
    /// Print pictures around a position.
    Near(NearArgs),
    /// Store a new picture and print it with its identifier.
    Insert(InsertArgs),
    /// Change a stored picture and print the result.
    Update(UpdateArgs),
    /// Remove a picture and print what was removed.
    Delete(DeleteArgs),
}

#[cfg(test)]
mod tests;
