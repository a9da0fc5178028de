//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = picturedb_cli::run() {
        eprintln!("picturedb: {err}");
        std::process::exit(1);
    }
}
