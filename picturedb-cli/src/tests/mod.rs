//! Shared test harness modules for the PictureDB CLI.

use super::*;

mod execute;
mod unit;
