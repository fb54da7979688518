//! block-dupe - CLI entry point
//!
//! Parses arguments, sets up logging and hands off to the run loop.

mod cli;

use anyhow::Result;
use cli::Args;
use env_logger::{Builder, Env};

fn main() -> Result<()> {
    let args = Args::parse_normalized();

    Builder::from_env(Env::default().default_filter_or(&args.log_level)).init();

    cli::run(&args)
}
