//! Command-line argument definitions

use std::{ffi::OsString, path::PathBuf};

use block_dupe::{MatchConfig, MatchMethod};
use clap::{Parser, ValueEnum};

/// Single-dash spellings accepted in addition to the `--` forms.
const SINGLE_DASH_FLAGS: [&str; 4] = ["-method", "-seed", "-table", "-compare"];

/// Find duplicated rectangular regions between images
#[derive(Parser, Debug)]
#[command(name = "block-dupe")]
#[command(version)]
#[command(about = "Find duplicated rectangular regions between images", long_about = None)]
pub struct Args {
    /// Matching method
    #[arg(long, value_enum, default_value_t = MethodArg::Simple)]
    pub method: MethodArg,

    /// Side length of the seed block in pixels
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
    pub seed: u32,

    /// Target bucket count of the hash table
    #[arg(long, default_value_t = 1_000_000, value_parser = clap::value_parser!(u64).range(1..))]
    pub table: u64,

    /// Fraction of hash buckets to scan, in (0, 1]
    #[arg(long, default_value_t = 0.05, value_parser = parse_fraction)]
    pub compare: f64,

    /// Directory for the output_<name>.ppm visualizations
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Write a JSON report of every comparison to this file
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace (RUST_LOG takes precedence)
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Input images
    #[arg(required = true, value_name = "IMAGE")]
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodArg {
    Simple,
    Hashtable,
}

impl From<MethodArg> for MatchMethod {
    fn from(method: MethodArg) -> Self {
        match method {
            MethodArg::Simple => MatchMethod::Simple,
            MethodArg::Hashtable => MatchMethod::Hashtable,
        }
    }
}

impl Args {
    /// Parses the process arguments, accepting `-seed 5` as well as `--seed 5`.
    pub fn parse_normalized() -> Self {
        Self::parse_from(normalize_flags(std::env::args_os()))
    }

    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            method: self.method.into(),
            seed_size: self.seed,
            table_size: self.table as usize,
            compare_fraction: self.compare,
        }
    }
}

pub fn normalize_flags<I: IntoIterator<Item = OsString>>(args: I) -> Vec<OsString> {
    args.into_iter()
        .map(|arg| match arg.to_str() {
            Some(s) if SINGLE_DASH_FLAGS.contains(&s) => OsString::from(format!("-{}", s)),
            _ => arg,
        })
        .collect()
}

fn parse_fraction(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a number", s))?;
    if value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(format!("{} is not in (0, 1]", value))
    }
}
