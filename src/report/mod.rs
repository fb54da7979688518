pub mod visualization;

use std::{fs, path::Path};

use serde::Serialize;

use crate::{Comparison, MatchConfig, MatchRegion, error::Result};

pub fn format_match_line(other: &str, comparison: &Comparison) -> String {
    let mut line = format!(
        "{:>7.1}% match with {:<20}",
        comparison.coverage * 100.0,
        other
    );

    for region in &comparison.regions {
        line.push_str("   ");
        line.push_str(&region.to_string());
    }

    line
}

#[derive(Serialize)]
pub struct JsonReport {
    pub config: MatchConfig,
    pub images: Vec<ImageReportSection>,
}

#[derive(Serialize)]
pub struct ImageReportSection {
    pub file: String,
    pub visualization: Option<String>,
    pub comparisons: Vec<PairReportSection>,
}

#[derive(Serialize)]
pub struct PairReportSection {
    pub other: String,
    pub coverage: f64,
    pub regions: Vec<MatchRegion>,
}

impl PairReportSection {
    pub fn new(other: &str, comparison: &Comparison) -> Self {
        Self {
            other: other.to_string(),
            coverage: comparison.coverage,
            regions: comparison.regions.clone(),
        }
    }
}

impl JsonReport {
    pub fn new(config: MatchConfig) -> Self {
        Self {
            config,
            images: Vec::new(),
        }
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
