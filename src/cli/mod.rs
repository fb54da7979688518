//! CLI run loop: compare every input image against every other one.

mod args;

pub use args::Args;

use std::{
    fs,
    io::{self, Write},
};

use anyhow::{Context, Result};
use block_dupe::{
    DuplicateFinder,
    image_utils::load_rgb,
    report::{
        ImageReportSection, JsonReport, PairReportSection, format_match_line,
        visualization::Visualizer,
    },
};
use image::RgbImage;
use log::info;

pub fn run(args: &Args) -> Result<()> {
    let stdout = io::stdout();
    run_with_output(args, &mut stdout.lock())
}

/// Nothing is written to `out` or to disk until every input has loaded.
pub fn run_with_output<W: Write>(args: &Args, out: &mut W) -> Result<()> {
    let config = args.match_config();
    let finder = DuplicateFinder::new(config.clone())?;
    let visualizer = Visualizer::new();

    info!("{}", finder.method_description());
    info!(
        "method={} seed={} table={} compare={}",
        finder.method_name(),
        config.seed_size,
        config.table_size,
        config.compare_fraction
    );

    let outputs = Visualizer::output_paths(&args.files, &args.output_dir)?;

    let images = args
        .files
        .iter()
        .map(|file| load_rgb(file).with_context(|| format!("Failed to load image '{}'", file)))
        .collect::<Result<Vec<RgbImage>>>()?;

    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Failed to create '{}'", args.output_dir.display()))?;

    let mut report = JsonReport::new(config);

    for (a, ((file_a, image_a), output)) in args.files.iter().zip(&images).zip(&outputs).enumerate() {
        writeln!(out, "{}", file_a)?;

        let mut canvas = visualizer.initialize_output(image_a);
        let mut section = ImageReportSection {
            file: file_a.clone(),
            visualization: None,
            comparisons: Vec::new(),
        };

        let others = args
            .files
            .iter()
            .zip(&images)
            .enumerate()
            .filter(|&(b, _)| b != a)
            .map(|(_, other)| other);

        for (color, (file_b, image_b)) in others.enumerate() {
            info!("comparing {} with {}", file_a, file_b);
            let comparison = finder.compare(image_a, image_b)?;

            writeln!(out, "{}", format_match_line(file_b, &comparison))?;

            for &origin in &comparison.highlights {
                visualizer.highlight_seed(&mut canvas, color, origin, comparison.seed_size);
            }
            for region in &comparison.regions {
                visualizer.draw_bounding_box(&mut canvas, &region.a, color);
            }

            section.comparisons.push(PairReportSection::new(file_b, &comparison));
        }

        visualizer
            .save(&canvas, output)
            .with_context(|| format!("Failed to save '{}'", output.display()))?;
        info!("wrote {}", output.display());

        section.visualization = Some(output.display().to_string());
        report.images.push(section);
    }

    if let Some(ref path) = args.json {
        report
            .save(path)
            .with_context(|| format!("Failed to write report '{}'", path.display()))?;
        info!("wrote report {}", path.display());
    }

    Ok(())
}
