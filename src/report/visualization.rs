use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use image::{Rgb, RgbImage};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};

use crate::{
    BoundingBox, Point,
    error::{DupeError, Result},
    image_utils::rgb_to_gray,
};

const PALETTE: [Rgb<u8>; 8] = [
    Rgb([255, 0, 0]),
    Rgb([0, 200, 0]),
    Rgb([0, 80, 255]),
    Rgb([255, 200, 0]),
    Rgb([255, 0, 255]),
    Rgb([0, 220, 220]),
    Rgb([255, 128, 0]),
    Rgb([128, 0, 255]),
];

#[derive(Debug, Clone)]
pub struct VisualizationConfig {
    pub highlight_opacity: f32,
    pub border_thickness: u32,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            highlight_opacity: 0.5,
            border_thickness: 1,
        }
    }
}

pub struct Visualizer {
    config: VisualizationConfig,
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Visualizer {
    pub fn new() -> Self {
        Self { config: VisualizationConfig::default() }
    }

    pub fn with_config(config: VisualizationConfig) -> Self {
        Self { config }
    }

    pub fn color(index: usize) -> Rgb<u8> {
        if index < PALETTE.len() {
            return PALETTE[index];
        }
        Rgb([
            ((index * 50) % 255) as u8,
            ((index * 80 + 100) % 255) as u8,
            ((index * 120 + 50) % 255) as u8,
        ])
    }

    pub fn initialize_output(&self, image: &RgbImage) -> RgbImage {
        let gray = rgb_to_gray(image);
        RgbImage::from_fn(image.width(), image.height(), |x, y| {
            let v = gray.get_pixel(x, y)[0];
            Rgb([v, v, v])
        })
    }

    /// Tints the `size * size` window at `origin`, clipped to the canvas.
    pub fn highlight_seed(&self, canvas: &mut RgbImage, color_index: usize, origin: Point, size: u32) {
        let color = Self::color(color_index);
        let alpha = self.config.highlight_opacity.clamp(0.0, 1.0);
        let x_end = origin.x.saturating_add(size).min(canvas.width());
        let y_end = origin.y.saturating_add(size).min(canvas.height());

        for y in origin.y..y_end {
            for x in origin.x..x_end {
                let p = canvas.get_pixel_mut(x, y);
                for c in 0..3 {
                    p[c] = ((1.0 - alpha) * p[c] as f32 + alpha * color[c] as f32) as u8;
                }
            }
        }
    }

    pub fn draw_bounding_box(&self, canvas: &mut RgbImage, bbox: &BoundingBox, color_index: usize) {
        let color = Self::color(color_index);

        for inset in 0..self.config.border_thickness {
            let width = bbox.width().saturating_sub(2 * inset);
            let height = bbox.height().saturating_sub(2 * inset);
            if width == 0 || height == 0 {
                break;
            }

            let rect = Rect::at((bbox.min.x + inset) as i32, (bbox.min.y + inset) as i32)
                .of_size(width, height);
            draw_hollow_rect_mut(canvas, rect, color);
        }
    }

    pub fn output_path<P: AsRef<Path>, D: AsRef<Path>>(input: P, output_dir: D) -> PathBuf {
        let stem = input
            .as_ref()
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        output_dir.as_ref().join(format!("output_{}.ppm", stem))
    }

    /// Output paths for every input; two inputs sharing a file stem would
    /// overwrite each other's visualization and are rejected.
    pub fn output_paths<P: AsRef<Path>, D: AsRef<Path>>(inputs: &[P], output_dir: D) -> Result<Vec<PathBuf>> {
        let mut seen = HashSet::new();
        let mut paths = Vec::with_capacity(inputs.len());

        for input in inputs {
            let path = Self::output_path(input, output_dir.as_ref());
            if !seen.insert(path.clone()) {
                return Err(DupeError::InvalidParameter(format!(
                    "'{}' would overwrite the visualization of an earlier input ({})",
                    input.as_ref().display(),
                    path.display()
                )));
            }
            paths.push(path);
        }

        Ok(paths)
    }

    pub fn save<P: AsRef<Path>>(&self, canvas: &RgbImage, path: P) -> Result<()> {
        canvas.save(path)?;
        Ok(())
    }
}
