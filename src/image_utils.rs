use std::path::Path;

use image::{GrayImage, Luma, RgbImage};

use crate::error::Result;

/// Read-only pixel lookup used by the matching engines.
///
/// Pixels are opaque integers: two pixels are duplicates iff their values
/// are equal. Coordinates are always in bounds when called by this crate.
pub trait PixelSource {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn pixel(&self, x: u32, y: u32) -> u32;
}

impl PixelSource for RgbImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn pixel(&self, x: u32, y: u32) -> u32 {
        let p = self.get_pixel(x, y);
        pack_rgb(p[0], p[1], p[2])
    }
}

impl PixelSource for GrayImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn pixel(&self, x: u32, y: u32) -> u32 {
        self.get_pixel(x, y)[0] as u32
    }
}

pub fn load_rgb<P: AsRef<Path>>(path: P) -> Result<RgbImage> {
    Ok(image::open(path)?.to_rgb8())
}

pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

pub fn rgb_to_gray(image: &RgbImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut gray = GrayImage::new(width, height);

    for (x, y, pixel) in image.enumerate_pixels() {
        let lum =
            (0.299 * pixel[0] as f64 + 0.587 * pixel[1] as f64 + 0.114 * pixel[2] as f64) as u8;
        gray.put_pixel(x, y, Luma([lum]));
    }

    gray
}

pub fn origin_count(extent: u32, size: u32) -> u32 {
    if size == 0 || size > extent {
        0
    } else {
        extent - size + 1
    }
}

pub fn extract_block<I: PixelSource + ?Sized>(image: &I, x: u32, y: u32, size: u32) -> Vec<u32> {
    let mut block = Vec::with_capacity((size * size) as usize);

    for dy in 0..size {
        for dx in 0..size {
            block.push(image.pixel(x + dx, y + dy));
        }
    }

    block
}

pub fn windows_match<A, B>(a: &A, (ax, ay): (u32, u32), b: &B, (bx, by): (u32, u32), size: u32) -> bool
where
    A: PixelSource + ?Sized,
    B: PixelSource + ?Sized,
{
    (0..size).all(|dy| (0..size).all(|dx| a.pixel(ax + dx, ay + dy) == b.pixel(bx + dx, by + dy)))
}
