use std::time::Instant;

use log::debug;

use crate::{
    BoundingBox, Comparison, MatchRegion, Point,
    error::Result,
    image_utils::{PixelSource, origin_count, windows_match},
    matching::{Matcher, check_seed_size},
};

/// Exhaustive seed search followed by greedy growth.
///
/// The first literal `seed_size` window match, in x-then-y order of image A
/// and then of image B, is grown to the right until a column differs or an
/// edge is reached, then downward using the widened row. This may
/// under-report the largest duplicated rectangle.
pub struct BruteForceMatcher {
    seed_size: u32,
}

impl BruteForceMatcher {
    pub fn new(seed_size: u32) -> Result<Self> {
        check_seed_size(seed_size)?;

        Ok(Self { seed_size })
    }

    pub fn find_seed(&self, a: &dyn PixelSource, b: &dyn PixelSource) -> Option<(Point, Point)> {
        let size = self.seed_size;
        let (a_cols, a_rows) = (origin_count(a.width(), size), origin_count(a.height(), size));
        let (b_cols, b_rows) = (origin_count(b.width(), size), origin_count(b.height(), size));

        for i in 0..a_cols {
            for j in 0..a_rows {
                for i2 in 0..b_cols {
                    for j2 in 0..b_rows {
                        if windows_match(a, (i, j), b, (i2, j2), size) {
                            return Some((Point::new(i, j), Point::new(i2, j2)));
                        }
                    }
                }
            }
        }

        None
    }

    /// Width first, then height. Returns the grown `(width, height)`.
    pub fn grow(&self, a: &dyn PixelSource, b: &dyn PixelSource, pa: Point, pb: Point) -> (u32, u32) {
        let mut width = self.seed_size;
        let mut height = self.seed_size;

        let max_width = (a.width() - pa.x).min(b.width() - pb.x);
        while width < max_width
            && (0..height).all(|dy| a.pixel(pa.x + width, pa.y + dy) == b.pixel(pb.x + width, pb.y + dy))
        {
            width += 1;
        }

        let max_height = (a.height() - pa.y).min(b.height() - pb.y);
        while height < max_height
            && (0..width).all(|dx| a.pixel(pa.x + dx, pa.y + height) == b.pixel(pb.x + dx, pb.y + height))
        {
            height += 1;
        }

        (width, height)
    }
}

impl Matcher for BruteForceMatcher {
    fn compare(&self, a: &dyn PixelSource, b: &dyn PixelSource) -> Result<Comparison> {
        let start = Instant::now();

        let Some((pa, pb)) = self.find_seed(a, b) else {
            debug!("brute force: no seed match in {:.2?}", start.elapsed());
            return Ok(Comparison::none(self.seed_size));
        };

        let (width, height) = self.grow(a, b, pa, pb);
        debug!(
            "brute force: seed {} ~ {}, grown to {}x{} in {:.2?}",
            pa,
            pb,
            width,
            height,
            start.elapsed()
        );

        let region = MatchRegion {
            a: BoundingBox::from_origin(pa, width, height),
            b: BoundingBox::from_origin(pb, width, height),
        };

        Ok(Comparison::from_region(a, region, vec![pa], self.seed_size))
    }

    fn name(&self) -> &str {
        "simple"
    }

    fn description(&self) -> &str {
        "Exhaustive seed search with greedy width-then-height growth"
    }
}
