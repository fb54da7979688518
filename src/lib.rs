use std::fmt;

use serde::Serialize;

use crate::{
    error::Result,
    image_utils::PixelSource,
    matching::{Matcher, brute_force::BruteForceMatcher, hash_match::HashMatcher},
};

pub mod error;
pub mod image_utils;
pub mod matching;
pub mod report;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMethod {
    Simple,
    Hashtable,
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMethod::Simple => write!(f, "simple"),
            MatchMethod::Hashtable => write!(f, "hashtable"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchConfig {
    pub method: MatchMethod,
    pub seed_size: u32,
    pub table_size: usize,
    pub compare_fraction: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            method: MatchMethod::Simple,
            seed_size: 5,
            table_size: 1_000_000,
            compare_fraction: 0.05,
        }
    }
}

impl MatchConfig {
    /// Checks every parameter regardless of method, so an unused bad value
    /// is still rejected.
    pub fn validate(&self) -> Result<()> {
        HashMatcher::new(self.seed_size, self.table_size, self.compare_fraction)?;
        Ok(())
    }
}

pub struct DuplicateFinder {
    matcher: Box<dyn Matcher>,
}

impl DuplicateFinder {
    pub fn new(config: MatchConfig) -> Result<Self> {
        config.validate()?;

        let matcher: Box<dyn Matcher> = match config.method {
            MatchMethod::Simple => Box::new(BruteForceMatcher::new(config.seed_size)?),
            MatchMethod::Hashtable => Box::new(HashMatcher::new(
                config.seed_size,
                config.table_size,
                config.compare_fraction,
            )?),
        };

        Ok(Self { matcher })
    }

    pub fn method_name(&self) -> &str {
        self.matcher.name()
    }

    pub fn method_description(&self) -> &str {
        self.matcher.description()
    }

    pub fn compare<A, B>(&self, a: &A, b: &B) -> Result<Comparison>
    where
        A: PixelSource,
        B: PixelSource,
    {
        self.matcher.compare(a, b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Axis-aligned box; `max` is exclusive, so a single seed at `p` spans
/// `p..p + size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    pub fn new(min: Point, max: Point) -> Self {
        debug_assert!(min.x <= max.x && min.y <= max.y);
        Self { min, max }
    }

    pub fn from_origin(origin: Point, width: u32, height: u32) -> Self {
        Self::new(origin, Point::new(origin.x + width, origin.y + height))
    }

    pub fn include_seed(&mut self, origin: Point, size: u32) {
        self.min.x = self.min.x.min(origin.x);
        self.min.y = self.min.y.min(origin.y);
        self.max.x = self.max.x.max(origin.x + size);
        self.max.y = self.max.y.max(origin.y + size);
    }

    pub fn width(&self) -> u32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> u32 {
        self.max.y - self.min.y
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchRegion {
    pub a: BoundingBox,
    pub b: BoundingBox,
}

impl fmt::Display for MatchRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} similar to {}", self.a, self.b)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    /// Area of the region in image A over the area of image A.
    pub coverage: f64,
    pub regions: Vec<MatchRegion>,
    /// Origins of matched seed windows in image A.
    #[serde(skip)]
    pub highlights: Vec<Point>,
    pub seed_size: u32,
}

impl Comparison {
    pub fn none(seed_size: u32) -> Self {
        Self {
            coverage: 0.0,
            regions: Vec::new(),
            highlights: Vec::new(),
            seed_size,
        }
    }

    pub fn from_region<A: PixelSource + ?Sized>(
        a: &A,
        region: MatchRegion,
        highlights: Vec<Point>,
        seed_size: u32,
    ) -> Self {
        Self {
            coverage: coverage_of(&region.a, a),
            regions: vec![region],
            highlights,
            seed_size,
        }
    }

    pub fn is_match(&self) -> bool {
        !self.regions.is_empty()
    }
}

pub fn coverage_of<A: PixelSource + ?Sized>(bbox: &BoundingBox, a: &A) -> f64 {
    let total = a.width() as u64 * a.height() as u64;
    if total == 0 {
        return 0.0;
    }
    (bbox.area() as f64 / total as f64).clamp(0.0, 1.0)
}
