use serde::Serialize;

use crate::{Point, image_utils::{PixelSource, extract_block}};

const SEED_HASH_INIT: u32 = 1_315_423_911;

/// Identity of the image a seed was sampled from, within one comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Owner {
    A,
    B,
}

/// A square window of pixel values sampled from one image.
///
/// Equality covers owner, origin and content; the hash covers content only,
/// so the same window found in both images lands in the same bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seed {
    pub origin: Point,
    pub values: Vec<u32>,
    pub owner: Owner,
}

impl Seed {
    pub fn new(origin: Point, values: Vec<u32>, owner: Owner) -> Self {
        Self { origin, values, owner }
    }

    pub fn sample<I: PixelSource + ?Sized>(image: &I, origin: Point, size: u32, owner: Owner) -> Self {
        let values = extract_block(image, origin.x, origin.y, size);
        Self::new(origin, values, owner)
    }

    pub fn content_hash(&self) -> u32 {
        seed_hash(&self.values)
    }

    pub fn same_content(&self, other: &Seed) -> bool {
        self.values.len() == other.values.len()
            && self.values.iter().zip(other.values.iter()).all(|(a, b)| a == b)
    }
}

pub fn seed_hash(values: &[u32]) -> u32 {
    values.iter().fold(SEED_HASH_INIT, |h, &v| {
        h ^ (h << 5).wrapping_add(v).wrapping_add(h >> 2)
    })
}
