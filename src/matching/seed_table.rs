use std::collections::BTreeMap;

use crate::{
    Point,
    error::Result,
    image_utils::{PixelSource, origin_count},
    matching::{
        check_table_size,
        seed::{Owner, Seed},
    },
};

/// Multi-entry index from content hash to the seeds sharing it.
///
/// Buckets are kept in ascending hash order and entries within a bucket in
/// insertion order, so scanning a prefix of the table is deterministic.
pub struct SeedTable {
    bucket_count: usize,
    buckets: BTreeMap<u32, Vec<Seed>>,
    len: usize,
}

impl SeedTable {
    pub fn new(bucket_count: usize) -> Result<Self> {
        check_table_size(bucket_count)?;

        Ok(Self {
            bucket_count,
            buckets: BTreeMap::new(),
            len: 0,
        })
    }

    pub fn insert(&mut self, seed: Seed) {
        self.buckets.entry(seed.content_hash()).or_default().push(seed);
        self.len += 1;
    }

    /// Inserts every `size * size` window of `image`, x outer and y inner.
    pub fn insert_image<I: PixelSource + ?Sized>(&mut self, image: &I, size: u32, owner: Owner) -> usize {
        let cols = origin_count(image.width(), size);
        let rows = origin_count(image.height(), size);

        for x in 0..cols {
            for y in 0..rows {
                self.insert(Seed::sample(image, Point::new(x, y), size, owner));
            }
        }

        cols as usize * rows as usize
    }

    pub fn bucket(&self, hash: u32) -> &[Seed] {
        self.buckets.get(&hash).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn scan_limit(&self, fraction: f64) -> usize {
        (self.bucket_count as f64 * fraction).floor() as usize
    }

    pub fn buckets(&self, limit: usize) -> impl Iterator<Item = (u32, &[Seed])> {
        self.buckets
            .iter()
            .take(limit)
            .map(|(&hash, seeds)| (hash, seeds.as_slice()))
    }

    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    pub fn occupied_buckets(&self) -> usize {
        self.buckets.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
