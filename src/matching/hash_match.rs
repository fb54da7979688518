use std::time::Instant;

use log::{debug, trace};

use crate::{
    BoundingBox, Comparison, MatchRegion, Point,
    error::Result,
    image_utils::PixelSource,
    matching::{
        Matcher, check_compare_fraction, check_seed_size, check_table_size,
        seed::{Owner, Seed},
        seed_table::SeedTable,
    },
};

/// Seed matching through a shared content-hash table.
///
/// Seeds from both images go into one [`SeedTable`]; only the first
/// `floor(table_size * compare_fraction)` buckets are scanned, trading
/// recall for speed. Candidates sharing a bucket are confirmed by comparing
/// every value of the window, and all confirmed placements are folded into a
/// single bounding box per image.
pub struct HashMatcher {
    seed_size: u32,
    table_size: usize,
    compare_fraction: f64,
}

/// Seeds of one bucket with identical content, split by owner.
#[derive(Debug)]
struct ContentGroup<'a> {
    representative: &'a Seed,
    a: Vec<&'a Seed>,
    b: Vec<&'a Seed>,
}

impl<'a> ContentGroup<'a> {
    fn new(seed: &'a Seed) -> Self {
        let mut group = Self {
            representative: seed,
            a: Vec::new(),
            b: Vec::new(),
        };
        group.push(seed);
        group
    }

    fn push(&mut self, seed: &'a Seed) {
        match seed.owner {
            Owner::A => self.a.push(seed),
            Owner::B => self.b.push(seed),
        }
    }

    fn is_cross_image(&self) -> bool {
        !self.a.is_empty() && !self.b.is_empty()
    }

    fn confirmed_pairs(&self) -> usize {
        self.a.len() * self.b.len()
    }
}

#[derive(Debug, Default)]
struct MatchBounds {
    a: Option<BoundingBox>,
    b: Option<BoundingBox>,
}

impl MatchBounds {
    fn include(&mut self, seed: &Seed, size: u32) {
        let slot = match seed.owner {
            Owner::A => &mut self.a,
            Owner::B => &mut self.b,
        };
        slot.get_or_insert(BoundingBox::from_origin(seed.origin, size, size))
            .include_seed(seed.origin, size);
    }

    fn region(&self) -> Option<MatchRegion> {
        Some(MatchRegion { a: self.a?, b: self.b? })
    }
}

#[derive(Debug, Default)]
struct ScanOutcome {
    bounds: MatchBounds,
    highlights: Vec<Point>,
    confirmed_pairs: usize,
    buckets_scanned: usize,
}

impl HashMatcher {
    pub fn new(seed_size: u32, table_size: usize, compare_fraction: f64) -> Result<Self> {
        check_seed_size(seed_size)?;
        check_table_size(table_size)?;
        check_compare_fraction(compare_fraction)?;

        Ok(Self {
            seed_size,
            table_size,
            compare_fraction,
        })
    }

    pub fn build_table(&self, a: &dyn PixelSource, b: &dyn PixelSource) -> Result<SeedTable> {
        let mut table = SeedTable::new(self.table_size)?;
        let from_a = table.insert_image(a, self.seed_size, Owner::A);
        let from_b = table.insert_image(b, self.seed_size, Owner::B);

        debug!(
            "seed table: {} seeds from A, {} from B, {} distinct hashes",
            from_a,
            from_b,
            table.occupied_buckets()
        );

        Ok(table)
    }

    fn scan(&self, table: &SeedTable) -> ScanOutcome {
        let limit = table.scan_limit(self.compare_fraction);
        let mut outcome = ScanOutcome::default();

        for (hash, bucket) in table.buckets(limit) {
            outcome.buckets_scanned += 1;
            if bucket.len() < 2 {
                continue;
            }

            for group in confirmed_groups(bucket) {
                trace!(
                    "bucket {:#010x}: {} x {} confirmed placements",
                    hash,
                    group.a.len(),
                    group.b.len()
                );

                outcome.confirmed_pairs += group.confirmed_pairs();
                for seed in group.a.iter().chain(group.b.iter()) {
                    outcome.bounds.include(seed, self.seed_size);
                }
                outcome.highlights.extend(group.a.iter().map(|s| s.origin));
            }
        }

        outcome
    }
}

/// Partitions a bucket by exact content, keeping only groups that hold seeds
/// from both images. Every pair of an A seed and a B seed within a returned
/// group is a confirmed match.
fn confirmed_groups(bucket: &[Seed]) -> Vec<ContentGroup<'_>> {
    let mut groups: Vec<ContentGroup<'_>> = Vec::new();

    for seed in bucket {
        match groups.iter_mut().find(|g| g.representative.same_content(seed)) {
            Some(group) => group.push(seed),
            None => groups.push(ContentGroup::new(seed)),
        }
    }

    groups.retain(ContentGroup::is_cross_image);
    groups
}

impl Matcher for HashMatcher {
    fn compare(&self, a: &dyn PixelSource, b: &dyn PixelSource) -> Result<Comparison> {
        let start = Instant::now();
        let table = self.build_table(a, b)?;
        let outcome = self.scan(&table);

        debug!(
            "hash scan: {} of {} occupied buckets (limit {} of {}), {} confirmed pairs in {:.2?}",
            outcome.buckets_scanned,
            table.occupied_buckets(),
            table.scan_limit(self.compare_fraction),
            table.bucket_count(),
            outcome.confirmed_pairs,
            start.elapsed()
        );

        let Some(region) = outcome.bounds.region() else {
            return Ok(Comparison::none(self.seed_size));
        };

        Ok(Comparison::from_region(a, region, outcome.highlights, self.seed_size))
    }

    fn name(&self) -> &str {
        "hashtable"
    }

    fn description(&self) -> &str {
        "Content-hash table over all seed blocks with fractional bucket scanning"
    }
}

#[cfg(test)]
mod tests {
    use image::{GrayImage, Luma};

    use super::*;

    fn gradient(width: u32, height: u32, offset: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| Luma([((x * 7 + y * 13 + offset) % 251) as u8]))
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(HashMatcher::new(0, 100, 0.5).is_err());
        assert!(HashMatcher::new(3, 0, 0.5).is_err());
        assert!(HashMatcher::new(3, 100, 0.0).is_err());
        assert!(HashMatcher::new(3, 100, 1.01).is_err());
        assert!(HashMatcher::new(3, 100, 1.0).is_ok());
    }

    #[test]
    fn test_identical_uniform_images_fully_covered() {
        let image = GrayImage::from_pixel(8, 8, Luma([42]));

        for size in 1..=8 {
            let matcher = HashMatcher::new(size, 1_000_000, 0.05).unwrap();
            let result = matcher.compare(&image, &image).unwrap();

            assert!((result.coverage - 1.0).abs() < 1e-12, "seed size {}", size);
            assert_eq!(result.regions.len(), 1);
            let region = result.regions[0];
            assert_eq!(region.a, BoundingBox::new(Point::new(0, 0), Point::new(8, 8)));
            assert_eq!(region.b, region.a);
        }
    }

    #[test]
    fn test_disjoint_content_has_no_region() {
        let a = GrayImage::from_pixel(8, 8, Luma([10]));
        let b = GrayImage::from_pixel(8, 8, Luma([20]));
        let matcher = HashMatcher::new(3, 1000, 1.0).unwrap();

        let result = matcher.compare(&a, &b).unwrap();
        assert_eq!(result.coverage, 0.0);
        assert!(result.regions.is_empty());
        assert!(result.highlights.is_empty());
    }

    #[test]
    fn test_seed_larger_than_image_has_no_region() {
        let a = GrayImage::from_pixel(4, 4, Luma([1]));
        let matcher = HashMatcher::new(5, 1000, 1.0).unwrap();

        let result = matcher.compare(&a, &a).unwrap();
        assert!(!result.is_match());
    }

    #[test]
    fn test_pasted_patch_is_located_in_both_images() {
        // Every pixel of `a` is distinct, so each window occurs once.
        let a = GrayImage::from_fn(14, 14, |x, y| Luma([(x + 14 * y) as u8]));
        let mut b = GrayImage::from_pixel(16, 16, Luma([255]));
        for y in 0..6 {
            for x in 0..6 {
                b.put_pixel(9 + x, 2 + y, *a.get_pixel(4 + x, 5 + y));
            }
        }

        let matcher = HashMatcher::new(3, 1_000_000, 1.0).unwrap();
        let result = matcher.compare(&a, &b).unwrap();

        assert_eq!(result.regions.len(), 1);
        let region = result.regions[0];
        assert_eq!(region.a, BoundingBox::new(Point::new(4, 5), Point::new(10, 11)));
        assert_eq!(region.b, BoundingBox::new(Point::new(9, 2), Point::new(15, 8)));
        assert_eq!(result.highlights.len(), 16);
        assert!((result.coverage - 36.0 / 196.0).abs() < 1e-12);
    }

    #[test]
    fn test_coverage_uses_first_image_area() {
        let small = GrayImage::from_pixel(4, 4, Luma([3]));
        let large = GrayImage::from_pixel(8, 8, Luma([3]));
        let matcher = HashMatcher::new(2, 1000, 1.0).unwrap();

        let small_vs_large = matcher.compare(&small, &large).unwrap();
        let large_vs_small = matcher.compare(&large, &small).unwrap();

        assert!((small_vs_large.coverage - 1.0).abs() < 1e-12);
        assert!((large_vs_small.coverage - 1.0).abs() < 1e-12);
        assert_eq!(small_vs_large.regions[0].b.area(), 64);
        assert_eq!(large_vs_small.regions[0].b.area(), 16);
    }

    #[test]
    fn test_larger_fraction_never_loses_matches() {
        let a = gradient(24, 24, 0);
        let b = gradient(24, 24, 0);

        let narrow = HashMatcher::new(3, 2000, 0.05).unwrap().compare(&a, &b).unwrap();
        let full = HashMatcher::new(3, 2000, 1.0).unwrap().compare(&a, &b).unwrap();

        assert!(full.highlights.len() >= narrow.highlights.len());
        for p in &narrow.highlights {
            assert!(full.highlights.contains(p));
        }
        if let Some(region) = narrow.regions.first() {
            let full_a = full.regions[0].a;
            assert!(full_a.min.x <= region.a.min.x && full_a.min.y <= region.a.min.y);
            assert!(full_a.max.x >= region.a.max.x && full_a.max.y >= region.a.max.y);
        }
    }

    #[test]
    fn test_small_fraction_scans_fewer_buckets() {
        let a = gradient(24, 24, 0);
        let matcher = HashMatcher::new(3, 100, 0.05).unwrap();

        let table = matcher.build_table(&a, &a).unwrap();
        let outcome = matcher.scan(&table);
        assert_eq!(outcome.buckets_scanned, 5);
        assert!(outcome.highlights.len() < 22 * 22);
    }

    #[test]
    fn test_confirmation_rejects_colliding_content() {
        // Forged bucket: same slot, different content.
        let bucket = vec![
            Seed::new(Point::new(0, 0), vec![1, 2, 3, 4], Owner::A),
            Seed::new(Point::new(1, 0), vec![1, 2, 3, 5], Owner::B),
            Seed::new(Point::new(2, 0), vec![9, 2, 3, 4], Owner::B),
        ];

        assert!(confirmed_groups(&bucket).is_empty());
    }

    #[test]
    fn test_confirmation_pairs_every_cross_image_entry() {
        let bucket = vec![
            Seed::new(Point::new(0, 0), vec![5; 4], Owner::A),
            Seed::new(Point::new(3, 3), vec![6; 4], Owner::A),
            Seed::new(Point::new(1, 0), vec![5; 4], Owner::A),
            Seed::new(Point::new(7, 2), vec![5; 4], Owner::B),
            Seed::new(Point::new(8, 2), vec![6; 4], Owner::B),
        ];

        let groups = confirmed_groups(&bucket);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].confirmed_pairs(), 2);
        assert_eq!(groups[1].confirmed_pairs(), 1);
    }

    #[test]
    fn test_same_image_duplicates_are_not_matches() {
        let bucket = vec![
            Seed::new(Point::new(0, 0), vec![5; 4], Owner::A),
            Seed::new(Point::new(4, 4), vec![5; 4], Owner::A),
        ];

        assert!(confirmed_groups(&bucket).is_empty());
    }

    #[test]
    fn test_boxes_are_well_formed() {
        let a = gradient(16, 12, 3);
        let b = gradient(12, 16, 3);
        let result = HashMatcher::new(2, 10_000, 1.0).unwrap().compare(&a, &b).unwrap();

        for region in &result.regions {
            assert!(region.a.min.x <= region.a.max.x && region.a.min.y <= region.a.max.y);
            assert!(region.b.min.x <= region.b.max.x && region.b.min.y <= region.b.max.y);
        }
        assert!(result.coverage >= 0.0 && result.coverage <= 1.0);
    }
}
