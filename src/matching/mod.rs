pub mod brute_force;
pub mod hash_match;
pub mod seed;
pub mod seed_table;

use crate::{
    Comparison,
    error::{DupeError, Result},
    image_utils::PixelSource,
};

/// A duplicate-region search between two images.
///
/// Coverage in the returned [`Comparison`] is always relative to `a`.
pub trait Matcher {
    fn compare(&self, a: &dyn PixelSource, b: &dyn PixelSource) -> Result<Comparison>;

    fn name(&self) -> &str;

    fn description(&self) -> &str;
}

pub(crate) fn check_seed_size(seed_size: u32) -> Result<()> {
    if seed_size < 1 {
        return Err(DupeError::InvalidParameter(
            "Seed size must be at least 1".into()
        ));
    }
    Ok(())
}

pub(crate) fn check_table_size(table_size: usize) -> Result<()> {
    if table_size < 1 {
        return Err(DupeError::InvalidParameter(
            "Table size must be at least 1".into()
        ));
    }
    Ok(())
}

pub(crate) fn check_compare_fraction(compare_fraction: f64) -> Result<()> {
    if !(compare_fraction > 0.0 && compare_fraction <= 1.0) {
        return Err(DupeError::InvalidParameter(format!(
            "Compare fraction must be in (0, 1], got {}",
            compare_fraction
        )));
    }
    Ok(())
}
