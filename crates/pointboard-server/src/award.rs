//! The random point source behind each claim.

use rand::Rng;

/// Smallest award a claim can draw.
pub const MIN_AWARD: i64 = 1;
/// Largest award a claim can draw.
pub const MAX_AWARD: i64 = 10;

/// Source of the random value awarded on a claim.
///
/// A trait seam so the generator is an injected collaborator: production
/// draws uniformly from `[MIN_AWARD, MAX_AWARD]`, tests inject fixed
/// sequences.  The service rejects any draw outside the range before
/// mutating.
pub trait PointSource: Send + Sync {
    fn draw(&self) -> i64;
}

/// Uniform draw from the thread-local RNG.
pub struct UniformPointSource;

impl PointSource for UniformPointSource {
    fn draw(&self) -> i64 {
        rand::thread_rng().gen_range(MIN_AWARD..=MAX_AWARD)
    }
}
