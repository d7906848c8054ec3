//! Uniform index selection for response templates and fallbacks.

use rand::Rng;

/// Returns an index uniformly distributed over `[lower, upper)`.
///
/// A range holding a single index returns it without touching `rng`, and a
/// degenerate range (`upper <= lower`) returns `lower` instead of panicking
/// the way [`Rng::gen_range`] would.
pub fn pick<R: Rng + ?Sized>(rng: &mut R, lower: usize, upper: usize) -> usize {
    if upper.saturating_sub(lower) <= 1 {
        return lower;
    }
    rng.gen_range(lower..upper)
}
