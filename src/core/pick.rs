//! Small sampling helpers shared by the setup and planning code.
//!
//! Everything here is generic over `Rng` so the same helpers serve the
//! seeded experiment stream and throwaway rngs in tests.

use rand::Rng;

/// Removes and returns a uniformly chosen element, keeping the relative
/// order of the remainder. Returns `None` on an empty vec.
pub fn pop_choice<T, R: Rng + ?Sized>(items: &mut Vec<T>, rng: &mut R) -> Option<T> {
    if items.is_empty() {
        return None;
    }
    let idx = rng.random_range(0..items.len());
    Some(items.remove(idx))
}

/// Uniform choice among the elements that satisfy `keep`.
///
/// Equivalent in distribution to drawing with rejection, but total: returns
/// `None` instead of spinning when nothing qualifies.
pub fn filtered_choice<'a, T, R, F>(items: &'a [T], rng: &mut R, keep: F) -> Option<&'a T>
where
    R: Rng + ?Sized,
    F: Fn(&T) -> bool,
{
    let survivors: Vec<&T> = items.iter().filter(|t| keep(t)).collect();
    if survivors.is_empty() {
        return None;
    }
    let idx = rng.random_range(0..survivors.len());
    Some(survivors[idx])
}
