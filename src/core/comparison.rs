//! Selection of the object-pair comparisons shown on uncertain trials.
//!
//! A comparison puts two room pairs side by side. The two sides must not
//! share an object, so a choice of side is always a choice between four
//! distinct objects. Comparisons are drawn once at setup and reused across
//! triplets; executions shuffle copies, never the stored values.

use rand::Rng;

use crate::core::stimuli::{ObjectPair, ObjectRoomAssociation};
use crate::error::SetupError;

/// Shared draw budget for the whole selection. Rejection keeps the draw
/// uniform over room pairs; the budget turns a pathological stream into an
/// error instead of a hang.
pub const SELECT_DRAWS: u32 = 10_000;

/// Two object-disjoint room pairs. `first`/`second` keep selection order;
/// side assignment on screen is randomized later.
#[derive(Clone, Debug)]
pub struct UncertaintyComparison {
    pub first: ObjectPair,
    pub second: ObjectPair,
}

impl UncertaintyComparison {
    pub fn sides(&self) -> [&ObjectPair; 2] {
        [&self.first, &self.second]
    }

    /// All four object names, first side then second, pair order kept.
    pub fn objects(&self) -> [&str; 4] {
        [
            &self.first.first,
            &self.first.second,
            &self.second.first,
            &self.second.second,
        ]
    }
}

/// Draws `N/2` comparisons from the per-room object pairs.
///
/// The first side of each comparison is redrawn while it repeats either
/// side of the immediately preceding comparison, which keeps back-to-back
/// triplet cycles from opening on the same pair. The second side is redrawn
/// while it shares an object with the first.
pub fn select_comparisons<R: Rng + ?Sized>(
    assoc: &ObjectRoomAssociation,
    rng: &mut R,
) -> Result<Vec<UncertaintyComparison>, SetupError> {
    let pairs: Vec<ObjectPair> = assoc
        .rooms()
        .iter()
        .filter_map(|room| assoc.object_pair_of(room))
        .collect();
    let wanted = pairs.len() / 2;
    let mut budget = SELECT_DRAWS;
    let mut out: Vec<UncertaintyComparison> = Vec::with_capacity(wanted);
    for _ in 0..wanted {
        let previous = out.last();
        let first = draw_pair(&pairs, rng, &mut budget, |cand| {
            previous.is_none_or(|p| !cand.same_objects(&p.first) && !cand.same_objects(&p.second))
        })?;
        let second = draw_pair(&pairs, rng, &mut budget, |cand| !shares_object(cand, &first))?;
        out.push(UncertaintyComparison { first, second });
    }
    Ok(out)
}

fn shares_object(a: &ObjectPair, b: &ObjectPair) -> bool {
    a.contains(&b.first) || a.contains(&b.second)
}

fn draw_pair<R, F>(
    pairs: &[ObjectPair],
    rng: &mut R,
    budget: &mut u32,
    accept: F,
) -> Result<ObjectPair, SetupError>
where
    R: Rng + ?Sized,
    F: Fn(&ObjectPair) -> bool,
{
    loop {
        if *budget == 0 {
            return Err(SetupError::ComparisonExhausted {
                attempts: SELECT_DRAWS,
            });
        }
        *budget -= 1;
        let candidate = &pairs[rng.random_range(0..pairs.len())];
        if accept(candidate) {
            return Ok(candidate.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::collections::HashSet;

    fn built(seed: u64, n: usize) -> ObjectRoomAssociation {
        let objects: Vec<String> = (0..n).map(|i| format!("obj{i}")).collect();
        let rooms: Vec<String> = (0..n).map(|i| format!("room{i}")).collect();
        let mut rng = SmallRng::seed_from_u64(seed);
        ObjectRoomAssociation::build(&objects, &rooms, &mut rng).unwrap()
    }

    fn is_room_pair(assoc: &ObjectRoomAssociation, pair: &ObjectPair) -> bool {
        assoc.room_of_pair(&pair.first, &pair.second).is_some()
    }

    #[test]
    fn sides_are_disjoint_room_pairs() {
        for seed in 0..100 {
            let assoc = built(seed, 4);
            let mut rng = SmallRng::seed_from_u64(seed ^ 0xbeef);
            let comparisons = select_comparisons(&assoc, &mut rng).unwrap();
            assert_eq!(comparisons.len(), 2);
            for c in &comparisons {
                let distinct: HashSet<&str> = c.objects().into_iter().collect();
                assert_eq!(distinct.len(), 4, "sides share an object: {c:?}");
                assert!(is_room_pair(&assoc, &c.first));
                assert!(is_room_pair(&assoc, &c.second));
            }
        }
    }

    #[test]
    fn consecutive_comparisons_never_reopen_on_the_same_pair() {
        for seed in 0..50 {
            let assoc = built(seed, 6);
            let mut rng = SmallRng::seed_from_u64(seed.wrapping_mul(31));
            let comparisons = select_comparisons(&assoc, &mut rng).unwrap();
            assert_eq!(comparisons.len(), 3);
            for pair in comparisons.windows(2) {
                let (prev, next) = (&pair[0], &pair[1]);
                assert!(!next.first.same_objects(&prev.first));
                assert!(!next.first.same_objects(&prev.second));
            }
        }
    }

    #[test]
    fn four_stimuli_yield_two_fully_distinct_comparisons() {
        // With four objects the room pairs form a single cycle, so the two
        // comparisons must partition the four pairs between them.
        for seed in 0..100 {
            let assoc = built(seed, 4);
            let mut rng = SmallRng::seed_from_u64(seed + 1000);
            let comparisons = select_comparisons(&assoc, &mut rng).unwrap();
            let [a, b] = [&comparisons[0], &comparisons[1]];
            for side_a in a.sides() {
                for side_b in b.sides() {
                    assert!(!side_a.same_objects(side_b));
                }
            }
        }
    }

    #[test]
    fn selection_is_deterministic_for_a_seed() {
        let assoc = built(5, 4);
        let mut one = SmallRng::seed_from_u64(77);
        let mut two = SmallRng::seed_from_u64(77);
        let a = select_comparisons(&assoc, &mut one).unwrap();
        let b = select_comparisons(&assoc, &mut two).unwrap();
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.first, y.first);
            assert_eq!(x.second, y.second);
        }
    }
}
