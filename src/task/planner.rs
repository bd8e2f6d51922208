//! Counterbalanced plan generation for one block.
//!
//! Plans are laid down in tiling order so every walk increment and its
//! snapshot land on a known trial, then the finished list is shuffled.
//! Presentation order is therefore random while the underlying tiling
//! stays exactly balanced whenever the trial count is a multiple of the
//! natural cycle.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::core::comparison::UncertaintyComparison;
use crate::core::stimuli::{ObjectPair, ObjectRoomAssociation};
use crate::core::walk::RewardWalk;
use crate::task::plan::{
    PhaseDescriptor, PhaseKind, PostType, StageSnapshots, StandardPlan, TrialPlan, TripletPlan,
};

/// All unordered object pairs, in stimulus-set order.
pub fn object_pairs(assoc: &ObjectRoomAssociation) -> Vec<ObjectPair> {
    let objects: Vec<&str> = assoc.objects().collect();
    let mut out = Vec::with_capacity(objects.len() * (objects.len() - 1) / 2);
    for (i, a) in objects.iter().enumerate() {
        for b in &objects[i + 1..] {
            out.push(ObjectPair::new(*a, *b));
        }
    }
    out
}

/// Plans one block of `descriptor.trials` trials, advancing the walk once
/// per planned stage and freezing a snapshot into each plan.
pub fn plan_phase<R: Rng + ?Sized>(
    descriptor: &PhaseDescriptor,
    assoc: &ObjectRoomAssociation,
    comparisons: &[UncertaintyComparison],
    walk: &mut RewardWalk,
    rng: &mut R,
) -> Vec<TrialPlan> {
    let mut plans = match descriptor.kind {
        PhaseKind::Standard => plan_standard(descriptor, assoc, walk, rng),
        PhaseKind::Triplet => plan_triplet(descriptor, assoc, comparisons, walk, rng),
    };
    plans.shuffle(rng);
    debug!(
        "planned {} {} plans (practice={})",
        plans.len(),
        descriptor.kind.as_str(),
        descriptor.practice
    );
    plans
}

fn plan_standard<R: Rng + ?Sized>(
    descriptor: &PhaseDescriptor,
    assoc: &ObjectRoomAssociation,
    walk: &mut RewardWalk,
    rng: &mut R,
) -> Vec<TrialPlan> {
    let pairs = object_pairs(assoc);
    let trials = descriptor.trials as usize;
    let mut plans = Vec::with_capacity(trials);
    for i in 0..trials {
        walk.increment(rng);
        plans.push(TrialPlan::Standard(StandardPlan {
            pair: pairs[i % pairs.len()].clone(),
            snapshot: walk.snapshot(),
            practice: descriptor.practice,
        }));
    }
    plans
}

fn plan_triplet<R: Rng + ?Sized>(
    descriptor: &PhaseDescriptor,
    assoc: &ObjectRoomAssociation,
    comparisons: &[UncertaintyComparison],
    walk: &mut RewardWalk,
    rng: &mut R,
) -> Vec<TrialPlan> {
    let pairs = object_pairs(assoc);
    let triplet_count = (descriptor.trials as usize).div_ceil(3);
    let mut plans = Vec::with_capacity(triplet_count);
    for i in 0..triplet_count {
        // One increment per inner stage, snapshotted in stage order.
        walk.increment(rng);
        let standard = walk.snapshot();
        walk.increment(rng);
        let uncertain = walk.snapshot();
        walk.increment(rng);
        let post = walk.snapshot();
        plans.push(TrialPlan::Triplet(TripletPlan {
            comparison: comparisons[i % comparisons.len()].clone(),
            ghost_index: i % 2,
            post_type: PostType::ALL[i % 3],
            standard_pair: pairs[i % pairs.len()].clone(),
            snapshots: StageSnapshots {
                standard,
                uncertain,
                post,
            },
            practice: descriptor.practice,
        }));
    }
    plans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::comparison::select_comparisons;
    use crate::core::walk::WalkParams;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    struct Fixture {
        assoc: ObjectRoomAssociation,
        comparisons: Vec<UncertaintyComparison>,
        walk: RewardWalk,
        rng: SmallRng,
    }

    fn fixture(seed: u64) -> Fixture {
        let objects = ["key", "light", "phone", "stove"].map(String::from).to_vec();
        let rooms = ["pink", "blue", "green", "brown"].map(String::from).to_vec();
        let mut rng = SmallRng::seed_from_u64(seed);
        let assoc = ObjectRoomAssociation::build(&objects, &rooms, &mut rng).unwrap();
        let comparisons = select_comparisons(&assoc, &mut rng).unwrap();
        let walk = RewardWalk::initialize(rooms.as_slice(), &WalkParams::default(), &mut rng).unwrap();
        Fixture {
            assoc,
            comparisons,
            walk,
            rng,
        }
    }

    fn descriptor(kind: PhaseKind, trials: u32, practice: bool) -> PhaseDescriptor {
        PhaseDescriptor {
            kind,
            trials,
            practice,
        }
    }

    fn pair_counts(plans: &[TrialPlan], reference: &[ObjectPair]) -> Vec<usize> {
        reference
            .iter()
            .map(|wanted| {
                plans
                    .iter()
                    .filter(|plan| match plan {
                        TrialPlan::Standard(p) => p.pair.same_objects(wanted),
                        TrialPlan::Triplet(p) => p.standard_pair.same_objects(wanted),
                    })
                    .count()
            })
            .collect()
    }

    #[test]
    fn six_standard_trials_cover_each_pair_once() {
        let mut fx = fixture(1);
        let plans = plan_phase(
            &descriptor(PhaseKind::Standard, 6, false),
            &fx.assoc,
            &fx.comparisons,
            &mut fx.walk,
            &mut fx.rng,
        );
        assert_eq!(plans.len(), 6);
        let all = object_pairs(&fx.assoc);
        assert_eq!(all.len(), 6);
        assert_eq!(pair_counts(&plans, &all), vec![1; 6]);
    }

    #[test]
    fn twelve_standard_trials_cover_each_pair_twice() {
        let mut fx = fixture(2);
        let plans = plan_phase(
            &descriptor(PhaseKind::Standard, 12, false),
            &fx.assoc,
            &fx.comparisons,
            &mut fx.walk,
            &mut fx.rng,
        );
        let all = object_pairs(&fx.assoc);
        assert_eq!(pair_counts(&plans, &all), vec![2; 6]);
    }

    #[test]
    fn truncated_standard_tiling_restarts_from_the_front() {
        let mut fx = fixture(3);
        let plans = plan_phase(
            &descriptor(PhaseKind::Standard, 7, false),
            &fx.assoc,
            &fx.comparisons,
            &mut fx.walk,
            &mut fx.rng,
        );
        let all = object_pairs(&fx.assoc);
        let counts = pair_counts(&plans, &all);
        assert_eq!(counts[0], 2, "the first pair of the tiling repeats first");
        assert_eq!(&counts[1..], &[1, 1, 1, 1, 1]);
    }

    #[test]
    fn standard_planning_advances_the_walk_once_per_trial() {
        let mut fx = fixture(4);
        assert_eq!(fx.walk.history_len(), 1);
        let plans = plan_phase(
            &descriptor(PhaseKind::Standard, 6, false),
            &fx.assoc,
            &fx.comparisons,
            &mut fx.walk,
            &mut fx.rng,
        );
        assert_eq!(fx.walk.history_len(), 7);
        // Every snapshot matches one post-increment row of the history.
        for plan in &plans {
            let TrialPlan::Standard(p) = plan else {
                panic!("standard phase planned a triplet")
            };
            let matches_row = (1..fx.walk.history_len()).any(|t| {
                fx.walk.rooms().iter().all(|room| {
                    fx.walk.room_history(room).unwrap()[t] == p.snapshot.probability(room).unwrap()
                })
            });
            assert!(matches_row, "snapshot does not match any walk row");
        }
    }

    #[test]
    fn eighteen_triplet_trials_balance_every_factor() {
        let mut fx = fixture(5);
        let plans = plan_phase(
            &descriptor(PhaseKind::Triplet, 18, false),
            &fx.assoc,
            &fx.comparisons,
            &mut fx.walk,
            &mut fx.rng,
        );
        assert_eq!(plans.len(), 6);
        let mut ghost = [0usize; 2];
        let mut posts = [0usize; 3];
        let mut comparison_hits = [0usize; 2];
        for plan in &plans {
            let TrialPlan::Triplet(p) = plan else {
                panic!("triplet phase planned a lone standard")
            };
            ghost[p.ghost_index] += 1;
            let post_slot = PostType::ALL.iter().position(|t| *t == p.post_type).unwrap();
            posts[post_slot] += 1;
            let is_first = p.comparison.first.same_objects(&fx.comparisons[0].first);
            comparison_hits[if is_first { 0 } else { 1 }] += 1;
        }
        assert_eq!(ghost, [3, 3]);
        assert_eq!(posts, [2, 2, 2]);
        assert_eq!(comparison_hits, [3, 3]);
        let all = object_pairs(&fx.assoc);
        assert_eq!(pair_counts(&plans, &all), vec![1; 6]);
    }

    #[test]
    fn twelve_triplet_trials_tile_the_post_cycle_partially() {
        let mut fx = fixture(6);
        let plans = plan_phase(
            &descriptor(PhaseKind::Triplet, 12, true),
            &fx.assoc,
            &fx.comparisons,
            &mut fx.walk,
            &mut fx.rng,
        );
        assert_eq!(plans.len(), 4);
        let mut posts = [0usize; 3];
        for plan in &plans {
            let TrialPlan::Triplet(p) = plan else { unreachable!() };
            assert!(p.practice);
            let slot = PostType::ALL.iter().position(|t| *t == p.post_type).unwrap();
            posts[slot] += 1;
        }
        assert_eq!(posts, [2, 1, 1]);
    }

    #[test]
    fn triplet_planning_advances_the_walk_three_times_per_triplet() {
        let mut fx = fixture(7);
        plan_phase(
            &descriptor(PhaseKind::Triplet, 18, false),
            &fx.assoc,
            &fx.comparisons,
            &mut fx.walk,
            &mut fx.rng,
        );
        assert_eq!(fx.walk.history_len(), 19);
    }

    #[test]
    fn planning_is_deterministic_for_a_seed() {
        let tags = |plans: &[TrialPlan]| -> Vec<(usize, PostType)> {
            plans
                .iter()
                .map(|plan| match plan {
                    TrialPlan::Triplet(p) => (p.ghost_index, p.post_type),
                    TrialPlan::Standard(_) => unreachable!(),
                })
                .collect()
        };
        let mut a = fixture(8);
        let mut b = fixture(8);
        let d = descriptor(PhaseKind::Triplet, 18, false);
        let one = plan_phase(&d, &a.assoc, &a.comparisons, &mut a.walk, &mut a.rng);
        let two = plan_phase(&d, &b.assoc, &b.comparisons, &mut b.walk, &mut b.rng);
        assert_eq!(tags(&one), tags(&two));
    }
}
