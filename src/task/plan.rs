//! Plan data: everything a trial will need, frozen at planning time.
//!
//! Execution reads plans and snapshots only. The live walk keeps evolving
//! while earlier plans wait their turn, so nothing in here may point back
//! into mutable planner state.

use crate::core::comparison::UncertaintyComparison;
use crate::core::stimuli::ObjectPair;
use crate::core::walk::RewardSnapshot;

/// Phase families. Standard phases run lone choice trials; triplet phases
/// run chained standard/uncertain/post units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseKind {
    Standard,
    Triplet,
}

impl PhaseKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PhaseKind::Standard => "standard",
            PhaseKind::Triplet => "triplet",
        }
    }
}

/// How the post pair relates to the ghost outcome of its uncertain stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PostType {
    Repeat,
    Switch,
    Clash,
}

impl PostType {
    pub const ALL: [PostType; 3] = [PostType::Repeat, PostType::Switch, PostType::Clash];

    pub fn as_str(self) -> &'static str {
        match self {
            PostType::Repeat => "repeat",
            PostType::Switch => "switch",
            PostType::Clash => "clash",
        }
    }
}

/// Screen half / response key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// One phase as the planner sees it: family, trials per block, and whether
/// response windows are relaxed.
#[derive(Clone, Copy, Debug)]
pub struct PhaseDescriptor {
    pub kind: PhaseKind,
    pub trials: u32,
    pub practice: bool,
}

/// Walk snapshots for the three stages of one triplet, taken in stage
/// order at creation time.
#[derive(Clone, Debug)]
pub struct StageSnapshots {
    pub standard: RewardSnapshot,
    pub uncertain: RewardSnapshot,
    pub post: RewardSnapshot,
}

#[derive(Clone, Debug)]
pub struct StandardPlan {
    pub pair: ObjectPair,
    pub snapshot: RewardSnapshot,
    pub practice: bool,
}

#[derive(Clone, Debug)]
pub struct TripletPlan {
    pub comparison: UncertaintyComparison,
    /// Which member of the chosen side's pair the ghost picks (0 or 1, in
    /// the side's stored pair order).
    pub ghost_index: usize,
    pub post_type: PostType,
    pub standard_pair: ObjectPair,
    pub snapshots: StageSnapshots,
    pub practice: bool,
}

#[derive(Clone, Debug)]
pub enum TrialPlan {
    Standard(StandardPlan),
    Triplet(TripletPlan),
}

impl TrialPlan {
    pub fn practice(&self) -> bool {
        match self {
            TrialPlan::Standard(p) => p.practice,
            TrialPlan::Triplet(p) => p.practice,
        }
    }

    /// Records one executed plan contributes to the log.
    pub fn record_count(&self) -> u32 {
        match self {
            TrialPlan::Standard(_) => 1,
            TrialPlan::Triplet(_) => 3,
        }
    }
}
