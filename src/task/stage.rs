//! Stage geometry: who stands where, and what the ghost did about it.
//!
//! Layouts are derived from the association plus the seeded stream, then
//! frozen. The uncertain layout in particular keeps its pre-shuffle pair
//! order alive because the planned ghost index counterbalances against
//! that order, not against what ended up on top.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::core::comparison::UncertaintyComparison;
use crate::core::stimuli::{ObjectPair, ObjectRoomAssociation};
use crate::task::plan::{PostType, Side};

/// Left/right placement for a lone object pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChoiceLayout {
    pub left: String,
    pub right: String,
}

impl ChoiceLayout {
    pub fn shuffled<R: Rng + ?Sized>(pair: &ObjectPair, rng: &mut R) -> Self {
        let mut names = [pair.first.clone(), pair.second.clone()];
        names.shuffle(rng);
        let [left, right] = names;
        Self { left, right }
    }

    pub fn object_on(&self, side: Side) -> &str {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

/// Four-slot placement for an uncertain comparison.
///
/// Side assignment and the left column's top/bottom order are random; the
/// right column then mirrors the left so that horizontal neighbours share
/// a room.
#[derive(Clone, Debug)]
pub struct UncertainLayout {
    pub top_left: String,
    pub bottom_left: String,
    pub top_right: String,
    pub bottom_right: String,
    left_pair: ObjectPair,
    right_pair: ObjectPair,
}

impl UncertainLayout {
    pub fn compose<R: Rng + ?Sized>(
        comparison: &UncertaintyComparison,
        assoc: &ObjectRoomAssociation,
        rng: &mut R,
    ) -> Self {
        let mut sides = [comparison.first.clone(), comparison.second.clone()];
        sides.shuffle(rng);
        let [left_pair, right_pair] = sides;

        let mut left_column = [left_pair.first.clone(), left_pair.second.clone()];
        left_column.shuffle(rng);
        let [top_left, bottom_left] = left_column;

        let (top_right, bottom_right) =
            if assoc.shared_room(&top_left, &right_pair.first).is_some() {
                (right_pair.first.clone(), right_pair.second.clone())
            } else {
                (right_pair.second.clone(), right_pair.first.clone())
            };

        Self {
            top_left,
            bottom_left,
            top_right,
            bottom_right,
            left_pair,
            right_pair,
        }
    }

    /// The side's pair in its stored, pre-shuffle order.
    pub fn side_pair(&self, side: Side) -> &ObjectPair {
        match side {
            Side::Left => &self.left_pair,
            Side::Right => &self.right_pair,
        }
    }

    /// Record text for a side: top then bottom, no separator.
    pub fn column_text(&self, side: Side) -> String {
        match side {
            Side::Left => format!("{}{}", self.top_left, self.bottom_left),
            Side::Right => format!("{}{}", self.top_right, self.bottom_right),
        }
    }

    /// The side's objects in on-screen order, top then bottom.
    pub fn column(&self, side: Side) -> [&str; 2] {
        match side {
            Side::Left => [&self.top_left, &self.bottom_left],
            Side::Right => [&self.top_right, &self.bottom_right],
        }
    }

    /// The object in the same row on the opposite side.
    pub fn horizontal_counterpart(&self, name: &str) -> &str {
        if name == self.top_left {
            &self.top_right
        } else if name == self.top_right {
            &self.top_left
        } else if name == self.bottom_left {
            &self.bottom_right
        } else {
            &self.bottom_left
        }
    }
}

/// The ghost's resolution of a responded uncertain stage.
#[derive(Clone, Debug)]
pub struct GhostSelection {
    pub selected: String,
    pub rejected: String,
    pub side: Side,
    pub layout: UncertainLayout,
}

/// Applies the planned ghost index to the chosen side's pre-shuffle pair.
pub fn resolve_ghost(layout: UncertainLayout, side: Side, ghost_index: usize) -> GhostSelection {
    let pair = layout.side_pair(side).as_array();
    let selected = pair[ghost_index % 2].to_string();
    let rejected = pair[(ghost_index + 1) % 2].to_string();
    GhostSelection {
        selected,
        rejected,
        side,
        layout,
    }
}

/// Reveal order after a ghost resolution: the chosen side's common room
/// first, then the room only the selected object hides in.
pub fn ghost_reveal_rooms(ghost: &GhostSelection, assoc: &ObjectRoomAssociation) -> [String; 2] {
    let common = assoc
        .room_of_pair(&ghost.selected, &ghost.rejected)
        .expect("a comparison side is some room's pair");
    let unique = assoc
        .room_with_only(&ghost.selected, &ghost.rejected)
        .expect("distinct room pairs leave the selected object a room of its own");
    [common.to_string(), unique.to_string()]
}

/// Reveal order for a responded choice: the object's two rooms, shuffled.
pub fn choice_reveal_rooms<R: Rng + ?Sized>(
    object: &str,
    assoc: &ObjectRoomAssociation,
    rng: &mut R,
) -> [String; 2] {
    let rooms = assoc
        .rooms_of(object)
        .expect("a presented object is part of the association");
    let mut order = [rooms[0].clone(), rooms[1].clone()];
    order.shuffle(rng);
    order
}

/// The follow-up pair a post type demands.
pub fn post_pair(post_type: PostType, ghost: &GhostSelection) -> ObjectPair {
    match post_type {
        PostType::Repeat => ObjectPair::new(
            ghost.selected.clone(),
            ghost.layout.horizontal_counterpart(&ghost.selected),
        ),
        PostType::Switch => ObjectPair::new(
            ghost.rejected.clone(),
            ghost.layout.horizontal_counterpart(&ghost.rejected),
        ),
        PostType::Clash => ObjectPair::new(ghost.selected.clone(), ghost.rejected.clone()),
    }
}
