//! Object/room association: which hiding rooms each searched-for object
//! can occupy.
//!
//! The assignment is a random 2-regular bipartite pairing. Every object is
//! linked to exactly two distinct rooms, every room hosts exactly two
//! distinct objects, and no two objects share both of their rooms. All
//! later machinery (comparisons, ghost bookkeeping, the quiz) leans on
//! those invariants, so the builder enforces them by construction rather
//! than trusting the draw.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::warn;

use crate::core::pick;
use crate::error::SetupError;

/// Rebuild budget for the assignment loop. A single pass can strand an
/// unusable remainder in the room pool (for example two copies of the same
/// room), so the builder retries from scratch instead of spinning.
pub const BUILD_ATTEMPTS: u32 = 64;

/// An ordered pair of object names. Order encodes sampling order, which
/// later stages use for counterbalancing; equality comparisons that should
/// ignore order go through [`ObjectPair::same_objects`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectPair {
    pub first: String,
    pub second: String,
}

impl ObjectPair {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.first == name || self.second == name
    }

    /// The member that is not `name`, if `name` is a member.
    pub fn other(&self, name: &str) -> Option<&str> {
        if self.first == name {
            Some(&self.second)
        } else if self.second == name {
            Some(&self.first)
        } else {
            None
        }
    }

    /// Unordered equality.
    pub fn same_objects(&self, other: &ObjectPair) -> bool {
        (self.first == other.first && self.second == other.second)
            || (self.first == other.second && self.second == other.first)
    }

    pub fn as_array(&self) -> [&str; 2] {
        [&self.first, &self.second]
    }
}

#[derive(Clone, Debug)]
struct AssociationEntry {
    object: String,
    /// Draw order. The quiz keys its two questions per object off this
    /// order, so it is part of the association, not presentation noise.
    rooms: [String; 2],
}

/// The per-participant object/room assignment.
///
/// Storage is plain vectors in configuration order so that every accessor
/// iterates deterministically; nothing downstream may depend on hash order.
#[derive(Clone, Debug)]
pub struct ObjectRoomAssociation {
    entries: Vec<AssociationEntry>,
    rooms: Vec<String>,
}

impl ObjectRoomAssociation {
    /// Builds a fresh assignment from the seeded stream.
    ///
    /// Objects take turns in a shuffled visiting order; each draws two
    /// rooms from a pool holding two copies of every room. The second draw
    /// is restricted to rooms that differ from the first and do not
    /// recreate an already-used room pair; when that leaves no candidate
    /// the whole build restarts with a fresh pool and a fresh order.
    pub fn build<R: Rng + ?Sized>(
        objects: &[String],
        rooms: &[String],
        rng: &mut R,
    ) -> Result<Self, SetupError> {
        validate_names(objects, rooms)?;
        for attempt in 1..=BUILD_ATTEMPTS {
            if let Some(entries) = try_build(objects, rooms, rng) {
                return Ok(Self {
                    entries,
                    rooms: rooms.to_vec(),
                });
            }
            warn!("assignment draw dead-ended, rebuilding ({attempt}/{BUILD_ATTEMPTS})");
        }
        Err(SetupError::AssignmentExhausted {
            attempts: BUILD_ATTEMPTS,
        })
    }

    /// Object names in configuration order.
    pub fn objects(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.object.as_str())
    }

    /// Room names in configuration order.
    pub fn rooms(&self) -> &[String] {
        &self.rooms
    }

    /// Every object with its two rooms, in configuration and draw order.
    pub fn object_rooms(&self) -> impl Iterator<Item = (&str, &[String; 2])> {
        self.entries.iter().map(|e| (e.object.as_str(), &e.rooms))
    }

    pub fn object_count(&self) -> usize {
        self.entries.len()
    }

    /// The two rooms of `object`, in draw order.
    pub fn rooms_of(&self, object: &str) -> Option<&[String; 2]> {
        self.entries
            .iter()
            .find(|e| e.object == object)
            .map(|e| &e.rooms)
    }

    /// The two objects hiding in `room`, in object configuration order.
    pub fn objects_of(&self, room: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.rooms.iter().any(|r| r == room))
            .map(|e| e.object.as_str())
            .collect()
    }

    /// The object pair of `room`, when the room hosts exactly two objects.
    pub fn object_pair_of(&self, room: &str) -> Option<ObjectPair> {
        let objects = self.objects_of(room);
        match objects.as_slice() {
            [a, b] => Some(ObjectPair::new(*a, *b)),
            _ => None,
        }
    }

    /// The room whose object pair is exactly `{a, b}` (order ignored).
    pub fn room_of_pair(&self, a: &str, b: &str) -> Option<&str> {
        self.rooms
            .iter()
            .find(|room| {
                let objects = self.objects_of(room);
                objects.len() == 2 && objects.contains(&a) && objects.contains(&b)
            })
            .map(|room| room.as_str())
    }

    /// The room hosting both `a` and `b`. Objects from different room
    /// pairs share at most one room under the pair-uniqueness invariant.
    pub fn shared_room(&self, a: &str, b: &str) -> Option<&str> {
        self.rooms
            .iter()
            .find(|room| {
                let objects = self.objects_of(room);
                objects.contains(&a) && objects.contains(&b)
            })
            .map(|room| room.as_str())
    }

    /// The room hosting `object` but not `excluded`, scanning rooms in
    /// configuration order.
    pub fn room_with_only(&self, object: &str, excluded: &str) -> Option<&str> {
        self.rooms
            .iter()
            .find(|room| {
                let objects = self.objects_of(room);
                objects.contains(&object) && !objects.contains(&excluded)
            })
            .map(|room| room.as_str())
    }
}

fn validate_names(objects: &[String], rooms: &[String]) -> Result<(), SetupError> {
    let n = objects.len();
    let count_err = SetupError::InvalidStimulusCount {
        objects: n,
        rooms: rooms.len(),
    };
    if n < 4 || n % 2 != 0 || rooms.len() != n {
        return Err(count_err);
    }
    let distinct: HashSet<&str> = objects
        .iter()
        .chain(rooms.iter())
        .map(String::as_str)
        .collect();
    if distinct.len() != 2 * n {
        return Err(count_err);
    }
    Ok(())
}

fn try_build<R: Rng + ?Sized>(
    objects: &[String],
    rooms: &[String],
    rng: &mut R,
) -> Option<Vec<AssociationEntry>> {
    // Two hiding slots per room.
    let mut pool: Vec<String> = rooms.iter().flat_map(|r| [r.clone(), r.clone()]).collect();
    // The pair filter tightens as draws accumulate, so the visiting order
    // is itself a draw; entries still land in configuration order.
    let mut order: Vec<usize> = (0..objects.len()).collect();
    order.shuffle(rng);
    let mut drawn: Vec<Option<[String; 2]>> = vec![None; objects.len()];
    for &index in &order {
        let first = pick::pop_choice(&mut pool, rng)?;
        let candidates: Vec<usize> = pool
            .iter()
            .enumerate()
            .filter(|(_, room)| **room != first && !pair_used(&drawn, &first, room))
            .map(|(idx, _)| idx)
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let second = pool.remove(candidates[rng.random_range(0..candidates.len())]);
        drawn[index] = Some([first, second]);
    }
    let mut entries = Vec::with_capacity(objects.len());
    for (object, rooms) in objects.iter().zip(drawn) {
        entries.push(AssociationEntry {
            object: object.clone(),
            rooms: rooms?,
        });
    }
    Some(entries)
}

fn pair_used(drawn: &[Option<[String; 2]>], a: &str, b: &str) -> bool {
    drawn.iter().flatten().any(|rooms| {
        (rooms[0] == a && rooms[1] == b) || (rooms[0] == b && rooms[1] == a)
    })
}
