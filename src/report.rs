//! CSV renderings of a finished session.
//!
//! Three files describe one run: the trial-by-trial result log, the full
//! reward walk traces, and the drawn association. All numbers go through
//! [`fmt_decimal`] so probabilities render with an explicit decimal part.

use crate::core::stimuli::ObjectRoomAssociation;
use crate::core::walk::RewardWalk;
use crate::task::record::{fmt_decimal, ResultRecord, RESULT_HEADER};

/// The trial-by-trial log, one row per stage record.
pub fn results_csv(records: &[ResultRecord]) -> String {
    let mut out = String::with_capacity(RESULT_HEADER.len() + 1 + records.len() * 64);
    out.push_str(RESULT_HEADER);
    out.push('\n');
    for record in records {
        out.push_str(&record.csv_row());
        out.push('\n');
    }
    out
}

/// Each room's full probability trace, one row per walk instant. The
/// starting row carries index 0; every planned stage adds one more.
pub fn random_walk_csv(walk: &RewardWalk) -> String {
    let mut out = String::from("trials");
    for room in walk.rooms() {
        out.push(',');
        out.push_str(room);
    }
    out.push('\n');
    let columns: Vec<&[f64]> = walk.histories().map(|(_, trace)| trace).collect();
    for step in 0..walk.history_len() {
        out.push_str(&step.to_string());
        for column in &columns {
            out.push(',');
            out.push_str(&fmt_decimal(column[step]));
        }
        out.push('\n');
    }
    out
}

/// The drawn association from both directions: each object with its two
/// rooms in draw order, then each room with its two objects.
pub fn association_csv(assoc: &ObjectRoomAssociation) -> String {
    let mut out = String::from("object,room1,room2\n");
    for (object, rooms) in assoc.object_rooms() {
        out.push_str(&format!("{object},{},{}\n", rooms[0], rooms[1]));
    }
    out.push('\n');
    out.push_str("room,object1,object2\n");
    for room in assoc.rooms() {
        let objects = assoc.objects_of(room);
        out.push_str(&format!("{room},{},{}\n", objects[0], objects[1]));
    }
    out
}
