//! Execution of one planned unit: a lone choice trial, or the
//! standard/uncertain/post chain of a triplet.
//!
//! Each stage runs its inter-trial interval, arms a fresh response window,
//! and either collects a response and opens rooms against the plan's
//! frozen snapshot, or records the NA sentinel. An uncertain stage that
//! times out takes its post stage down with it; a standard stage never
//! cascades.

use rand::Rng;
use tracing::debug;

use crate::core::stimuli::{ObjectPair, ObjectRoomAssociation};
use crate::core::walk::RewardSnapshot;
use crate::task::plan::{PostType, Side, StandardPlan, TrialPlan, TripletPlan};
use crate::task::record::{
    GhostOutcome, Reveal, SideText, StageRecord, StageResponse, TrialType,
};
use crate::task::session::{Scene, Session, Slot};
use crate::task::stage::{self, ChoiceLayout, GhostSelection, UncertainLayout};

/// Blank inter-trial interval, flipped frame by frame.
pub const ITI_BLANK_SECS: f64 = 0.700;
/// Gap after the interval; the auditory go-cue occupies it.
pub const CUE_GAP_SECS: f64 = 0.300;
/// Response window on non-practice trials.
pub const RESPONSE_WINDOW_SECS: f64 = 2.000;
/// Pause between a response and the reveal sequence.
pub const PAUSE_SECS: f64 = 0.500;
/// The responded object or chosen column alone, before the first room.
pub const OBJECT_SOLO_SECS: f64 = 1.000;
/// Each opened room.
pub const REVEAL_SECS: f64 = 1.000;
/// Stimuli alone between the two rooms.
pub const BETWEEN_REVEALS_SECS: f64 = 0.650;
/// Closing solo frame after a standard or post reveal pair.
pub const OUTRO_CHOICE_SECS: f64 = 0.150;
/// Closing solo frame after an uncertain reveal pair.
pub const OUTRO_UNCERTAIN_SECS: f64 = 0.850;
/// How long the too-slow warning stays up.
pub const TIMEOUT_WARNING_SECS: f64 = 4.000;

const TIMEOUT_WARNING: &str = "TOO SLOW!\n\nPlease try to respond within 2 seconds.";

enum TripletState {
    Standard,
    Uncertain,
    Post(GhostSelection),
    Skipped,
    Done,
}

/// Runs planned units against an association. Holds no mutable state; the
/// session carries the rng and the boundaries.
pub struct TrialMachine<'a> {
    assoc: &'a ObjectRoomAssociation,
}

impl<'a> TrialMachine<'a> {
    pub fn new(assoc: &'a ObjectRoomAssociation) -> Self {
        Self { assoc }
    }

    /// Executes one plan and returns its stage records in emission order.
    pub fn run(&self, plan: &TrialPlan, session: &mut Session) -> Vec<StageRecord> {
        let records = match plan {
            TrialPlan::Standard(p) => vec![self.standard_trial(p, session)],
            TrialPlan::Triplet(p) => self.triplet(p, session),
        };
        for record in &records {
            let outcome = match (&record.response, &record.sides) {
                (Some(_), _) => "responded",
                (None, Some(_)) => "timed out",
                (None, None) => "skipped",
            };
            debug!("{} stage {outcome}", record.trial_type.as_str());
        }
        records
    }

    fn standard_trial(&self, plan: &StandardPlan, session: &mut Session) -> StageRecord {
        self.choice_stage(
            TrialType::Standard,
            None,
            &plan.pair,
            &plan.snapshot,
            plan.practice,
            OUTRO_CHOICE_SECS,
            session,
        )
    }

    fn triplet(&self, plan: &TripletPlan, session: &mut Session) -> Vec<StageRecord> {
        let mut records = Vec::with_capacity(3);
        let mut state = TripletState::Standard;
        loop {
            state = match state {
                TripletState::Standard => {
                    records.push(self.choice_stage(
                        TrialType::Standard,
                        None,
                        &plan.standard_pair,
                        &plan.snapshots.standard,
                        plan.practice,
                        OUTRO_CHOICE_SECS,
                        session,
                    ));
                    TripletState::Uncertain
                }
                TripletState::Uncertain => {
                    let (record, ghost) = self.uncertain_stage(plan, session);
                    records.push(record);
                    match ghost {
                        Some(g) => TripletState::Post(g),
                        None => TripletState::Skipped,
                    }
                }
                TripletState::Post(ghost) => {
                    let pair = stage::post_pair(plan.post_type, &ghost);
                    records.push(self.choice_stage(
                        TrialType::Post,
                        Some(plan.post_type),
                        &pair,
                        &plan.snapshots.post,
                        plan.practice,
                        OUTRO_CHOICE_SECS,
                        session,
                    ));
                    TripletState::Done
                }
                TripletState::Skipped => {
                    records.push(StageRecord::skipped_post(plan.post_type));
                    TripletState::Done
                }
                TripletState::Done => break,
            };
        }
        records
    }

    #[allow(clippy::too_many_arguments)]
    fn choice_stage(
        &self,
        trial_type: TrialType,
        post_type: Option<PostType>,
        pair: &ObjectPair,
        snapshot: &RewardSnapshot,
        practice: bool,
        outro_secs: f64,
        session: &mut Session,
    ) -> StageRecord {
        self.intertrial(session);
        let layout = ChoiceLayout::shuffled(pair, &mut session.rng);
        let sides = SideText {
            left: layout.left.clone(),
            right: layout.right.clone(),
        };
        let scene = choice_scene(&layout);
        match session.await_response(&scene, response_window(practice)) {
            Some(response) => {
                let object = layout.object_on(response.side).to_string();
                session.hold(PAUSE_SECS);
                let rooms = stage::choice_reveal_rooms(&object, self.assoc, &mut session.rng);
                let items = [(object, Slot::Centre)];
                let reveals = self.open_rooms(&items, &rooms, snapshot, outro_secs, session);
                StageRecord {
                    trial_type,
                    post_type,
                    sides: Some(sides),
                    response: Some(StageResponse {
                        side: response.side,
                        rt_seconds: response.at_seconds,
                        ghost: None,
                        reveals,
                    }),
                }
            }
            None => {
                self.timeout_warning(session);
                StageRecord::timed_out(trial_type, post_type, sides)
            }
        }
    }

    fn uncertain_stage(
        &self,
        plan: &TripletPlan,
        session: &mut Session,
    ) -> (StageRecord, Option<GhostSelection>) {
        self.intertrial(session);
        let layout = UncertainLayout::compose(&plan.comparison, self.assoc, &mut session.rng);
        let sides = SideText {
            left: layout.column_text(Side::Left),
            right: layout.column_text(Side::Right),
        };
        let scene = uncertain_scene(&layout);
        match session.await_response(&scene, response_window(plan.practice)) {
            Some(response) => {
                let ghost = stage::resolve_ghost(layout, response.side, plan.ghost_index);
                session.hold(PAUSE_SECS);
                let rooms = stage::ghost_reveal_rooms(&ghost, self.assoc);
                // The whole chosen column stays up through the reveals, in
                // its on-screen order; the ghost choice is visible only
                // through which rooms open.
                let [top, bottom] = ghost.layout.column(ghost.side);
                let items = [
                    (top.to_string(), Slot::CentreTop),
                    (bottom.to_string(), Slot::CentreBottom),
                ];
                let reveals = self.open_rooms(
                    &items,
                    &rooms,
                    &plan.snapshots.uncertain,
                    OUTRO_UNCERTAIN_SECS,
                    session,
                );
                let record = StageRecord {
                    trial_type: TrialType::Uncertain,
                    post_type: None,
                    sides: Some(sides),
                    response: Some(StageResponse {
                        side: response.side,
                        rt_seconds: response.at_seconds,
                        ghost: Some(GhostOutcome {
                            selected: ghost.selected.clone(),
                            rejected: ghost.rejected.clone(),
                        }),
                        reveals,
                    }),
                };
                (record, Some(ghost))
            }
            None => {
                self.timeout_warning(session);
                (
                    StageRecord::timed_out(TrialType::Uncertain, None, sides),
                    None,
                )
            }
        }
    }

    /// Solo frame, two room openings with a solo gap, closing solo frame.
    /// The same stimuli stay up throughout. Treasure is drawn per room
    /// against the snapshot probability.
    fn open_rooms(
        &self,
        items: &[(String, Slot)],
        rooms: &[String; 2],
        snapshot: &RewardSnapshot,
        outro_secs: f64,
        session: &mut Session,
    ) -> [Reveal; 2] {
        let solo = Scene::of(items.to_vec());
        session.present_for(&solo, OBJECT_SOLO_SECS);
        let first = self.open_one(items, &rooms[0], snapshot, session);
        session.present_for(&solo, BETWEEN_REVEALS_SECS);
        let second = self.open_one(items, &rooms[1], snapshot, session);
        session.present_for(&solo, outro_secs);
        [first, second]
    }

    fn open_one(
        &self,
        items: &[(String, Slot)],
        room: &str,
        snapshot: &RewardSnapshot,
        session: &mut Session,
    ) -> Reveal {
        let probability = snapshot
            .probability(room)
            .expect("snapshot covers every room of the association");
        let treasure = session.rng.random_bool(probability.clamp(0.0, 1.0));
        let scene = Scene {
            items: items.to_vec(),
            room: Some(room.to_string()),
            treasure,
            containers: false,
        };
        session.present_for(&scene, REVEAL_SECS);
        Reveal {
            room: room.to_string(),
            probability,
            treasure,
        }
    }

    fn intertrial(&self, session: &mut Session) {
        session.present_for(&Scene::blank(), ITI_BLANK_SECS);
        session.hold(CUE_GAP_SECS);
    }

    fn timeout_warning(&self, session: &mut Session) {
        session.screen.announce(TIMEOUT_WARNING);
        session.hold(TIMEOUT_WARNING_SECS);
    }
}

fn response_window(practice: bool) -> Option<f64> {
    if practice {
        None
    } else {
        Some(RESPONSE_WINDOW_SECS)
    }
}

fn choice_scene(layout: &ChoiceLayout) -> Scene {
    Scene {
        items: vec![
            (layout.left.clone(), Slot::Left),
            (layout.right.clone(), Slot::Right),
        ],
        room: None,
        treasure: false,
        containers: true,
    }
}

fn uncertain_scene(layout: &UncertainLayout) -> Scene {
    Scene {
        items: vec![
            (layout.top_left.clone(), Slot::TopLeft),
            (layout.bottom_left.clone(), Slot::BottomLeft),
            (layout.top_right.clone(), Slot::TopRight),
            (layout.bottom_right.clone(), Slot::BottomRight),
        ],
        room: None,
        treasure: false,
        containers: true,
    }
}
