//! Association comprehension quiz, run before the trial phases.
//!
//! Every object is probed twice (once per associated room) and every room
//! twice (once per hosted object). A question shows the prompt stimulus on
//! top and two candidates below, one associated, one not. The quiz repeats
//! with a fresh question order until a perfect round, unless the pass
//! requirement is waived.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::core::pick;
use crate::core::stimuli::ObjectRoomAssociation;
use crate::task::machine::{CUE_GAP_SECS, ITI_BLANK_SECS};
use crate::task::plan::Side;
use crate::task::session::{Scene, Session, Slot};

/// Response window per question.
pub const QUESTION_WINDOW_SECS: f64 = 3.000;
/// How long feedback text stays up.
pub const FEEDBACK_SECS: f64 = 1.000;

/// One two-alternative question: pick the prompt's counterpart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizQuestion {
    pub prompt: String,
    pub target: String,
    pub distractor: String,
    pub target_side: Side,
}

impl QuizQuestion {
    pub fn is_correct(&self, side: Side) -> bool {
        side == self.target_side
    }

    fn scene(&self) -> Scene {
        let (bottom_left, bottom_right) = match self.target_side {
            Side::Left => (self.target.clone(), self.distractor.clone()),
            Side::Right => (self.distractor.clone(), self.target.clone()),
        };
        Scene {
            items: vec![
                (self.prompt.clone(), Slot::CentreTop),
                (bottom_left, Slot::BottomLeft),
                (bottom_right, Slot::BottomRight),
            ],
            room: None,
            treasure: false,
            containers: true,
        }
    }
}

/// Builds the full question set: two per object, then two per room, the
/// first pass asking for the first counterpart and the second for the
/// other. Distractors are drawn from the same kind as the target.
pub fn build_questions<R: Rng + ?Sized>(
    assoc: &ObjectRoomAssociation,
    rng: &mut R,
) -> Vec<QuizQuestion> {
    let objects: Vec<String> = assoc.objects().map(str::to_string).collect();
    let rooms: Vec<String> = assoc.rooms().to_vec();
    let mut out = Vec::with_capacity(4 * objects.len());
    for flag in 0..2 {
        for object in &objects {
            let counterparts = assoc
                .rooms_of(object)
                .expect("an object listed by the association has rooms");
            let target = counterparts[flag].clone();
            let distractor = pick::filtered_choice(&rooms, rng, |room| {
                !counterparts.contains(room)
            })
            .expect("at least four rooms leave a non-associated one")
            .clone();
            out.push(place(object, target, distractor, rng));
        }
    }
    for flag in 0..2 {
        for room in &rooms {
            let hosts = assoc.objects_of(room);
            let target = hosts[flag].to_string();
            let distractor = pick::filtered_choice(&objects, rng, |object| {
                !hosts.contains(&object.as_str())
            })
            .expect("at least four objects leave a non-associated one")
            .clone();
            out.push(place(room, target, distractor, rng));
        }
    }
    out
}

fn place<R: Rng + ?Sized>(
    prompt: &str,
    target: String,
    distractor: String,
    rng: &mut R,
) -> QuizQuestion {
    let target_side = if rng.random_bool(0.5) {
        Side::Left
    } else {
        Side::Right
    };
    QuizQuestion {
        prompt: prompt.to_string(),
        target,
        distractor,
        target_side,
    }
}

/// Result of the whole quiz loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuizOutcome {
    /// Rounds run, the passing (or waived) one included.
    pub rounds: u32,
    pub passed: bool,
    /// Score of the final round.
    pub score: usize,
    pub total: usize,
}

pub struct Quiz<'a> {
    assoc: &'a ObjectRoomAssociation,
    must_pass: bool,
}

impl<'a> Quiz<'a> {
    pub fn new(assoc: &'a ObjectRoomAssociation, must_pass: bool) -> Self {
        Self { assoc, must_pass }
    }

    /// Runs quiz rounds until one is perfect, or a single round when the
    /// pass requirement is waived.
    pub fn run(&self, session: &mut Session) -> QuizOutcome {
        let mut questions = build_questions(self.assoc, &mut session.rng);
        let total = questions.len();
        let mut rounds = 0;
        loop {
            questions.shuffle(&mut session.rng);
            let score = self.round(&questions, session);
            rounds += 1;
            session
                .screen
                .announce(&format!("You answered {score} of {total} correctly."));
            if score == total {
                session
                    .screen
                    .announce("Congratulations! You mastered the quiz. The trials will begin now.");
                return QuizOutcome {
                    rounds,
                    passed: true,
                    score,
                    total,
                };
            }
            if !self.must_pass {
                return QuizOutcome {
                    rounds,
                    passed: false,
                    score,
                    total,
                };
            }
            session
                .screen
                .announce("Not quite there yet. Let's go through them once more.");
        }
    }

    fn round(&self, questions: &[QuizQuestion], session: &mut Session) -> usize {
        let mut score = 0;
        for question in questions {
            session.present_for(&Scene::blank(), ITI_BLANK_SECS);
            session.hold(CUE_GAP_SECS);
            let response = session.await_response(&question.scene(), Some(QUESTION_WINDOW_SECS));
            let correct = matches!(response, Some(r) if question.is_correct(r.side));
            if correct {
                score += 1;
                session.screen.announce("CORRECT!");
            } else {
                // Feedback never reveals the pairing.
                session.screen.announce("INCORRECT...");
            }
            session.hold(FEEDBACK_SECS);
        }
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::session::{LogScreen, ScriptedResponses, StepClock};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn assoc(seed: u64) -> ObjectRoomAssociation {
        let objects = ["key", "light", "phone", "stove"].map(String::from).to_vec();
        let rooms = ["pink", "blue", "green", "brown"].map(String::from).to_vec();
        let mut rng = SmallRng::seed_from_u64(seed);
        ObjectRoomAssociation::build(&objects, &rooms, &mut rng).unwrap()
    }

    fn scripted_session(script: Vec<Option<(Side, f64)>>, seed: u64) -> Session {
        Session::new(
            Box::new(LogScreen),
            Box::new(ScriptedResponses::new(script)),
            Box::new(StepClock::new(0.05)),
            seed,
        )
    }

    #[test]
    fn question_set_probes_every_stimulus_twice() {
        let assoc = assoc(1);
        let mut rng = SmallRng::seed_from_u64(42);
        let questions = build_questions(&assoc, &mut rng);
        assert_eq!(questions.len(), 16);
        for object in assoc.objects() {
            let targets: Vec<&str> = questions
                .iter()
                .filter(|q| q.prompt == object)
                .map(|q| q.target.as_str())
                .collect();
            let rooms = assoc.rooms_of(object).unwrap();
            assert_eq!(targets.len(), 2, "{object} not asked twice");
            assert!(targets.contains(&rooms[0].as_str()));
            assert!(targets.contains(&rooms[1].as_str()));
        }
        for room in assoc.rooms() {
            let count = questions.iter().filter(|q| q.prompt == *room).count();
            assert_eq!(count, 2, "{room} not asked twice");
        }
    }

    #[test]
    fn distractors_are_same_kind_and_never_associated() {
        let assoc = assoc(2);
        let mut rng = SmallRng::seed_from_u64(9);
        let rooms = assoc.rooms().to_vec();
        for question in build_questions(&assoc, &mut rng) {
            assert_ne!(question.target, question.distractor);
            let target_is_room = rooms.contains(&question.target);
            let distractor_is_room = rooms.contains(&question.distractor);
            assert_eq!(target_is_room, distractor_is_room, "kinds mixed");
            if target_is_room {
                let associated = assoc.rooms_of(&question.prompt).unwrap();
                assert!(!associated.contains(&question.distractor));
            } else {
                let hosts = assoc.objects_of(&question.prompt);
                assert!(!hosts.contains(&question.distractor.as_str()));
            }
        }
    }

    #[test]
    fn question_scene_puts_the_target_on_its_side() {
        let q = QuizQuestion {
            prompt: "key".into(),
            target: "pink".into(),
            distractor: "blue".into(),
            target_side: Side::Right,
        };
        let scene = q.scene();
        assert!(scene.items.contains(&("pink".to_string(), Slot::BottomRight)));
        assert!(scene.items.contains(&("blue".to_string(), Slot::BottomLeft)));
        assert!(scene.items.contains(&("key".to_string(), Slot::CentreTop)));
        assert!(q.is_correct(Side::Right));
        assert!(!q.is_correct(Side::Left));
    }

    // Replays the rng consumption of `run` to know the asked order, then
    // scripts accordingly.
    fn foreseen_rounds(assoc: &ObjectRoomAssociation, seed: u64, rounds: usize) -> Vec<Vec<QuizQuestion>> {
        let mut lookahead = SmallRng::seed_from_u64(seed);
        let mut questions = build_questions(assoc, &mut lookahead);
        let mut out = Vec::new();
        for _ in 0..rounds {
            questions.shuffle(&mut lookahead);
            out.push(questions.clone());
        }
        out
    }

    #[test]
    fn a_perfect_round_passes_immediately() {
        let assoc = assoc(3);
        let order = foreseen_rounds(&assoc, 7, 1).remove(0);
        let script = order
            .iter()
            .map(|q| Some((q.target_side, 0.5)))
            .collect();
        let mut session = scripted_session(script, 7);
        let outcome = Quiz::new(&assoc, true).run(&mut session);
        assert!(outcome.passed);
        assert_eq!(outcome.rounds, 1);
        assert_eq!(outcome.score, outcome.total);
    }

    #[test]
    fn a_failed_round_repeats_until_perfect() {
        let assoc = assoc(4);
        let rounds = foreseen_rounds(&assoc, 11, 2);
        let mut script: Vec<Option<(Side, f64)>> = rounds[0]
            .iter()
            .map(|q| Some((q.target_side.opposite(), 0.5)))
            .collect();
        script.extend(rounds[1].iter().map(|q| Some((q.target_side, 0.5))));
        let mut session = scripted_session(script, 11);
        let outcome = Quiz::new(&assoc, true).run(&mut session);
        assert!(outcome.passed);
        assert_eq!(outcome.rounds, 2);
    }

    #[test]
    fn a_waived_quiz_runs_exactly_one_round() {
        let assoc = assoc(5);
        let rounds = foreseen_rounds(&assoc, 13, 1);
        // Alternate right/wrong so the round cannot be perfect.
        let script = rounds[0]
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let side = if i % 2 == 0 {
                    q.target_side
                } else {
                    q.target_side.opposite()
                };
                Some((side, 0.4))
            })
            .collect();
        let mut session = scripted_session(script, 13);
        let outcome = Quiz::new(&assoc, false).run(&mut session);
        assert!(!outcome.passed);
        assert_eq!(outcome.rounds, 1);
        assert_eq!(outcome.score, outcome.total / 2);
    }

    #[test]
    fn timeouts_count_as_incorrect() {
        let assoc = assoc(6);
        let total = 16;
        let script = vec![None; total];
        let mut session = scripted_session(script, 17);
        let outcome = Quiz::new(&assoc, false).run(&mut session);
        assert!(!outcome.passed);
        assert_eq!(outcome.score, 0);
        assert_eq!(outcome.total, total);
    }
}
