//! Top-level experiment driver.
//!
//! Owns the stimulus assignment, the comparison set, and the single reward
//! walk shared by every phase, then runs each configured phase block by
//! block and stamps the stage records with phase and numbering columns.

use rand::Rng;
use tracing::{debug, info};

use crate::config::{ExperimentConfig, PhaseConfig};
use crate::core::comparison::{self, UncertaintyComparison};
use crate::core::stimuli::ObjectRoomAssociation;
use crate::core::walk::RewardWalk;
use crate::error::SetupError;
use crate::task::machine::TrialMachine;
use crate::task::planner;
use crate::task::record::ResultRecord;
use crate::task::session::Session;

#[derive(Debug)]
pub struct ExperimentDriver {
    config: ExperimentConfig,
    assoc: ObjectRoomAssociation,
    comparisons: Vec<UncertaintyComparison>,
    walk: RewardWalk,
    records: Vec<ResultRecord>,
    trial_nb: u32,
}

impl ExperimentDriver {
    /// Validates the configuration and draws the session-fixed material:
    /// association first, then comparisons, then walk starting points.
    pub fn new<R: Rng + ?Sized>(
        config: ExperimentConfig,
        rng: &mut R,
    ) -> Result<Self, SetupError> {
        config.validate()?;
        let assoc = ObjectRoomAssociation::build(&config.objects, &config.rooms, rng)?;
        let comparisons = comparison::select_comparisons(&assoc, rng)?;
        let walk = RewardWalk::initialize(&config.rooms, &config.walk.params(), rng)?;
        info!(
            objects = config.objects.len(),
            rooms = config.rooms.len(),
            comparisons = comparisons.len(),
            "experiment material drawn"
        );
        Ok(Self {
            config,
            assoc,
            comparisons,
            walk,
            records: Vec::new(),
            trial_nb: 0,
        })
    }

    pub fn association(&self) -> &ObjectRoomAssociation {
        &self.assoc
    }

    pub fn walk(&self) -> &RewardWalk {
        &self.walk
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    /// Runs every configured phase in order. Records accumulate across
    /// calls; the trial counter never resets.
    pub fn run(&mut self, session: &mut Session) {
        for phase in &self.config.phases {
            info!(
                phase = %phase.name,
                blocks = phase.blocks,
                trials = phase.trials,
                practice = phase.practice(),
                "phase start"
            );
            session.screen.announce(&intro_text(phase));
            let descriptor = phase.descriptor();
            for block in 1..=phase.blocks {
                session
                    .screen
                    .announce(&format!("Block {block} of {}.", phase.blocks));
                let plans = planner::plan_phase(
                    &descriptor,
                    &self.assoc,
                    &self.comparisons,
                    &mut self.walk,
                    &mut session.rng,
                );
                debug!(phase = %phase.name, block, plans = plans.len(), "block planned");
                let machine = TrialMachine::new(&self.assoc);
                for plan in &plans {
                    for stage in machine.run(plan, session) {
                        self.trial_nb += 1;
                        self.records.push(ResultRecord {
                            phase: phase.kind(),
                            practice: phase.practice(),
                            block_nb: block,
                            trial_nb: self.trial_nb,
                            stage,
                        });
                    }
                }
            }
        }
        session
            .screen
            .announce("That's the end of the experiment. Thank you for taking part!");
        info!(records = self.records.len(), "experiment complete");
    }
}

fn intro_text(phase: &PhaseConfig) -> String {
    if phase.practice() {
        format!(
            "Starting {}. This is a practice round, so take your time.",
            phase.name
        )
    } else {
        format!(
            "Starting {}. Respond within 2 seconds once the pictures appear.",
            phase.name
        )
    }
}
