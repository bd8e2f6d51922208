//! Flattened result rows.
//!
//! Every executed stage contributes exactly one 18-column row. Stages that
//! never produced an outcome still contribute: a timed-out stage keeps its
//! presentation columns and fills the rest with `NA`, and a post stage
//! skipped after an uncertain timeout keeps only its type tags. Downstream
//! analysis counts on the column layout never varying.

use crate::task::plan::{PhaseKind, PostType, Side};

pub const RESULT_HEADER: &str = "phaseType,isPractice,blockNb,trialNb,trialType,postType,\
leftObjects,rightObjects,responseSide,responseTime,ghostSelected,ghostRejected,\
room1,rewardProbability1,isTreasure1,room2,rewardProbability2,isTreasure2";

pub const NA: &str = "NA";

/// Stage label in the `trialType` column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrialType {
    Standard,
    Uncertain,
    Post,
}

impl TrialType {
    pub fn as_str(self) -> &'static str {
        match self {
            TrialType::Standard => "standard",
            TrialType::Uncertain => "uncertain",
            TrialType::Post => "post",
        }
    }
}

/// One room opening: which room, the snapshot probability it was drawn
/// against, and whether treasure appeared.
#[derive(Clone, Debug, PartialEq)]
pub struct Reveal {
    pub room: String,
    pub probability: f64,
    pub treasure: bool,
}

/// Ghost resolution carried on uncertain rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GhostOutcome {
    pub selected: String,
    pub rejected: String,
}

/// The responded branch of a stage.
#[derive(Clone, Debug, PartialEq)]
pub struct StageResponse {
    pub side: Side,
    pub rt_seconds: f64,
    /// Present on uncertain rows only.
    pub ghost: Option<GhostOutcome>,
    pub reveals: [Reveal; 2],
}

/// Left/right column text. Uncertain stages concatenate the two object
/// names per side, top then bottom, with no separator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SideText {
    pub left: String,
    pub right: String,
}

/// One stage's contribution to the log, before the driver stamps phase and
/// numbering columns on it.
#[derive(Clone, Debug, PartialEq)]
pub struct StageRecord {
    pub trial_type: TrialType,
    pub post_type: Option<PostType>,
    /// `None` only on the skipped-post sentinel, which never presented.
    pub sides: Option<SideText>,
    pub response: Option<StageResponse>,
}

impl StageRecord {
    /// Sentinel for a post stage abandoned by an uncertain timeout. Only
    /// the type tags survive.
    pub fn skipped_post(post_type: PostType) -> Self {
        Self {
            trial_type: TrialType::Post,
            post_type: Some(post_type),
            sides: None,
            response: None,
        }
    }

    /// A stage that presented but saw no response inside the window.
    pub fn timed_out(trial_type: TrialType, post_type: Option<PostType>, sides: SideText) -> Self {
        Self {
            trial_type,
            post_type,
            sides: Some(sides),
            response: None,
        }
    }
}

/// A fully numbered row of the result log.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultRecord {
    pub phase: PhaseKind,
    pub practice: bool,
    pub block_nb: u32,
    pub trial_nb: u32,
    pub stage: StageRecord,
}

impl ResultRecord {
    pub fn csv_row(&self) -> String {
        let mut cols: Vec<String> = Vec::with_capacity(18);
        cols.push(self.phase.as_str().to_string());
        cols.push(if self.practice { "1" } else { "0" }.to_string());
        cols.push(self.block_nb.to_string());
        cols.push(self.trial_nb.to_string());
        cols.push(self.stage.trial_type.as_str().to_string());
        cols.push(match self.stage.post_type {
            Some(pt) => pt.as_str().to_string(),
            None => NA.to_string(),
        });
        match &self.stage.sides {
            Some(sides) => {
                cols.push(sides.left.clone());
                cols.push(sides.right.clone());
            }
            None => {
                cols.push(NA.to_string());
                cols.push(NA.to_string());
            }
        }
        match &self.stage.response {
            Some(resp) => {
                cols.push(resp.side.as_str().to_string());
                cols.push(fmt_decimal(resp.rt_seconds));
                match &resp.ghost {
                    Some(g) => {
                        cols.push(g.selected.clone());
                        cols.push(g.rejected.clone());
                    }
                    None => {
                        cols.push(NA.to_string());
                        cols.push(NA.to_string());
                    }
                }
                for reveal in &resp.reveals {
                    cols.push(reveal.room.clone());
                    cols.push(fmt_decimal(reveal.probability));
                    cols.push(if reveal.treasure { "1" } else { "0" }.to_string());
                }
            }
            None => {
                for _ in 0..10 {
                    cols.push(NA.to_string());
                }
            }
        }
        cols.join(",")
    }
}

/// Shortest round-trip decimal that always keeps a decimal point, so whole
/// probabilities render as `1.0` rather than `1`.
pub fn fmt_decimal(x: f64) -> String {
    let s = format!("{x}");
    if s.contains('.') || s.contains('e') || s.contains("NaN") || s.contains("inf") {
        s
    } else {
        format!("{s}.0")
    }
}
