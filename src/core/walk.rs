//! Per-room reward probabilities evolving as a bounded Gaussian random walk.
//!
//! Every room carries a latent probability of holding treasure. Starting
//! values are drawn without replacement from a fixed decimal grid so no two
//! rooms start equal; each increment event nudges every room by a normal
//! draw, redrawing any step that would leave [0, 1]. The full per-room
//! history is kept for the walk report.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::core::pick;
use crate::error::{ConfigError, SetupError};

/// Drift and step size of the walk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WalkParams {
    pub mu: f64,
    pub sigma: f64,
}

impl Default for WalkParams {
    fn default() -> Self {
        Self {
            mu: 0.0,
            sigma: 0.025,
        }
    }
}

/// Starting values: 0.25 to 0.70 inclusive, step 0.05. Kept away from the
/// [0, 1] edges so early increments rarely need a redraw.
fn starting_grid() -> Vec<f64> {
    (0..10).map(|k| (25 + 5 * k) as f64 / 100.0).collect()
}

/// Frozen copy of every room's probability at one instant. Plans carry
/// these so trial execution never reads the live walk.
#[derive(Clone, Debug, PartialEq)]
pub struct RewardSnapshot {
    entries: Vec<(String, f64)>,
}

impl RewardSnapshot {
    pub fn new(entries: Vec<(String, f64)>) -> Self {
        Self { entries }
    }

    pub fn probability(&self, room: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(name, _)| name == room)
            .map(|(_, p)| *p)
    }

    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }
}

#[derive(Clone, Debug)]
pub struct RewardWalk {
    rooms: Vec<String>,
    current: Vec<f64>,
    history: Vec<Vec<f64>>,
    step: Normal<f64>,
}

impl RewardWalk {
    /// Draws a distinct starting probability per room and records it as
    /// history index 0.
    pub fn initialize<R: Rng + ?Sized>(
        rooms: &[String],
        params: &WalkParams,
        rng: &mut R,
    ) -> Result<Self, SetupError> {
        let step = Normal::new(params.mu, params.sigma)
            .map_err(|_| ConfigError::WalkSigma(params.sigma))?;
        let mut grid = starting_grid();
        if rooms.len() > grid.len() {
            return Err(SetupError::GridExhausted {
                grid: grid.len(),
                rooms: rooms.len(),
            });
        }
        let mut current = Vec::with_capacity(rooms.len());
        let mut history = Vec::with_capacity(rooms.len());
        for _ in rooms {
            let start = pick::pop_choice(&mut grid, rng).ok_or(SetupError::GridExhausted {
                grid: starting_grid().len(),
                rooms: rooms.len(),
            })?;
            current.push(start);
            history.push(vec![start]);
        }
        Ok(Self {
            rooms: rooms.to_vec(),
            current,
            history,
            step,
        })
    }

    /// One increment event: every room takes one in-range Gaussian step, in
    /// room order, each appended to its history.
    pub fn increment<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for (p, history) in self.current.iter_mut().zip(self.history.iter_mut()) {
            loop {
                let next = *p + self.step.sample(rng);
                if (0.0..=1.0).contains(&next) {
                    *p = next;
                    break;
                }
            }
            history.push(*p);
        }
    }

    pub fn snapshot(&self) -> RewardSnapshot {
        RewardSnapshot {
            entries: self
                .rooms
                .iter()
                .cloned()
                .zip(self.current.iter().copied())
                .collect(),
        }
    }

    pub fn rooms(&self) -> &[String] {
        &self.rooms
    }

    /// Number of recorded instants, the starting row included.
    pub fn history_len(&self) -> usize {
        self.history.first().map_or(0, Vec::len)
    }

    pub fn room_history(&self, room: &str) -> Option<&[f64]> {
        self.rooms
            .iter()
            .position(|r| r == room)
            .map(|idx| self.history[idx].as_slice())
    }

    /// Every room with its full trace, in room order.
    pub fn histories(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.rooms
            .iter()
            .map(String::as_str)
            .zip(self.history.iter().map(Vec::as_slice))
    }
}
