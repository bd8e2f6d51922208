//! Experiment configuration: stimuli, walk parameters, quiz switches, and
//! the ordered phase list.
//!
//! Phase order is meaningful. The reward walk keeps evolving across
//! phases, so `[[phase]]` entries run exactly in file order.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::core::walk::WalkParams;
use crate::error::ConfigError;
use crate::task::plan::{PhaseDescriptor, PhaseKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Master seed for the experiment stream. Absent means draw one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default = "ExperimentConfig::default_objects")]
    pub objects: Vec<String>,
    #[serde(default = "ExperimentConfig::default_rooms")]
    pub rooms: Vec<String>,
    #[serde(default)]
    pub walk: WalkSection,
    #[serde(default)]
    pub quiz: QuizSection,
    #[serde(default = "ExperimentConfig::default_phases", rename = "phase")]
    pub phases: Vec<PhaseConfig>,
}

impl ExperimentConfig {
    fn default_objects() -> Vec<String> {
        ["key", "light", "phone", "stove"]
            .map(String::from)
            .to_vec()
    }

    fn default_rooms() -> Vec<String> {
        ["pink", "blue", "green", "brown"]
            .map(String::from)
            .to_vec()
    }

    fn default_phases() -> Vec<PhaseConfig> {
        vec![
            PhaseConfig::new("standardPractice", 1, 6),
            PhaseConfig::new("standardExperimental", 2, 12),
            PhaseConfig::new("tripletPractice", 1, 3),
            PhaseConfig::new("tripletExperimental", 2, 12),
        ]
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            seed: None,
            objects: Self::default_objects(),
            rooms: Self::default_rooms(),
            walk: WalkSection::default(),
            quiz: QuizSection::default(),
            phases: Self::default_phases(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WalkSection {
    #[serde(default = "WalkSection::default_mu")]
    pub mu: f64,
    #[serde(default = "WalkSection::default_sigma")]
    pub sigma: f64,
}

impl WalkSection {
    fn default_mu() -> f64 {
        0.0
    }

    fn default_sigma() -> f64 {
        0.025
    }

    pub fn params(&self) -> WalkParams {
        WalkParams {
            mu: self.mu,
            sigma: self.sigma,
        }
    }
}

impl Default for WalkSection {
    fn default() -> Self {
        Self {
            mu: Self::default_mu(),
            sigma: Self::default_sigma(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuizSection {
    /// Run the association quiz before the trial phases.
    #[serde(default = "QuizSection::default_enabled")]
    pub enabled: bool,
    /// Repeat the quiz until a perfect round. Off by default so a
    /// simulated participant cannot loop forever; lab configs turn it on.
    #[serde(default = "QuizSection::default_must_pass")]
    pub must_pass: bool,
}

impl QuizSection {
    fn default_enabled() -> bool {
        true
    }

    fn default_must_pass() -> bool {
        false
    }
}

impl Default for QuizSection {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            must_pass: Self::default_must_pass(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseConfig {
    pub name: String,
    pub blocks: u32,
    /// Trials per block.
    pub trials: u32,
}

impl PhaseConfig {
    pub fn new(name: impl Into<String>, blocks: u32, trials: u32) -> Self {
        Self {
            name: name.into(),
            blocks,
            trials,
        }
    }

    /// Phase family from the name: a `standard` substring marks a standard
    /// phase, anything else runs triplets.
    pub fn kind(&self) -> PhaseKind {
        if self.name.contains("standard") {
            PhaseKind::Standard
        } else {
            PhaseKind::Triplet
        }
    }

    /// A `Practice` substring relaxes the response windows.
    pub fn practice(&self) -> bool {
        self.name.contains("Practice")
    }

    pub fn descriptor(&self) -> PhaseDescriptor {
        PhaseDescriptor {
            kind: self.kind(),
            trials: self.trials,
            practice: self.practice(),
        }
    }
}

impl ExperimentConfig {
    /// Full validation; any failure is fatal before a single stage runs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.phases.is_empty() {
            return Err(ConfigError::NoPhases);
        }
        for phase in &self.phases {
            if phase.blocks == 0 || phase.trials == 0 {
                return Err(ConfigError::EmptyPhase {
                    name: phase.name.clone(),
                });
            }
            if phase.kind() == PhaseKind::Triplet && phase.trials % 3 != 0 {
                return Err(ConfigError::TripletCount {
                    name: phase.name.clone(),
                    trials: phase.trials,
                });
            }
        }
        if self.phases.iter().all(|p| p.practice()) {
            return Err(ConfigError::MissingPhaseKind);
        }
        if !self.walk.sigma.is_finite() || self.walk.sigma < 0.0 {
            return Err(ConfigError::WalkSigma(self.walk.sigma));
        }
        if !self.walk.mu.is_finite() {
            return Err(ConfigError::WalkMu(self.walk.mu));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(toml::from_str(&text)?)
    }

    /// Loads the file, or writes the defaults there first when it does not
    /// exist yet.
    pub fn load_or_init(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::load(path);
        }
        let config = Self::default();
        let text = format!(
            "# ghostwalk experiment configuration\n\n{}",
            toml::to_string_pretty(&config)?
        );
        fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        info!("wrote default config to {}", path.display());
        Ok(config)
    }
}
