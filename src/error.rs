//! Error types for configuration and setup.
//!
//! Setup is the only fallible region: once an experiment is built, running
//! trials and assembling records cannot fail.

use thiserror::Error;

/// Rejected configuration. Raised while loading or validating the config
/// file, before any random state is consumed.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("no [[phase]] entries configured")]
    NoPhases,

    #[error("phase {name:?}: blocks and trials per block must both be positive")]
    EmptyPhase { name: String },

    #[error("phase {name:?}: {trials} trials per block is not a multiple of 3")]
    TripletCount { name: String, trials: u32 },

    #[error("phases must include at least one experimental (non-practice) phase")]
    MissingPhaseKind,

    #[error("walk sigma must be finite and non-negative, got {0}")]
    WalkSigma(f64),

    #[error("walk mu must be finite, got {0}")]
    WalkMu(f64),
}

/// Failure while building the per-participant experiment materials.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error(
        "need matching, even counts of at least 4 distinct objects and rooms \
         (got {objects} objects, {rooms} rooms)"
    )]
    InvalidStimulusCount { objects: usize, rooms: usize },

    #[error("object/room assignment exhausted after {attempts} rebuild attempts")]
    AssignmentExhausted { attempts: u32 },

    #[error("the starting-probability grid holds {grid} values but {rooms} rooms each need one")]
    GridExhausted { grid: usize, rooms: usize },

    #[error("comparison sampling exhausted after {attempts} draws")]
    ComparisonExhausted { attempts: u32 },

    #[error(transparent)]
    Config(#[from] ConfigError),
}
