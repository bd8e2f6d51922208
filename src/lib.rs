//! Trial engine for a multi-phase treasure-room experiment: seeded
//! stimulus assignment, a bounded reward walk, counterbalanced trial
//! plans, and a stage machine with a yoked ghost player.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod report;
pub mod task;
