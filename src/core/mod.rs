//! Pure sampling and combinatorics: no presentation, no timing, no I/O.

pub mod comparison;
pub mod pick;
pub mod stimuli;
pub mod walk;
