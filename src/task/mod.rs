//! Trial execution: plans, the stage machine, and the phase driver.

pub mod driver;
pub mod machine;
pub mod plan;
pub mod planner;
pub mod quiz;
pub mod record;
pub mod session;
pub mod stage;
