//! The refresh use case.
//!
//! A pass gathers every dependency, halts if any needs a user edit, and
//! otherwise records the resolved [`CaseRecord`] and generates modulefiles
//! for the whitelist.

pub mod case;
pub mod orchestrator;

pub use case::CaseRecord;
pub use orchestrator::{ModuleOutcome, Orchestrator, Outcome, Phase, RefreshOptions};
