// src/core/mod.rs — Control loop core: types, policy, planning, events

pub mod events;
pub mod orchestrator;
pub mod planner;
pub mod policy;
pub mod types;

pub use orchestrator::{ControlLoop, LoopReport};
