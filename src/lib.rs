// src/lib.rs — Library root for pulsewatch

pub mod classifier;
pub mod cli;
pub mod core;
pub mod evaluator;
pub mod infra;
pub mod notify;
pub mod source;
pub mod worker;
