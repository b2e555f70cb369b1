pub mod commands;
pub mod config;
pub mod pipeline;
pub mod state;
pub mod translate;

pub use pipeline::{Outcome, Pipeline};
