pub mod actions;
pub mod agent;
pub mod flow;
pub mod generator;
pub mod map_reader;
pub mod motion;
pub mod params;
pub mod policy;
pub mod state;

pub use agent::{Episode, EpisodeSummary, Navigator, TickReport};
pub use flow::{FlowField, FlowVector, GridPoint};
pub use motion::TickOutcome;
