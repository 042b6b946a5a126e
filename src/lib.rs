pub mod builder;
pub mod entities;
pub mod error;
pub mod geometry;
pub mod map;
pub mod outbreak;
pub mod pathfind;
pub mod resolvers;
pub mod rng;
pub mod scenario;
pub mod snapshot;
pub mod tiles;

pub use crate::error::SimulationError;
pub use crate::outbreak::{JoinPolicy, Outbreak, OutbreakSettings, TurnSummary, Wind};
pub use crate::scenario::{Scenario, ScenarioLoader};
