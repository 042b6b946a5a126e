use thiserror::Error;

use crate::entities::EntityId;
use crate::geometry::{Coords, Size};
use crate::tiles::Tileset;

/// Failure taxonomy of the simulation core. No operation retries; every
/// error surfaces synchronously to the immediate caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("coordinate {at} is outside the {size} map")]
    OutOfMap { at: Coords, size: Size },

    #[error("unknown entity {0:?}")]
    NotFound(EntityId),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("no render rule matches tile combination {0}")]
    UnknownRenderTile(Tileset),
}
