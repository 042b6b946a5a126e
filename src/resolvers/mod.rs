//! Per-turn resolution passes. A resolver is a stateful unit bound to one
//! outbreak; the turn loop runs them in declared order against the shared
//! map and entity registry and feeds them map change events in between.

mod fire;
mod zombie;

pub use fire::FireResolver;
pub use zombie::ZombieResolver;

use anyhow::Result;

use crate::entities::EntityManager;
use crate::map::{TileEvent, WorldMap};
use crate::outbreak::Wind;
use crate::rng::SystemRng;

pub struct TurnContext {
    pub turn: u64,
    pub wind: Wind,
    pub detection_radius: u32,
}

pub trait Resolver {
    fn name(&self) -> &'static str;

    /// Synchronous observation of a map change; called between mutation
    /// passes, never re-entrantly from inside one.
    fn observe(&mut self, _event: &TileEvent) {}

    fn resolve(
        &mut self,
        ctx: &TurnContext,
        map: &mut WorldMap,
        entities: &mut EntityManager,
        rng: &mut SystemRng<'_>,
    ) -> Result<()>;
}
