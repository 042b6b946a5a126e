//! Zombie steering: follow the human gradient field, else wander.

use anyhow::Result;
use rand::Rng;

use crate::entities::{Attitude, EntityId, EntityKind, EntityManager, MoveTarget};
use crate::geometry::{Coords, Direction};
use crate::map::WorldMap;
use crate::pathfind::{DistanceField, Source};
use crate::resolvers::{Resolver, TurnContext};
use crate::rng::SystemRng;

/// Wander deviations relative to the current facing, widening left/right
/// pairs. The facing itself is never a candidate: a wandering zombie always
/// veers. Each magnitude counts as one step attempt, three attempts total.
const WANDER_DEVIATIONS: &[f64] = &[-45.0, 45.0, -90.0, 90.0, -135.0, 135.0];

#[derive(Debug, Default)]
pub struct ZombieResolver;

impl ZombieResolver {
    pub fn new() -> Self {
        Self
    }

    /// Probes walkable directions around the facing, left before right at
    /// each widening magnitude; a fully boxed-in zombie stays in place.
    fn wander(
        map: &WorldMap,
        entities: &mut EntityManager,
        id: EntityId,
        facing: Direction,
    ) -> Result<()> {
        for &deviation in WANDER_DEVIATIONS {
            let direction = facing.rotated(deviation);
            let (dx, dy) = direction.offset();
            let candidate = entities
                .get(id)
                .map(|entity| entity.at.offset(dx, dy));
            let Some(candidate) = candidate else {
                return Ok(());
            };
            if map.is_walkable(candidate).unwrap_or(false) {
                entities.move_entity(map, id, MoveTarget::Towards(direction))?;
                return Ok(());
            }
        }
        Ok(())
    }
}

impl Resolver for ZombieResolver {
    fn name(&self) -> &'static str {
        "zombies"
    }

    fn resolve(
        &mut self,
        ctx: &TurnContext,
        map: &mut WorldMap,
        entities: &mut EntityManager,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let targets: Vec<Source> = entities
            .of_kind(EntityKind::Human)
            .into_iter()
            .map(|human| human.at.into())
            .collect();
        let field = DistanceField::calculate(map, &targets, Some(ctx.detection_radius));

        for id in entities.ids_of_kind(EntityKind::Zombie) {
            let Some(zombie) = entities.get(id) else {
                continue;
            };
            let at = zombie.at;
            let facing = zombie.facing.unwrap_or(Direction::North);

            // Walkable neighbors carrying the smallest recorded distance.
            let mut best: Vec<Coords> = Vec::new();
            let mut best_distance = u32::MAX;
            for neighbor in map.neighbor_coords(at, false)? {
                if !map.is_walkable(neighbor).unwrap_or(false) {
                    continue;
                }
                let Some(distance) = field.distance(neighbor) else {
                    continue;
                };
                if distance < best_distance {
                    best_distance = distance;
                    best.clear();
                }
                if distance == best_distance {
                    best.push(neighbor);
                }
            }

            if best.is_empty() {
                entities.set_attitude(id, Attitude::Wandering)?;
                Self::wander(map, entities, id, facing)?;
            } else {
                let chosen = best[rng.gen_range(0..best.len())];
                entities.set_attitude(id, Attitude::Tracking)?;
                entities.move_entity(map, id, MoveTarget::To(chosen))?;
            }
        }
        Ok(())
    }
}
