//! Spatial and type-indexed registry of creatures.
//!
//! Three views of one entity set are kept consistent by every mutation:
//! the canonical id map, a coordinate index and a kind index. The registry
//! owns the entities; the world map knows nothing about them.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::SimulationError;
use crate::geometry::{Coords, Direction};
use crate::map::WorldMap;
use crate::rng::SystemRng;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct EntityId(u64);

impl EntityId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum EntityKind {
    Zombie,
    Human,
    Sound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Attitude {
    Wandering,
    Tracking,
    Sniffing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub at: Coords,
    pub kind: EntityKind,
    pub facing: Option<Direction>,
    pub attitude: Option<Attitude>,
    pub volume: Option<u8>,
}

/// Capability-shaped overrides applied at spawn time; anything left unset
/// falls back to the kind's defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityProps {
    pub facing: Option<Direction>,
    pub attitude: Option<Attitude>,
    pub volume: Option<u8>,
}

/// Movement destination: a direction resolves to the adjacent cell, a
/// coordinate is taken as-is.
#[derive(Debug, Clone, Copy)]
pub enum MoveTarget {
    Towards(Direction),
    To(Coords),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntityEvent {
    Spawned(Entity),
    Moved { entity: Entity, from: Coords },
}

#[derive(Debug, Default)]
pub struct EntityManager {
    next_id: u64,
    entities: BTreeMap<EntityId, Entity>,
    by_coords: BTreeMap<Coords, BTreeSet<EntityId>>,
    by_kind: BTreeMap<EntityKind, BTreeSet<EntityId>>,
    events: Vec<EntityEvent>,
}

impl EntityManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(
        &mut self,
        map: &WorldMap,
        kind: EntityKind,
        at: Coords,
        rng: &mut SystemRng<'_>,
    ) -> Result<Entity, SimulationError> {
        self.spawn_with(map, kind, at, EntityProps::default(), rng)
    }

    pub fn spawn_with(
        &mut self,
        map: &WorldMap,
        kind: EntityKind,
        at: Coords,
        props: EntityProps,
        rng: &mut SystemRng<'_>,
    ) -> Result<Entity, SimulationError> {
        if !map.in_bounds(at) {
            return Err(SimulationError::OutOfMap {
                at,
                size: map.size(),
            });
        }
        let (facing, attitude, volume) = match kind {
            EntityKind::Zombie => (
                props
                    .facing
                    .or_else(|| Some(Direction::ALL[rng.gen_range(0..Direction::ALL.len())])),
                props.attitude.or(Some(Attitude::Wandering)),
                None,
            ),
            EntityKind::Human => (props.facing, props.attitude, None),
            EntityKind::Sound => (None, None, props.volume.or(Some(1))),
        };
        let entity = Entity {
            id: self.allocate(),
            at,
            kind,
            facing,
            attitude,
            volume,
        };
        self.entities.insert(entity.id, entity.clone());
        self.by_coords.entry(at).or_default().insert(entity.id);
        self.by_kind.entry(kind).or_default().insert(entity.id);
        self.events.push(EntityEvent::Spawned(entity.clone()));
        Ok(entity)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_many(&self, ids: &[EntityId]) -> Vec<&Entity> {
        ids.iter().filter_map(|id| self.entities.get(id)).collect()
    }

    /// Every entity standing on `at`, in id order.
    pub fn at(&self, at: Coords) -> Vec<&Entity> {
        self.by_coords
            .get(&at)
            .map(|ids| ids.iter().filter_map(|id| self.entities.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn at_of_kind(&self, at: Coords, kind: EntityKind) -> Vec<&Entity> {
        self.at(at)
            .into_iter()
            .filter(|entity| entity.kind == kind)
            .collect()
    }

    pub fn of_kind(&self, kind: EntityKind) -> Vec<&Entity> {
        self.by_kind
            .get(&kind)
            .map(|ids| ids.iter().filter_map(|id| self.entities.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn of_kind_at(&self, kind: EntityKind, at: &[Coords]) -> Vec<&Entity> {
        self.of_kind(kind)
            .into_iter()
            .filter(|entity| at.contains(&entity.at))
            .collect()
    }

    /// Ids of one kind in ascending order, for deterministic iteration
    /// while mutating.
    pub fn ids_of_kind(&self, kind: EntityKind) -> Vec<EntityId> {
        self.by_kind
            .get(&kind)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn all(&self) -> Vec<&Entity> {
        self.entities.values().collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// True iff the destination is an in-bounds walkable cell; an
    /// out-of-map destination reads as "cannot move", never as an error.
    pub fn can_move(&self, map: &WorldMap, to: Coords) -> bool {
        map.is_walkable(to).unwrap_or(false)
    }

    /// Moves an entity towards a direction or onto explicit coordinates.
    /// A blocked destination leaves the entity unchanged without an event;
    /// an unknown id is a caller bug and fails hard.
    pub fn move_entity(
        &mut self,
        map: &WorldMap,
        id: EntityId,
        target: MoveTarget,
    ) -> Result<Entity, SimulationError> {
        let from = self
            .entities
            .get(&id)
            .ok_or(SimulationError::NotFound(id))?
            .at;
        let (to, heading) = match target {
            MoveTarget::Towards(direction) => {
                let (dx, dy) = direction.offset();
                (from.offset(dx, dy), Some(direction))
            }
            MoveTarget::To(coords) => (
                coords,
                Direction::from_offset(coords.x - from.x, coords.y - from.y),
            ),
        };
        if !self.can_move(map, to) {
            return Ok(self.entities[&id].clone());
        }

        if let Some(ids) = self.by_coords.get_mut(&from) {
            ids.remove(&id);
            if ids.is_empty() {
                self.by_coords.remove(&from);
            }
        }
        let entity = self.entities.get_mut(&id).expect("entity looked up above");
        entity.at = to;
        if entity.facing.is_some() {
            if let Some(direction) = heading {
                entity.facing = Some(direction);
            }
        }
        let moved = entity.clone();
        self.by_coords.entry(to).or_default().insert(id);
        self.events.push(EntityEvent::Moved {
            entity: moved.clone(),
            from,
        });
        Ok(moved)
    }

    pub fn set_attitude(
        &mut self,
        id: EntityId,
        attitude: Attitude,
    ) -> Result<(), SimulationError> {
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(SimulationError::NotFound(id))?;
        entity.attitude = Some(attitude);
        Ok(())
    }

    pub fn take_events(&mut self) -> Vec<EntityEvent> {
        std::mem::take(&mut self.events)
    }

    fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use crate::rng::RngManager;
    use crate::tiles::Tile;

    fn fixture() -> (WorldMap, EntityManager, RngManager) {
        (
            WorldMap::new(Size::new(5, 5)).unwrap(),
            EntityManager::new(),
            RngManager::new(1),
        )
    }

    #[test]
    fn zombies_spawn_with_facing_and_wandering_attitude() {
        let (map, mut entities, mut rng) = fixture();
        let zombie = entities
            .spawn(&map, EntityKind::Zombie, Coords::new(1, 1), &mut rng.stream("spawning"))
            .unwrap();
        assert!(zombie.facing.is_some());
        assert_eq!(zombie.attitude, Some(Attitude::Wandering));
        assert_eq!(zombie.volume, None);

        let sound = entities
            .spawn(&map, EntityKind::Sound, Coords::new(2, 2), &mut rng.stream("spawning"))
            .unwrap();
        assert_eq!(sound.volume, Some(1));
    }

    #[test]
    fn spawning_out_of_bounds_fails() {
        let (map, mut entities, mut rng) = fixture();
        let result = entities.spawn(
            &map,
            EntityKind::Human,
            Coords::new(9, 9),
            &mut rng.stream("spawning"),
        );
        assert!(matches!(result, Err(SimulationError::OutOfMap { .. })));
    }

    #[test]
    fn indices_stay_consistent_through_moves() {
        let (map, mut entities, mut rng) = fixture();
        let zombie = entities
            .spawn(&map, EntityKind::Zombie, Coords::new(0, 0), &mut rng.stream("spawning"))
            .unwrap();

        let moved = entities
            .move_entity(&map, zombie.id, MoveTarget::To(Coords::new(1, 0)))
            .unwrap();
        assert_eq!(moved.at, Coords::new(1, 0));
        assert_eq!(entities.get(zombie.id).unwrap().at, Coords::new(1, 0));
        assert!(entities.at(Coords::new(0, 0)).is_empty());
        let at_dest: Vec<EntityId> = entities
            .at(Coords::new(1, 0))
            .into_iter()
            .map(|entity| entity.id)
            .collect();
        assert_eq!(at_dest, vec![zombie.id]);
        assert_eq!(entities.of_kind(EntityKind::Zombie).len(), 1);
    }

    #[test]
    fn blocked_moves_are_silent_no_ops() {
        let (mut map, mut entities, mut rng) = fixture();
        map.add(&[Tile::Water], &[Coords::new(1, 0)]).unwrap();
        let zombie = entities
            .spawn(&map, EntityKind::Zombie, Coords::new(0, 0), &mut rng.stream("spawning"))
            .unwrap();
        entities.take_events();

        let unchanged = entities
            .move_entity(&map, zombie.id, MoveTarget::Towards(Direction::East))
            .unwrap();
        assert_eq!(unchanged.at, Coords::new(0, 0));
        assert!(entities.take_events().is_empty());

        // Off the map edge reads as blocked, not as an error.
        let unchanged = entities
            .move_entity(&map, zombie.id, MoveTarget::Towards(Direction::West))
            .unwrap();
        assert_eq!(unchanged.at, Coords::new(0, 0));
    }

    #[test]
    fn moving_an_unknown_id_is_a_hard_failure() {
        let (map, mut entities, mut rng) = fixture();
        let zombie = entities
            .spawn(&map, EntityKind::Zombie, Coords::new(0, 0), &mut rng.stream("spawning"))
            .unwrap();
        let bogus = EntityId(zombie.id.raw() + 100);
        let result = entities.move_entity(&map, bogus, MoveTarget::To(Coords::new(1, 1)));
        assert_eq!(result, Err(SimulationError::NotFound(bogus)));
    }

    #[test]
    fn direction_moves_update_facing() {
        let (map, mut entities, mut rng) = fixture();
        let zombie = entities
            .spawn(&map, EntityKind::Zombie, Coords::new(2, 2), &mut rng.stream("spawning"))
            .unwrap();

        let moved = entities
            .move_entity(&map, zombie.id, MoveTarget::Towards(Direction::South))
            .unwrap();
        assert_eq!(moved.facing, Some(Direction::South));

        let moved = entities
            .move_entity(&map, zombie.id, MoveTarget::To(Coords::new(3, 3)))
            .unwrap();
        assert_eq!(moved.facing, Some(Direction::East));
    }

    #[test]
    fn queries_never_error_on_unmatched_lookups() {
        let (map, mut entities, mut rng) = fixture();
        assert!(entities.get(EntityId(42)).is_none());
        assert!(entities.at(Coords::new(3, 3)).is_empty());
        assert!(entities.of_kind(EntityKind::Human).is_empty());

        entities
            .spawn(&map, EntityKind::Human, Coords::new(3, 3), &mut rng.stream("spawning"))
            .unwrap();
        entities
            .spawn(&map, EntityKind::Zombie, Coords::new(3, 3), &mut rng.stream("spawning"))
            .unwrap();
        assert_eq!(entities.at(Coords::new(3, 3)).len(), 2);
        assert_eq!(
            entities.at_of_kind(Coords::new(3, 3), EntityKind::Human).len(),
            1
        );
        assert_eq!(
            entities
                .of_kind_at(EntityKind::Zombie, &[Coords::new(3, 3), Coords::new(0, 0)])
                .len(),
            1
        );
    }
}
