//! Map builder contract: the only way a new game session obtains its
//! starting map and entities. Procedural (noise-based) builders live
//! outside the core and plug in through the same trait.

use crate::entities::{EntityKind, EntityManager};
use crate::error::SimulationError;
use crate::geometry::Size;
use crate::map::WorldMap;
use crate::rng::SystemRng;
use crate::scenario::Scenario;
use crate::tiles::Tile;

pub trait MapBuilder {
    /// Produces a fully sanitized map of the declared size.
    fn build_map(&self, rng: &mut SystemRng<'_>) -> Result<WorldMap, SimulationError>;

    /// Seeds the initial entities onto the freshly built map.
    fn populate(
        &self,
        entities: &mut EntityManager,
        map: &WorldMap,
        rng: &mut SystemRng<'_>,
    ) -> Result<(), SimulationError>;
}

/// Builder driven by explicit scenario data: painted terrain cells, spawn
/// lists and initial ignitions.
pub struct ScenarioBuilder {
    scenario: Scenario,
}

impl ScenarioBuilder {
    pub fn new(scenario: Scenario) -> Self {
        Self { scenario }
    }
}

impl MapBuilder for ScenarioBuilder {
    fn build_map(&self, _rng: &mut SystemRng<'_>) -> Result<WorldMap, SimulationError> {
        let scenario = &self.scenario;
        let mut map = WorldMap::new(Size::new(scenario.map.width, scenario.map.height))?;
        map.set_seeder(scenario.name.clone());
        for paint in &scenario.terrain {
            map.set(&paint.tiles, &paint.cells)?;
        }
        if !scenario.fires.is_empty() {
            map.add(&[Tile::Burning, Tile::TemporaryBlock], &scenario.fires)?;
        }
        Ok(map)
    }

    fn populate(
        &self,
        entities: &mut EntityManager,
        map: &WorldMap,
        rng: &mut SystemRng<'_>,
    ) -> Result<(), SimulationError> {
        for &at in &self.scenario.humans {
            entities.spawn(map, EntityKind::Human, at, rng)?;
        }
        for &at in &self.scenario.zombies {
            entities.spawn(map, EntityKind::Zombie, at, rng)?;
        }
        Ok(())
    }
}

/// Uniform all-grass map with no entities, handy for tests and demos.
pub struct FlatlandBuilder {
    pub size: Size,
}

impl FlatlandBuilder {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            size: Size::new(width, height),
        }
    }
}

impl MapBuilder for FlatlandBuilder {
    fn build_map(&self, _rng: &mut SystemRng<'_>) -> Result<WorldMap, SimulationError> {
        let mut map = WorldMap::new(self.size)?;
        map.set_seeder("flatland");
        Ok(map)
    }

    fn populate(
        &self,
        _entities: &mut EntityManager,
        _map: &WorldMap,
        _rng: &mut SystemRng<'_>,
    ) -> Result<(), SimulationError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Coords;
    use crate::rng::RngManager;
    use crate::scenario::Scenario;

    #[test]
    fn flatland_is_all_default_grass() {
        let mut rng = RngManager::new(0);
        let builder = FlatlandBuilder::new(4, 3);
        let map = builder.build_map(&mut rng.stream("builder")).unwrap();
        assert_eq!(map.size(), Size::new(4, 3));
        assert_eq!(map.seeder(), Some("flatland"));
        assert_eq!(map.iter().count(), 0);

        let mut entities = EntityManager::new();
        builder
            .populate(&mut entities, &map, &mut rng.stream("spawning"))
            .unwrap();
        assert!(entities.is_empty());
    }

    #[test]
    fn scenario_builder_paints_ignites_and_spawns() {
        let text = "\
name: seeded
seed: 2
map:
  width: 4
  height: 4
terrain:
  - tiles: [Water]
    cells:
      - { x: 0, y: 0 }
zombies:
  - { x: 3, y: 3 }
humans:
  - { x: 2, y: 2 }
fires:
  - { x: 1, y: 1 }
";
        let scenario = Scenario::from_str(text).unwrap();
        let builder = ScenarioBuilder::new(scenario);
        let mut rng = RngManager::new(2);
        let mut map = builder.build_map(&mut rng.stream("builder")).unwrap();
        assert_eq!(map.seeder(), Some("seeded"));
        assert!(map.get(Coords::new(0, 0)).unwrap().contains(Tile::Water));
        assert!(map.get(Coords::new(1, 1)).unwrap().contains(Tile::Burning));
        assert!(!map.take_events().is_empty());

        let mut entities = EntityManager::new();
        builder
            .populate(&mut entities, &map, &mut rng.stream("spawning"))
            .unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities.of_kind(EntityKind::Zombie).len(), 1);
    }
}
