//! Tile tags, tileset composition rules and render-symbol resolution.
//!
//! A cell is described by a set of tags. Carrier tags are meaningful on
//! their own (terrain), sidekick tags only qualify a carrier (burning
//! state, building floor level, movement blockers). Two ordered rule
//! tables keep every stored tileset consistent: exclusion rules drop
//! conflicting tags, render rules map a combination to its presentation
//! symbol.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SimulationError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Tile {
    // Carriers.
    Grass,
    Forest,
    Road,
    Water,
    Building,
    Zombie,
    Human,
    // Sidekicks.
    Walkable,
    Block,
    TemporaryBlock,
    Burned,
    Burning,
    Level1,
    Level2,
    Level3,
    Level4,
    Level5,
}

impl Tile {
    pub fn is_carrier(self) -> bool {
        matches!(
            self,
            Tile::Grass
                | Tile::Forest
                | Tile::Road
                | Tile::Water
                | Tile::Building
                | Tile::Zombie
                | Tile::Human
        )
    }

    pub fn is_sidekick(self) -> bool {
        !self.is_carrier()
    }
}

/// Presentation-only identifier derived from a tile combination. Never
/// stored on the map.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum RenderTile {
    Grass,
    Forest,
    Road,
    Water,
    Building,
    Bridge,
    Fire,
    Ashes,
    Wall,
    Zombie,
    Human,
}

/// Unique, unordered set of tags occupying one cell.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tileset(BTreeSet<Tile>);

impl Tileset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tile: Tile) -> bool {
        self.0.insert(tile)
    }

    pub fn remove(&mut self, tile: Tile) -> bool {
        self.0.remove(&tile)
    }

    pub fn contains(&self, tile: Tile) -> bool {
        self.0.contains(&tile)
    }

    pub fn contains_all(&self, tiles: &[Tile]) -> bool {
        tiles.iter().all(|tile| self.0.contains(tile))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Tile> + '_ {
        self.0.iter().copied()
    }

    /// Tags present in `self` but not in `other`.
    pub fn difference(&self, other: &Tileset) -> Vec<Tile> {
        self.0.difference(&other.0).copied().collect()
    }
}

impl FromIterator<Tile> for Tileset {
    fn from_iter<I: IntoIterator<Item = Tile>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Tileset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (index, tile) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{tile:?}")?;
        }
        write!(f, "}}")
    }
}

/// Tags that cannot coexist, with the subset that survives the conflict.
pub struct ExclusionRule {
    pub conflicts: &'static [Tile],
    pub survivors: &'static [Tile],
}

/// Evaluated top-to-bottom; rules with more conflicting tags are declared
/// before subsets so composition does not depend on call order.
pub const EXCLUSION_RULES: &[ExclusionRule] = &[
    ExclusionRule {
        conflicts: &[Tile::Walkable, Tile::Block],
        survivors: &[],
    },
    ExclusionRule {
        conflicts: &[Tile::Building, Tile::Water],
        survivors: &[Tile::Water],
    },
    ExclusionRule {
        conflicts: &[Tile::Burning, Tile::Water],
        survivors: &[Tile::Water],
    },
    ExclusionRule {
        conflicts: &[Tile::TemporaryBlock, Tile::Water],
        survivors: &[Tile::Water],
    },
    ExclusionRule {
        conflicts: &[Tile::Burned, Tile::Water],
        survivors: &[Tile::Water],
    },
    ExclusionRule {
        conflicts: &[Tile::Burned, Tile::Burning],
        survivors: &[Tile::Burned],
    },
];

/// Maps a required tag combination to its render symbol.
pub struct RenderRule {
    pub requires: &'static [Tile],
    pub output: RenderTile,
}

/// Scanned in order for the first rule whose required tags are a subset of
/// the cell's tileset. Most specific combinations first: lengths must be
/// non-increasing (asserted by tests).
pub const RENDER_RULES: &[RenderRule] = &[
    RenderRule {
        requires: &[Tile::Water, Tile::Road, Tile::Walkable],
        output: RenderTile::Bridge,
    },
    RenderRule {
        requires: &[Tile::Water, Tile::Road],
        output: RenderTile::Bridge,
    },
    RenderRule {
        requires: &[Tile::Building, Tile::Level1],
        output: RenderTile::Building,
    },
    RenderRule {
        requires: &[Tile::Building, Tile::Level2],
        output: RenderTile::Building,
    },
    RenderRule {
        requires: &[Tile::Building, Tile::Level3],
        output: RenderTile::Building,
    },
    RenderRule {
        requires: &[Tile::Building, Tile::Level4],
        output: RenderTile::Building,
    },
    RenderRule {
        requires: &[Tile::Building, Tile::Level5],
        output: RenderTile::Building,
    },
    RenderRule {
        requires: &[Tile::Burning],
        output: RenderTile::Fire,
    },
    RenderRule {
        requires: &[Tile::Burned],
        output: RenderTile::Ashes,
    },
    RenderRule {
        requires: &[Tile::Block],
        output: RenderTile::Wall,
    },
    RenderRule {
        requires: &[Tile::Building],
        output: RenderTile::Building,
    },
    RenderRule {
        requires: &[Tile::Water],
        output: RenderTile::Water,
    },
    RenderRule {
        requires: &[Tile::Forest],
        output: RenderTile::Forest,
    },
    RenderRule {
        requires: &[Tile::Road],
        output: RenderTile::Road,
    },
    RenderRule {
        requires: &[Tile::Grass],
        output: RenderTile::Grass,
    },
    RenderRule {
        requires: &[Tile::Zombie],
        output: RenderTile::Zombie,
    },
    RenderRule {
        requires: &[Tile::Human],
        output: RenderTile::Human,
    },
];

/// Applies the exclusion rules in declared order; with `prune_orphans`,
/// additionally drops any sidekick tag not consumed by a render rule that
/// matches the current tileset (a floor level without its building is
/// meaningless and goes away).
pub fn sanitize(tiles: &Tileset, prune_orphans: bool) -> Tileset {
    let mut result = tiles.clone();
    for rule in EXCLUSION_RULES {
        if result.contains_all(rule.conflicts) {
            for &tile in rule.conflicts {
                result.remove(tile);
            }
            for &tile in rule.survivors {
                result.insert(tile);
            }
        }
    }
    if prune_orphans {
        let orphans: Vec<Tile> = result
            .iter()
            .filter(|tile| tile.is_sidekick())
            .filter(|&tile| {
                !RENDER_RULES.iter().any(|rule| {
                    rule.requires.contains(&tile) && result.contains_all(rule.requires)
                })
            })
            .collect();
        for tile in orphans {
            result.remove(tile);
        }
    }
    result
}

/// Resolves a tileset to its presentation symbol via the ordered rule
/// table. A combination without a matching rule is a defect in the table
/// and surfaces as an error instead of a silent default.
pub fn render_tile_for(tiles: &Tileset) -> Result<RenderTile, SimulationError> {
    RENDER_RULES
        .iter()
        .find(|rule| tiles.contains_all(rule.requires))
        .map(|rule| rule.output)
        .ok_or_else(|| SimulationError::UnknownRenderTile(tiles.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tileset(tiles: &[Tile]) -> Tileset {
        tiles.iter().copied().collect()
    }

    #[test]
    fn walkable_and_block_cancel_each_other() {
        let cleaned = sanitize(&tileset(&[Tile::Walkable, Tile::Block]), false);
        assert!(cleaned.is_empty());
    }

    #[test]
    fn water_beats_fire_states() {
        let cleaned = sanitize(&tileset(&[Tile::Water, Tile::Burning]), false);
        assert_eq!(cleaned, tileset(&[Tile::Water]));

        let cleaned = sanitize(&tileset(&[Tile::Water, Tile::Burned, Tile::Road]), false);
        assert_eq!(cleaned, tileset(&[Tile::Water, Tile::Road]));
    }

    #[test]
    fn burned_beats_burning() {
        let cleaned = sanitize(&tileset(&[Tile::Grass, Tile::Burned, Tile::Burning]), false);
        assert_eq!(cleaned, tileset(&[Tile::Grass, Tile::Burned]));
    }

    #[test]
    fn orphaned_floor_level_is_pruned() {
        let cleaned = sanitize(&tileset(&[Tile::Grass, Tile::Level3]), true);
        assert_eq!(cleaned, tileset(&[Tile::Grass]));

        let kept = sanitize(&tileset(&[Tile::Building, Tile::Level3]), true);
        assert_eq!(kept, tileset(&[Tile::Building, Tile::Level3]));
    }

    #[test]
    fn orphans_survive_without_pruning() {
        let kept = sanitize(&tileset(&[Tile::Grass, Tile::Level3]), false);
        assert_eq!(kept, tileset(&[Tile::Grass, Tile::Level3]));
    }

    #[test]
    fn render_rules_prefer_specific_combinations() {
        assert_eq!(
            render_tile_for(&tileset(&[Tile::Water, Tile::Road])).unwrap(),
            RenderTile::Bridge
        );
        assert_eq!(
            render_tile_for(&tileset(&[Tile::Water])).unwrap(),
            RenderTile::Water
        );
        assert_eq!(
            render_tile_for(&tileset(&[Tile::Grass, Tile::Burning])).unwrap(),
            RenderTile::Fire
        );
    }

    #[test]
    fn a_walkable_bridge_keeps_its_walkable_tag_through_pruning() {
        let bridge = tileset(&[Tile::Water, Tile::Road, Tile::Walkable]);
        assert_eq!(sanitize(&bridge, true), bridge);
        assert_eq!(render_tile_for(&bridge).unwrap(), RenderTile::Bridge);
    }

    #[test]
    fn unmatched_combination_is_an_error() {
        let result = render_tile_for(&tileset(&[Tile::Level3]));
        assert!(matches!(result, Err(SimulationError::UnknownRenderTile(_))));
    }

    #[test]
    fn rule_tables_are_ordered_most_specific_first() {
        let mut previous = usize::MAX;
        for rule in RENDER_RULES {
            assert!(
                rule.requires.len() <= previous,
                "render rule lengths must be non-increasing"
            );
            previous = rule.requires.len();
        }
        let mut previous = usize::MAX;
        for rule in EXCLUSION_RULES {
            assert!(rule.conflicts.len() <= previous);
            previous = rule.conflicts.len();
        }
    }
}
