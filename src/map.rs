//! Sparse 2D tile store with bounds-checked mutation and a change journal.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::SimulationError;
use crate::geometry::{Coords, Direction, Size};
use crate::tiles::{sanitize, RenderTile, Tile, Tileset};

/// Change record appended by every effective mutation. The outbreak drains
/// the journal and hands records to resolver observers in emission order,
/// so listeners never re-enter a map method mid-mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum TileEvent {
    /// Tags appeared on a cell; `previous` is the tileset before the change.
    Added {
        at: Coords,
        added: Vec<Tile>,
        previous: Tileset,
    },
    /// Tags disappeared from a cell.
    Removed { at: Coords, removed: Vec<Tile> },
}

/// Sparse mapping from coordinates to sanitized tilesets. An absent cell
/// reads as the shared default `{Grass}` tileset. The map owns no
/// entities; entity-to-cell association lives in the entity registry.
#[derive(Debug, Clone)]
pub struct WorldMap {
    size: Size,
    cells: BTreeMap<Coords, Tileset>,
    default_tiles: Tileset,
    seeder: Option<String>,
    events: Vec<TileEvent>,
}

impl WorldMap {
    pub fn new(size: Size) -> Result<Self, SimulationError> {
        if size.width <= 0 || size.height <= 0 {
            return Err(SimulationError::InvalidArgument(format!(
                "map size must be positive, got {size}"
            )));
        }
        Ok(Self {
            size,
            cells: BTreeMap::new(),
            default_tiles: [Tile::Grass].into_iter().collect(),
            seeder: None,
            events: Vec::new(),
        })
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn seeder(&self) -> Option<&str> {
        self.seeder.as_deref()
    }

    pub fn set_seeder(&mut self, seeder: impl Into<String>) {
        self.seeder = Some(seeder.into());
    }

    pub fn in_bounds(&self, at: Coords) -> bool {
        self.size.contains(at)
    }

    fn check_bounds(&self, at: Coords) -> Result<(), SimulationError> {
        if self.in_bounds(at) {
            Ok(())
        } else {
            Err(SimulationError::OutOfMap {
                at,
                size: self.size,
            })
        }
    }

    /// Tileset at `at`; the shared default for unset cells. Callers must
    /// not assume exclusive ownership of the returned set.
    pub fn get(&self, at: Coords) -> Result<&Tileset, SimulationError> {
        self.check_bounds(at)?;
        Ok(self.cells.get(&at).unwrap_or(&self.default_tiles))
    }

    /// A cell is walkable when tagged `Walkable` outright, or when nothing
    /// on it blocks movement.
    pub fn is_walkable(&self, at: Coords) -> Result<bool, SimulationError> {
        let tiles = self.get(at)?;
        if tiles.contains(Tile::Walkable) {
            return Ok(true);
        }
        Ok(!tiles.contains(Tile::Block)
            && !tiles.contains(Tile::TemporaryBlock)
            && !tiles.contains(Tile::Water)
            && !tiles.contains(Tile::Building))
    }

    /// Merges `tiles` into each target cell, sanitizing the union. Returns
    /// how many cells actually changed; a merge whose additions cancel out
    /// against the existing set counts as unchanged and emits nothing.
    pub fn add(&mut self, tiles: &[Tile], at: &[Coords]) -> Result<usize, SimulationError> {
        let mut changed = 0;
        for &coords in at {
            self.check_bounds(coords)?;
            let previous = self
                .cells
                .get(&coords)
                .unwrap_or(&self.default_tiles)
                .clone();
            let mut merged = previous.clone();
            for &tile in tiles {
                merged.insert(tile);
            }
            let merged = sanitize(&merged, false);
            if merged == previous {
                continue;
            }
            let added = merged.difference(&previous);
            self.store(coords, merged);
            changed += 1;
            self.events.push(TileEvent::Added {
                at: coords,
                added,
                previous,
            });
        }
        Ok(changed)
    }

    /// Replaces each target cell wholesale with the sanitized, orphan-pruned
    /// tileset. An empty or default result removes the stored entry, which
    /// reverts the cell to the default. Both sides of the change are
    /// journaled: appearing tags as `Added`, dropped tags as `Removed`.
    pub fn set(&mut self, tiles: &[Tile], at: &[Coords]) -> Result<usize, SimulationError> {
        let replacement = sanitize(&tiles.iter().copied().collect(), true);
        let mut changed = 0;
        for &coords in at {
            self.check_bounds(coords)?;
            let previous = self
                .cells
                .get(&coords)
                .unwrap_or(&self.default_tiles)
                .clone();
            if replacement == previous {
                continue;
            }
            let added = replacement.difference(&previous);
            let removed = previous.difference(&replacement);
            self.store(coords, replacement.clone());
            changed += 1;
            if !added.is_empty() {
                self.events.push(TileEvent::Added {
                    at: coords,
                    added,
                    previous: previous.clone(),
                });
            }
            if !removed.is_empty() {
                self.events.push(TileEvent::Removed {
                    at: coords,
                    removed,
                });
            }
        }
        Ok(changed)
    }

    /// Removes a single tag from one cell. Returns whether the tag was
    /// present.
    pub fn remove(&mut self, tile: Tile, at: Coords) -> Result<bool, SimulationError> {
        self.check_bounds(at)?;
        let Some(stored) = self.cells.get_mut(&at) else {
            return Ok(false);
        };
        if !stored.remove(tile) {
            return Ok(false);
        }
        if stored.is_empty() {
            self.cells.remove(&at);
        }
        self.events.push(TileEvent::Removed {
            at,
            removed: vec![tile],
        });
        Ok(true)
    }

    /// Substitutes one tag for another on each target cell that carries it;
    /// a `None` replacement deletes the tag. Returns the count of cells
    /// changed.
    pub fn replace(
        &mut self,
        from: Tile,
        to: Option<Tile>,
        at: &[Coords],
    ) -> Result<usize, SimulationError> {
        let mut changed = 0;
        for &coords in at {
            self.check_bounds(coords)?;
            let Some(stored) = self.cells.get(&coords) else {
                continue;
            };
            if !stored.contains(from) {
                continue;
            }
            let previous = stored.clone();
            let mut updated = previous.clone();
            updated.remove(from);
            if let Some(tile) = to {
                updated.insert(tile);
            }
            let updated = sanitize(&updated, false);
            self.store(coords, updated.clone());
            changed += 1;
            match to {
                Some(_) => self.events.push(TileEvent::Added {
                    at: coords,
                    added: updated.difference(&previous),
                    previous,
                }),
                None => self.events.push(TileEvent::Removed {
                    at: coords,
                    removed: vec![from],
                }),
            }
        }
        Ok(changed)
    }

    /// The 8-neighborhood keyed by direction; out-of-bounds neighbors are
    /// silently skipped.
    pub fn get_around(
        &self,
        at: Coords,
    ) -> Result<BTreeMap<Direction, Tileset>, SimulationError> {
        self.check_bounds(at)?;
        let mut around = BTreeMap::new();
        for direction in Direction::ALL {
            let (dx, dy) = direction.offset();
            let neighbor = at.offset(dx, dy);
            if self.in_bounds(neighbor) {
                let tiles = self.cells.get(&neighbor).unwrap_or(&self.default_tiles);
                around.insert(direction, tiles.clone());
            }
        }
        Ok(around)
    }

    /// 4- or 8-connected neighbor coordinates, clipped at the map edge.
    pub fn neighbor_coords(
        &self,
        at: Coords,
        include_diagonals: bool,
    ) -> Result<Vec<Coords>, SimulationError> {
        self.check_bounds(at)?;
        let offsets: &[(i32, i32)] = if include_diagonals {
            &[
                (1, 0),
                (1, 1),
                (0, 1),
                (-1, 1),
                (-1, 0),
                (-1, -1),
                (0, -1),
                (1, -1),
            ]
        } else {
            &[(1, 0), (0, 1), (-1, 0), (0, -1)]
        };
        Ok(offsets
            .iter()
            .map(|&(dx, dy)| at.offset(dx, dy))
            .filter(|&neighbor| self.in_bounds(neighbor))
            .collect())
    }

    /// Crops a sub-map of odd `surface` dimensions centered on `center`,
    /// clipped to the parent bounds. Stored cells are rebased to the
    /// sub-map origin.
    pub fn extract(&self, center: Coords, surface: Size) -> Result<WorldMap, SimulationError> {
        self.check_bounds(center)?;
        if surface.width <= 0 || surface.height <= 0 {
            return Err(SimulationError::InvalidArgument(format!(
                "extract surface must be positive, got {surface}"
            )));
        }
        if surface.width % 2 == 0 || surface.height % 2 == 0 {
            return Err(SimulationError::InvalidArgument(format!(
                "extract surface dimensions must be odd, got {surface}"
            )));
        }
        let half_width = surface.width / 2;
        let half_height = surface.height / 2;
        let min_x = (center.x - half_width).max(0);
        let min_y = (center.y - half_height).max(0);
        let max_x = (center.x + half_width).min(self.size.width - 1);
        let max_y = (center.y + half_height).min(self.size.height - 1);

        let mut cropped = WorldMap::new(Size::new(max_x - min_x + 1, max_y - min_y + 1))?;
        cropped.seeder = self.seeder.clone();
        for (&at, tiles) in &self.cells {
            if at.x >= min_x && at.x <= max_x && at.y >= min_y && at.y <= max_y {
                cropped
                    .cells
                    .insert(Coords::new(at.x - min_x, at.y - min_y), tiles.clone());
            }
        }
        Ok(cropped)
    }

    /// Iterates only over cells holding a non-default stored tileset.
    pub fn iter(&self) -> impl Iterator<Item = (Coords, &Tileset)> {
        self.cells.iter().map(|(&at, tiles)| (at, tiles))
    }

    /// Drains the change journal in emission order.
    pub fn take_events(&mut self) -> Vec<TileEvent> {
        std::mem::take(&mut self.events)
    }

    fn store(&mut self, at: Coords, tiles: Tileset) {
        if tiles.is_empty() || tiles == self.default_tiles {
            self.cells.remove(&at);
        } else {
            self.cells.insert(at, tiles);
        }
    }
}

/// One stored cell, used by wire snapshots. Carries both the raw tags and
/// the resolved render symbol so clients need no rule table of their own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub at: Coords,
    pub tiles: Vec<Tile>,
    pub render: RenderTile,
}
