//! Multi-source shortest-distance field over walkable cells.
//!
//! All edges weigh one step, so Dijkstra degenerates to a breadth-first
//! expansion: a FIFO frontier seeded from every source at once, each cell's
//! distance fixed the first time it is reached. The field is transient and
//! recomputed whenever a steering pass needs a fresh gradient.

use std::collections::{BTreeMap, VecDeque};

use crate::geometry::Coords;
use crate::map::WorldMap;

/// Expansion seed; `weight` is the starting distance recorded at the
/// source cell.
#[derive(Debug, Clone, Copy)]
pub struct Source {
    pub at: Coords,
    pub weight: u32,
}

impl From<Coords> for Source {
    fn from(at: Coords) -> Self {
        Self { at, weight: 0 }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DistanceField {
    distance: BTreeMap<Coords, u32>,
    predecessors: BTreeMap<Coords, Coords>,
}

impl DistanceField {
    /// Expands from all sources simultaneously over 4-connected walkable
    /// cells, optionally bounded by `max_distance`. Sources themselves are
    /// seeded even when their own cell is not walkable (a target standing
    /// on a blocked cell still attracts its neighbors).
    ///
    /// The first-visit rule is only minimal when every source starts at the
    /// same weight; mixed weights would need a priority frontier and are
    /// rejected in debug builds. A uniform non-zero weight merely offsets
    /// the whole field.
    pub fn calculate(
        map: &WorldMap,
        sources: &[Source],
        max_distance: Option<u32>,
    ) -> DistanceField {
        debug_assert!(
            sources
                .windows(2)
                .all(|pair| pair[0].weight == pair[1].weight),
            "sources must share one starting weight"
        );
        let mut field = DistanceField::default();
        let mut frontier = VecDeque::new();

        for source in sources {
            if !map.in_bounds(source.at) || field.distance.contains_key(&source.at) {
                continue;
            }
            field.distance.insert(source.at, source.weight);
            frontier.push_back(source.at);
        }

        while let Some(current) = frontier.pop_front() {
            let here = field.distance[&current];
            if max_distance.is_some_and(|bound| here >= bound) {
                continue;
            }
            let neighbors = match map.neighbor_coords(current, false) {
                Ok(neighbors) => neighbors,
                Err(_) => continue,
            };
            for neighbor in neighbors {
                if field.distance.contains_key(&neighbor) {
                    continue;
                }
                if !map.is_walkable(neighbor).unwrap_or(false) {
                    continue;
                }
                field.distance.insert(neighbor, here + 1);
                field.predecessors.insert(neighbor, current);
                frontier.push_back(neighbor);
            }
        }
        field
    }

    pub fn distance(&self, at: Coords) -> Option<u32> {
        self.distance.get(&at).copied()
    }

    pub fn predecessor(&self, at: Coords) -> Option<Coords> {
        self.predecessors.get(&at).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.distance.is_empty()
    }
}
