//! Wind-driven fire propagation.
//!
//! Each burning cell is an active flame with a lifetime taken from the
//! surface it ignited on. Every pass a flame rolls one spread attempt into
//! the wind cone and burns down by one; at zero lifetime the cell turns to
//! ash. Ignitions and ashes are applied as whole batches after the pass so
//! a flame born mid-pass cannot spread in the same turn.

use std::collections::BTreeMap;

use anyhow::Result;
use rand::Rng;

use crate::entities::EntityManager;
use crate::geometry::{project, Coords};
use crate::map::{TileEvent, WorldMap};
use crate::resolvers::{Resolver, TurnContext};
use crate::rng::SystemRng;
use crate::tiles::{Tile, Tileset};

/// Half-angle of the cone around the wind direction a flame can spread
/// into.
const SPREAD_CONE_DEGREES: f64 = 45.0;

/// Lifetime in turns by pre-ignition surface. Unlisted surfaces burn for
/// one turn.
const LIFETIMES: &[(Tile, u32)] = &[
    (Tile::Forest, 6),
    (Tile::Grass, 5),
    (Tile::Building, 3),
    (Tile::Road, 2),
];

#[derive(Debug, Clone, Copy)]
struct Flame {
    lifetime: u32,
}

#[derive(Debug, Default)]
pub struct FireResolver {
    flames: BTreeMap<Coords, Flame>,
}

impl FireResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_flames(&self) -> usize {
        self.flames.len()
    }

    fn lifetime_for(previous: &Tileset) -> u32 {
        LIFETIMES
            .iter()
            .find(|(tile, _)| previous.contains(*tile))
            .map(|&(_, lifetime)| lifetime)
            .unwrap_or(1)
    }
}

impl Resolver for FireResolver {
    fn name(&self) -> &'static str {
        "fire"
    }

    fn observe(&mut self, event: &TileEvent) {
        if let TileEvent::Added {
            at,
            added,
            previous,
        } = event
        {
            if added.contains(&Tile::Burning) && !self.flames.contains_key(at) {
                self.flames.insert(
                    *at,
                    Flame {
                        lifetime: Self::lifetime_for(previous),
                    },
                );
            }
        }
    }

    fn resolve(
        &mut self,
        ctx: &TurnContext,
        map: &mut WorldMap,
        _entities: &mut EntityManager,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let spread_chance = f64::from(ctx.wind.force.min(10)) * 0.1;
        let mut ignitions: Vec<Coords> = Vec::new();
        let mut ashes: Vec<Coords> = Vec::new();

        for (&at, flame) in self.flames.iter_mut() {
            let angle = ctx.wind.angle_degrees
                + rng.gen_range(-SPREAD_CONE_DEGREES..=SPREAD_CONE_DEGREES);
            let candidate = project(at, angle, 1);
            if map.in_bounds(candidate)
                && !map.get(candidate)?.contains(Tile::Burned)
                && rng.gen_bool(spread_chance)
                && !ignitions.contains(&candidate)
            {
                ignitions.push(candidate);
            }

            flame.lifetime = flame.lifetime.saturating_sub(1);
            if flame.lifetime == 0 {
                ashes.push(at);
            }
        }

        if !ignitions.is_empty() {
            map.add(&[Tile::Burning, Tile::TemporaryBlock], &ignitions)?;
        }
        if !ashes.is_empty() {
            map.replace(Tile::Burning, Some(Tile::Burned), &ashes)?;
            map.replace(Tile::TemporaryBlock, None, &ashes)?;
            for at in &ashes {
                self.flames.remove(at);
            }
        }
        Ok(())
    }
}
