//! One game session's full simulated state and its turn loop.

use std::time::Instant;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::builder::MapBuilder;
use crate::entities::{Entity, EntityEvent, EntityManager};
use crate::error::SimulationError;
use crate::geometry::{Coords, Size};
use crate::map::{CellSnapshot, WorldMap};
use crate::resolvers::{FireResolver, Resolver, TurnContext, ZombieResolver};
use crate::rng::RngManager;
use crate::tiles::{render_tile_for, RenderTile};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub angle_degrees: f64,
    /// Spread strength, 0..=10; each point adds 10% ignition probability.
    pub force: u8,
}

impl Wind {
    pub fn new(angle_degrees: f64, force: u8) -> Self {
        Self {
            angle_degrees,
            force: force.min(10),
        }
    }
}

/// What to do with a join request arriving after the game has started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinPolicy {
    /// Silently refuse; `join_player` reports `false`.
    #[default]
    Ignore,
    /// Fail explicitly with `InvalidArgument`.
    Reject,
}

pub struct OutbreakSettings {
    pub game_id: String,
    pub seed: u64,
    pub wind: Wind,
    pub detection_radius: u32,
    pub join_policy: JoinPolicy,
}

#[derive(Debug, Clone)]
pub struct ResolverRunReport {
    pub name: &'static str,
    pub duration_ms: f64,
}

/// Payload of a resolved turn, handed to the transport layer.
#[derive(Debug, Clone)]
pub struct TurnSummary {
    pub game_id: String,
    pub turn: u64,
    pub reports: Vec<ResolverRunReport>,
}

/// Wire-representable state pushed to clients; the exact shape is a
/// contract with the transport layer, not a core concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutbreakSnapshot {
    pub game_id: String,
    pub turn: u64,
    pub size: Size,
    pub wind: Wind,
    pub players: Vec<String>,
    pub cells: Vec<CellSnapshot>,
    pub entities: Vec<Entity>,
}

pub struct Outbreak {
    game_id: String,
    map: WorldMap,
    entities: EntityManager,
    wind: Wind,
    resolvers: Vec<Box<dyn Resolver>>,
    rng: RngManager,
    turn: u64,
    players: Vec<String>,
    join_policy: JoinPolicy,
    detection_radius: u32,
}

impl Outbreak {
    /// Builds a session from a map builder: the builder produces the
    /// sanitized map and seeds the initial entities, then the fixed
    /// resolver chain (fire before zombies) is attached and any map events
    /// produced during building are dispatched to it.
    pub fn new(
        settings: OutbreakSettings,
        builder: &dyn MapBuilder,
    ) -> Result<Self, SimulationError> {
        let mut rng = RngManager::new(settings.seed);
        let map = builder.build_map(&mut rng.stream("builder"))?;
        let mut entities = EntityManager::new();
        builder.populate(&mut entities, &map, &mut rng.stream("spawning"))?;

        let resolvers: Vec<Box<dyn Resolver>> = vec![
            Box::new(FireResolver::new()),
            Box::new(ZombieResolver::new()),
        ];
        let mut outbreak = Self {
            game_id: settings.game_id,
            map,
            entities,
            wind: settings.wind,
            resolvers,
            rng,
            turn: 0,
            players: Vec::new(),
            join_policy: settings.join_policy,
            detection_radius: settings.detection_radius,
        };
        outbreak.dispatch_events();
        Ok(outbreak)
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    /// Current turn; 0 means the game has not started.
    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn wind(&self) -> Wind {
        self.wind
    }

    pub fn map(&self) -> &WorldMap {
        &self.map
    }

    pub fn entities(&self) -> &EntityManager {
        &self.entities
    }

    pub fn players(&self) -> &[String] {
        &self.players
    }

    /// Joining is a pre-game lobby operation. After the first turn the
    /// configured policy decides between a silent refusal and an explicit
    /// error.
    pub fn join_player(&mut self, player: &str) -> Result<bool, SimulationError> {
        if self.turn > 0 {
            return match self.join_policy {
                JoinPolicy::Ignore => Ok(false),
                JoinPolicy::Reject => Err(SimulationError::InvalidArgument(format!(
                    "game {} already started, cannot join",
                    self.game_id
                ))),
            };
        }
        if !self.players.iter().any(|existing| existing == player) {
            self.players.push(player.to_string());
        }
        Ok(true)
    }

    /// Runs every resolver once in declared order, dispatching journaled
    /// map events between passes, then advances and returns the turn
    /// counter. A resolver failure aborts the turn without rollback.
    pub fn resolve_turn(&mut self) -> Result<TurnSummary> {
        self.dispatch_events();
        let mut reports = Vec::with_capacity(self.resolvers.len());
        for index in 0..self.resolvers.len() {
            let ctx = TurnContext {
                turn: self.turn,
                wind: self.wind,
                detection_radius: self.detection_radius,
            };
            let start = Instant::now();
            let name = {
                let resolver = &mut self.resolvers[index];
                let mut stream = self.rng.stream(resolver.name());
                resolver.resolve(&ctx, &mut self.map, &mut self.entities, &mut stream)?;
                resolver.name()
            };
            reports.push(ResolverRunReport {
                name,
                duration_ms: start.elapsed().as_secs_f64() * 1_000.0,
            });
            self.dispatch_events();
        }
        self.turn += 1;
        Ok(TurnSummary {
            game_id: self.game_id.clone(),
            turn: self.turn,
            reports,
        })
    }

    /// Entity change journal for external consumers (state diffing).
    pub fn take_entity_events(&mut self) -> Vec<EntityEvent> {
        self.entities.take_events()
    }

    /// Human-readable grid snapshot: render symbols with entities overlaid.
    pub fn render(&self) -> Result<String, SimulationError> {
        let size = self.map.size();
        let mut out = String::with_capacity((size.width as usize + 1) * size.height as usize);
        for y in 0..size.height {
            for x in 0..size.width {
                let at = Coords::new(x, y);
                let occupants = self.entities.at(at);
                let symbol = if let Some(entity) = occupants.first() {
                    entity_symbol(entity)
                } else {
                    render_symbol(render_tile_for(self.map.get(at)?)?)
                };
                out.push(symbol);
            }
            out.push('\n');
        }
        Ok(out)
    }

    /// Full-state snapshot for serialization to clients.
    pub fn snapshot(&self) -> Result<OutbreakSnapshot, SimulationError> {
        let cells = self
            .map
            .iter()
            .map(|(at, tiles)| {
                Ok(CellSnapshot {
                    at,
                    tiles: tiles.iter().collect(),
                    render: render_tile_for(tiles)?,
                })
            })
            .collect::<Result<Vec<_>, SimulationError>>()?;
        let entities = self.entities.all().into_iter().cloned().collect();
        Ok(OutbreakSnapshot {
            game_id: self.game_id.clone(),
            turn: self.turn,
            size: self.map.size(),
            wind: self.wind,
            players: self.players.clone(),
            cells,
            entities,
        })
    }

    fn dispatch_events(&mut self) {
        let events = self.map.take_events();
        for event in &events {
            for resolver in &mut self.resolvers {
                resolver.observe(event);
            }
        }
    }
}

fn entity_symbol(entity: &Entity) -> char {
    match entity.kind {
        crate::entities::EntityKind::Zombie => 'Z',
        crate::entities::EntityKind::Human => 'H',
        crate::entities::EntityKind::Sound => 'o',
    }
}

fn render_symbol(tile: RenderTile) -> char {
    match tile {
        RenderTile::Grass => '.',
        RenderTile::Forest => 'F',
        RenderTile::Road => '=',
        RenderTile::Water => '~',
        RenderTile::Building => 'B',
        RenderTile::Bridge => '+',
        RenderTile::Fire => '*',
        RenderTile::Ashes => 'x',
        RenderTile::Wall => '#',
        RenderTile::Zombie => 'z',
        RenderTile::Human => 'h',
    }
}
