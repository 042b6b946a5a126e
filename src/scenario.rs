//! YAML scenario files: seed, map size, wind, terrain paints and spawn
//! lists for one game session.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::builder::ScenarioBuilder;
use crate::error::SimulationError;
use crate::geometry::{Coords, Size};
use crate::outbreak::{JoinPolicy, Outbreak, OutbreakSettings, Wind};
use crate::tiles::Tile;

fn default_detection_radius() -> u32 {
    8
}

fn default_snapshot_interval_turns() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default)]
    pub turns: Option<u64>,
    pub map: MapSettings,
    #[serde(default)]
    pub wind: WindSettings,
    #[serde(default = "default_detection_radius")]
    pub detection_radius: u32,
    #[serde(default)]
    pub join_policy: JoinPolicy,
    #[serde(default)]
    pub terrain: Vec<TerrainPaint>,
    #[serde(default)]
    pub zombies: Vec<Coords>,
    #[serde(default)]
    pub humans: Vec<Coords>,
    #[serde(default)]
    pub fires: Vec<Coords>,
    #[serde(default = "default_snapshot_interval_turns")]
    pub snapshot_interval_turns: u64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MapSettings {
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WindSettings {
    #[serde(default)]
    pub angle_degrees: f64,
    #[serde(default = "default_wind_force")]
    pub force: u8,
}

fn default_wind_force() -> u8 {
    5
}

impl Default for WindSettings {
    fn default() -> Self {
        Self {
            angle_degrees: 0.0,
            force: default_wind_force(),
        }
    }
}

/// One batch of tags painted onto a list of cells.
#[derive(Debug, Clone, Deserialize)]
pub struct TerrainPaint {
    pub tiles: Vec<Tile>,
    pub cells: Vec<Coords>,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        Scenario::from_str(&data).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

impl Scenario {
    pub fn from_str(text: &str) -> Result<Scenario> {
        let scenario: Scenario = serde_yaml::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.name.is_empty() {
            return Err(SimulationError::InvalidArgument(
                "scenario must define a name".into(),
            ));
        }
        if self.map.width <= 0 || self.map.height <= 0 {
            return Err(SimulationError::InvalidArgument(format!(
                "map dimensions must be positive, got {}x{}",
                self.map.width, self.map.height
            )));
        }
        if self.wind.force > 10 {
            return Err(SimulationError::InvalidArgument(format!(
                "wind force must be within 0..=10, got {}",
                self.wind.force
            )));
        }
        let size = Size::new(self.map.width, self.map.height);
        let spawn_lists = [
            ("zombie", &self.zombies),
            ("human", &self.humans),
            ("fire", &self.fires),
        ];
        for (label, coords) in spawn_lists {
            for &at in coords.iter() {
                if !size.contains(at) {
                    return Err(SimulationError::InvalidArgument(format!(
                        "{label} position {at} is outside the {size} map"
                    )));
                }
            }
        }
        for paint in &self.terrain {
            for &at in &paint.cells {
                if !size.contains(at) {
                    return Err(SimulationError::InvalidArgument(format!(
                        "terrain cell {at} is outside the {size} map"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn turns(&self, override_turns: Option<u64>) -> u64 {
        override_turns.or(self.turns).unwrap_or(50)
    }

    pub fn wind(&self) -> Wind {
        Wind::new(self.wind.angle_degrees, self.wind.force)
    }

    /// Creates the session: builds the map, seeds the entities, attaches
    /// the resolver chain.
    pub fn build_outbreak(&self, game_id: impl Into<String>) -> Result<Outbreak, SimulationError> {
        let settings = OutbreakSettings {
            game_id: game_id.into(),
            seed: self.seed,
            wind: self.wind(),
            detection_radius: self.detection_radius,
            join_policy: self.join_policy,
        };
        Outbreak::new(settings, &ScenarioBuilder::new(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "\
name: minimal
seed: 3
map:
  width: 4
  height: 4
";

    #[test]
    fn minimal_scenario_gets_defaults() {
        let scenario = Scenario::from_str(MINIMAL).unwrap();
        assert_eq!(scenario.name, "minimal");
        assert_eq!(scenario.detection_radius, 8);
        assert_eq!(scenario.wind.force, 5);
        assert_eq!(scenario.join_policy, JoinPolicy::Ignore);
        assert_eq!(scenario.turns(None), 50);
        assert_eq!(scenario.turns(Some(7)), 7);
    }

    #[test]
    fn spawns_outside_the_map_fail_validation() {
        let text = "\
name: bad
seed: 1
map:
  width: 4
  height: 4
zombies:
  - { x: 9, y: 0 }
";
        let result = Scenario::from_str(text);
        assert!(result.is_err());
    }

    #[test]
    fn excessive_wind_force_fails_validation() {
        let text = "\
name: storm
seed: 1
map:
  width: 4
  height: 4
wind:
  angle_degrees: 90.0
  force: 11
";
        assert!(Scenario::from_str(text).is_err());
    }

    #[test]
    fn full_scenario_parses() {
        let text = "\
name: village
seed: 42
turns: 20
map:
  width: 10
  height: 8
wind:
  angle_degrees: 45.0
  force: 7
detection_radius: 6
join_policy: reject
terrain:
  - tiles: [Water]
    cells:
      - { x: 0, y: 0 }
      - { x: 1, y: 0 }
zombies:
  - { x: 5, y: 5 }
humans:
  - { x: 2, y: 2 }
fires:
  - { x: 9, y: 7 }
";
        let scenario = Scenario::from_str(text).unwrap();
        assert_eq!(scenario.join_policy, JoinPolicy::Reject);
        assert_eq!(scenario.terrain.len(), 1);
        assert_eq!(scenario.terrain[0].cells.len(), 2);
        assert_eq!(scenario.wind().force, 7);
    }
}
