//! Rules configuration.
//!
//! The standard rules are the default. A `RulesConfig` is stored inside every
//! `GameState`, so each transition uses the rules its game was created with.

use crate::error::GameError;
use serde::{Deserialize, Serialize};

/// Thresholds and piece limits used by the rules engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Victory points needed to win
    pub victory_points_to_win: u32,
    /// Minimum road length for Longest Road
    pub longest_road_minimum: u32,
    /// Minimum knights for Largest Army
    pub largest_army_minimum: u32,
    /// A seven forces a discard from hands larger than this
    pub discard_threshold: u32,
    /// Road pieces per player
    pub max_roads: usize,
    /// Settlement pieces per player
    pub max_settlements: usize,
    /// City pieces per player
    pub max_cities: usize,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            victory_points_to_win: 10,
            longest_road_minimum: 5,
            largest_army_minimum: 3,
            discard_threshold: 7,
            max_roads: 15,
            max_settlements: 5,
            max_cities: 4,
        }
    }
}

impl RulesConfig {
    /// Parse a configuration from JSON; missing fields take their standard value
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| GameError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would make the game unwinnable or unplayable
    pub fn validate(&self) -> Result<(), GameError> {
        if self.victory_points_to_win == 0 {
            return Err(GameError::InvalidConfig(
                "victory_points_to_win must be positive".into(),
            ));
        }
        if self.longest_road_minimum == 0 || self.largest_army_minimum == 0 {
            return Err(GameError::InvalidConfig(
                "bonus minimums must be positive".into(),
            ));
        }
        if self.max_roads == 0 || self.max_settlements == 0 {
            return Err(GameError::InvalidConfig(
                "each player needs at least one road and one settlement".into(),
            ));
        }
        Ok(())
    }
}
