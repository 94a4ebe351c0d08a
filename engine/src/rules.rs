use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::dice::DiceNotation;

const DEFAULT_CHECK_DIE: i32 = 20;
const DEFAULT_STAMINA_COST: i32 = 10;
const DEFAULT_MAX_DICE: u32 = 100;
const DEFAULT_MAX_FACES: u32 = 1000;

/// Table rules layered on top of the dice primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct RulesConfig {
    /// Faces of the die rolled under an attribute.
    pub check_die: i32,
    /// Stamina spent by each strength or agility check.
    pub stamina_cost: i32,
    /// Largest dice count accepted from a player in one expression.
    pub max_dice: u32,
    /// Largest face count accepted from a player in one expression.
    pub max_faces: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            check_die: DEFAULT_CHECK_DIE,
            stamina_cost: DEFAULT_STAMINA_COST,
            max_dice: DEFAULT_MAX_DICE,
            max_faces: DEFAULT_MAX_FACES,
        }
    }
}

impl RulesConfig {
    /// Whether a player-supplied expression stays within the table limits.
    pub fn allows(&self, notation: DiceNotation) -> bool {
        notation.count <= self.max_dice && notation.faces <= self.max_faces
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let rules: RulesConfig =
            serde_yaml::from_str(text).context("failed to parse rules YAML")?;
        Ok(rules)
    }
}
