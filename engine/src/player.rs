use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::currency::Money;
use crate::error::RuleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Strength,
    Constitution,
    Agility,
    Intelligence,
    Perception,
}

impl Attribute {
    pub const ALL: [Attribute; 5] = [
        Attribute::Strength,
        Attribute::Constitution,
        Attribute::Agility,
        Attribute::Intelligence,
        Attribute::Perception,
    ];

    /// Field name in the stored record.
    pub const fn key(self) -> &'static str {
        match self {
            Attribute::Strength => "force",
            Attribute::Constitution => "constitution",
            Attribute::Agility => "agilite",
            Attribute::Intelligence => "intelligence",
            Attribute::Perception => "perception",
        }
    }

    /// Physical checks draw on stamina.
    pub const fn is_physical(self) -> bool {
        matches!(self, Attribute::Strength | Attribute::Agility)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Attribute {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "force" | "strength" | "str" | "for" => Ok(Attribute::Strength),
            "constitution" | "con" => Ok(Attribute::Constitution),
            "agilite" | "agilité" | "agility" | "agi" => Ok(Attribute::Agility),
            "intelligence" | "int" => Ok(Attribute::Intelligence),
            "perception" | "per" => Ok(Attribute::Perception),
            _ => Err(RuleError::InvalidAttribute(s.to_string())),
        }
    }
}

/// Consumable stats with a current value and a derived maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Hp,
    Mana,
    Stamina,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Hp => f.write_str("hp"),
            Resource::Mana => f.write_str("mana"),
            Resource::Stamina => f.write_str("stam"),
        }
    }
}

impl FromStr for Resource {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hp" | "pv" => Ok(Resource::Hp),
            "mana" => Ok(Resource::Mana),
            "stam" | "stamina" | "endurance" => Ok(Resource::Stamina),
            _ => Err(RuleError::InvalidAttribute(s.to_string())),
        }
    }
}

/// A value an action can run short of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pool {
    Mana,
    Stamina,
    Intelligence,
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pool::Mana => f.write_str("mana"),
            Pool::Stamina => f.write_str("stamina"),
            Pool::Intelligence => f.write_str("intelligence"),
        }
    }
}

pub fn hp_max_for(constitution: i32) -> i32 {
    constitution.saturating_mul(4).max(0)
}

pub fn mana_max_for(intelligence: i32) -> i32 {
    intelligence.saturating_mul(20).max(0)
}

pub fn stam_max_for(strength: i32, agility: i32) -> i32 {
    strength.saturating_add(agility).saturating_mul(10).max(0)
}

/// Character sheet numbers (`joueur` in the stored record).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    #[serde(rename = "force", default)]
    pub strength: i32,
    #[serde(default)]
    pub constitution: i32,
    #[serde(rename = "agilite", default)]
    pub agility: i32,
    #[serde(default)]
    pub intelligence: i32,
    #[serde(default)]
    pub perception: i32,
    #[serde(default)]
    pub hp: i32,
    #[serde(rename = "hpMax", default)]
    pub hp_max: i32,
    #[serde(default)]
    pub mana: i32,
    #[serde(rename = "manaMax", default)]
    pub mana_max: i32,
    #[serde(default)]
    pub stam: i32,
    #[serde(rename = "stamMax", default)]
    pub stam_max: i32,
}

impl PlayerStats {
    pub fn score(&self, attr: Attribute) -> i32 {
        match attr {
            Attribute::Strength => self.strength,
            Attribute::Constitution => self.constitution,
            Attribute::Agility => self.agility,
            Attribute::Intelligence => self.intelligence,
            Attribute::Perception => self.perception,
        }
    }

    /// Set a base attribute, then recompute every maximum and clamp.
    pub fn set_attribute(&mut self, attr: Attribute, value: i32) {
        let slot = match attr {
            Attribute::Strength => &mut self.strength,
            Attribute::Constitution => &mut self.constitution,
            Attribute::Agility => &mut self.agility,
            Attribute::Intelligence => &mut self.intelligence,
            Attribute::Perception => &mut self.perception,
        };
        let before = *slot;
        *slot = value;
        self.refresh_derived();
        info!(%attr, before, after = value, "attribute set");
    }

    /// Recompute maxima from the base attributes; currents are clamped into
    /// `[0, max]` but never raised.
    pub fn refresh_derived(&mut self) {
        self.hp_max = hp_max_for(self.constitution);
        self.mana_max = mana_max_for(self.intelligence);
        self.stam_max = stam_max_for(self.strength, self.agility);
        self.hp = self.hp.clamp(0, self.hp_max);
        self.mana = self.mana.clamp(0, self.mana_max);
        self.stam = self.stam.clamp(0, self.stam_max);
    }

    pub fn current(&self, resource: Resource) -> i32 {
        match resource {
            Resource::Hp => self.hp,
            Resource::Mana => self.mana,
            Resource::Stamina => self.stam,
        }
    }

    pub fn max(&self, resource: Resource) -> i32 {
        match resource {
            Resource::Hp => self.hp_max,
            Resource::Mana => self.mana_max,
            Resource::Stamina => self.stam_max,
        }
    }

    /// Damage (negative delta) or restore (positive delta) a resource,
    /// clamped to `[0, max]`. Returns the new value.
    pub fn adjust(&mut self, resource: Resource, delta: i32) -> i32 {
        let max = self.max(resource);
        let slot = match resource {
            Resource::Hp => &mut self.hp,
            Resource::Mana => &mut self.mana,
            Resource::Stamina => &mut self.stam,
        };
        let before = *slot;
        *slot = before.saturating_add(delta).min(max).max(0);
        info!(%resource, before, after = *slot, delta, "resource adjusted");
        *slot
    }

    /// Fill hp, mana and stamina to their maxima.
    pub fn restore_all(&mut self) {
        self.hp = self.hp_max.max(0);
        self.mana = self.mana_max.max(0);
        self.stam = self.stam_max.max(0);
    }
}

/// Everything stored for one player in one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    #[serde(default)]
    pub joueur: PlayerStats,
    #[serde(default)]
    pub money: Money,
}

/// Fresh record for a player seen for the first time.
pub fn default_player_record() -> PlayerRecord {
    PlayerRecord::default()
}
