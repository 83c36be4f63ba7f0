//! Combat participants and the encounter snapshot they live in.
//!
//! These mirror what the host game exposes read-only: identity, vitals,
//! position, conditions, resources and the content items an entity carries.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::item::ContentItem;

/// Feet covered by one grid cell.
pub const FEET_PER_GRID_CELL: f64 = 5.0;

/// Grid cell size (in scene coordinate units) assumed when a scene reports none.
pub const DEFAULT_GRID_SIZE: f64 = 100.0;

/// Identifier of a combat participant. Stable for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CombatantId(String);

impl CombatantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CombatantId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CombatantId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Straight-line distance in feet, rounded to the nearest foot.
    ///
    /// `grid_size` is the length of one grid cell in scene units; non-positive
    /// values fall back to [`DEFAULT_GRID_SIZE`].
    pub fn distance_feet(&self, other: &Position, grid_size: f64) -> u32 {
        let grid_size = if grid_size > 0.0 {
            grid_size
        } else {
            DEFAULT_GRID_SIZE
        };
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let cells = (dx * dx + dy * dy).sqrt() / grid_size;
        (cells * FEET_PER_GRID_CELL).round() as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vitals {
    pub hp: i32,
    pub hp_max: i32,
    pub armor_class: i32,
    /// Walking speed in feet.
    pub speed: u32,
}

impl Vitals {
    /// Remaining hit points as a whole percentage of maximum.
    pub fn hp_percent(&self) -> u32 {
        if self.hp_max <= 0 {
            return 0;
        }
        let pct = (self.hp.max(0) as f64 / self.hp_max as f64) * 100.0;
        pct.round() as u32
    }
}

/// A `value/max` counter (spell slots, legendary actions, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourcePool {
    pub value: u32,
    pub max: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resources {
    /// Spell slots keyed by spell level.
    #[serde(default)]
    pub spell_slots: BTreeMap<u8, ResourcePool>,
    #[serde(default)]
    pub legendary_actions: Option<ResourcePool>,
    #[serde(default)]
    pub legendary_resistances: Option<ResourcePool>,
}

impl Resources {
    pub fn is_empty(&self) -> bool {
        self.spell_slots.is_empty()
            && self.legendary_actions.is_none()
            && self.legendary_resistances.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    #[serde(default)]
    pub initiative: Option<f64>,
    /// Whether a player owns this combatant. Opposite ownership means hostile.
    #[serde(default)]
    pub player_controlled: bool,
    #[serde(default)]
    pub defeated: bool,
    #[serde(default)]
    pub vitals: Vitals,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub resources: Resources,
    #[serde(default)]
    pub items: Vec<ContentItem>,
}

impl Combatant {
    /// Flagged defeated, or out of hit points.
    pub fn is_defeated(&self) -> bool {
        self.defeated || (self.vitals.hp_max > 0 && self.vitals.hp <= 0)
    }

    pub fn is_npc(&self) -> bool {
        !self.player_controlled
    }

    pub fn is_hostile_to(&self, other: &Combatant) -> bool {
        self.player_controlled != other.player_controlled
    }
}

/// Read-only snapshot of a running encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    #[serde(default = "default_round")]
    pub round: u32,
    /// Combatant whose turn it currently is.
    #[serde(default)]
    pub active_combatant: Option<CombatantId>,
    #[serde(default = "default_grid_size")]
    pub grid_size: f64,
    #[serde(default)]
    pub combatants: Vec<Combatant>,
    /// Chronological log of what has happened so far, oldest first.
    #[serde(default)]
    pub action_log: Vec<String>,
}

fn default_round() -> u32 {
    1
}

fn default_grid_size() -> f64 {
    DEFAULT_GRID_SIZE
}

impl Encounter {
    pub fn combatant(&self, id: &CombatantId) -> Option<&Combatant> {
        self.combatants.iter().find(|c| &c.id == id)
    }

    /// Living, non-player-controlled combatants.
    pub fn active_npcs(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants
            .iter()
            .filter(|c| c.is_npc() && !c.is_defeated())
    }

    /// The last `limit` log entries, oldest first.
    pub fn recent_actions(&self, limit: usize) -> &[String] {
        let start = self.action_log.len().saturating_sub(limit);
        &self.action_log[start..]
    }
}
