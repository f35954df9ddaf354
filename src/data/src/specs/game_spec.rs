// Copyright © tabula 2024-present
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use utils::outcome::{GameError, GameResult};

/// Attribute bags in the document are arbitrary JSON objects; they are
/// converted to runtime values at setup time.
pub type AttrMap = serde_json::Map<String, serde_json::Value>;

/// The declarative game document.
///
/// Everything the engine does is driven by this structure: who plays, where
/// pieces live, which actions a phase allows, what those actions check and
/// do. Expression strings embedded throughout use the engine's expression
/// language; `player('Name')` and `zone('Name')` micro-syntax is recognized
/// in setup and initial-value string contexts.
#[derive(Debug, Clone, Deserialize)]
pub struct GameSpec {
    pub metadata: Metadata,
    pub players: PlayersSpec,
    pub topology: TopologySpec,
    #[serde(default)]
    pub state_schema: StateSchema,
    #[serde(default)]
    pub setup: SetupSpec,
    #[serde(default)]
    pub interactions: InteractionsSpec,
    #[serde(default)]
    pub game_flow: GameFlowSpec,
    #[serde(default)]
    pub presentation: PresentationSpec,
}

impl GameSpec {
    pub fn from_path(path: impl AsRef<Path>) -> GameResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| GameError::SpecLoad(format!("{}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> GameResult<Self> {
        serde_json::from_str(text).map_err(|e| GameError::SpecLoad(e.to_string()))
    }

    pub fn from_value(value: serde_json::Value) -> GameResult<Self> {
        serde_json::from_value(value).map_err(|e| GameError::SpecLoad(e.to_string()))
    }

    /// The named interaction, if declared.
    pub fn action(&self, name: &str) -> Option<&ActionSpec> {
        self.interactions.list.get(name)
    }

    /// The named game-flow phase, if declared.
    pub fn phase(&self, name: &str) -> Option<&PhaseSpec> {
        self.game_flow.phases.get(name)
    }

    /// The named presentation profile, if declared.
    pub fn profile(&self, name: &str) -> Option<&ProfileSpec> {
        self.presentation.profiles.get(name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayersSpec {
    pub count: CountRange,
    #[serde(default)]
    pub roles: Vec<RoleSpec>,

    /// When set, roles are templates: players are named `Player1..N` and
    /// all share the first role's attributes.
    #[serde(default)]
    pub dynamic_roles: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CountRange {
    #[serde(default = "default_count")]
    pub min: usize,
    #[serde(default = "default_count")]
    pub max: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleSpec {
    pub name: String,
    #[serde(default)]
    pub attributes: AttrMap,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopologySpec {
    /// `discrete` (a grid described by `structure`) or `zones`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Grid shape micro-syntax, e.g. `grid(8,8)`.
    #[serde(default)]
    pub structure: Option<String>,

    /// Zone declarations, in significant order.
    #[serde(default)]
    pub zones: IndexMap<String, ZoneSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZoneSpec {
    #[serde(rename = "type", default = "default_zone_kind")]
    pub kind: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub ordered: bool,
    #[serde(default)]
    pub visible_to: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StateSchema {
    #[serde(default)]
    pub global: BTreeMap<String, VarSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VarSpec {
    pub initial: serde_json::Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetupSpec {
    #[serde(default)]
    pub steps: Vec<SetupStep>,
}

/// One step of game setup, dispatched on the document's `action` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SetupStep {
    /// Creates one entity per resolved location in `at`.
    SpawnEntity {
        schema: String,
        #[serde(default)]
        set_attributes: AttrMap,
        #[serde(default)]
        at: Vec<String>,
    },

    /// Random-shuffles a zone in place.
    ShuffleZone { zone: String },

    /// Round-robin deal: `count` passes over `to`, one card each from the
    /// head of `from`.
    DealCards {
        from: String,
        to: Vec<String>,
        #[serde(default = "default_one")]
        count: usize,
    },

    /// Moves `count` entities from the head of `from` to the tail of `to`.
    MoveCard {
        from: String,
        to: String,
        #[serde(default = "default_one")]
        count: usize,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InteractionsSpec {
    #[serde(default)]
    pub list: BTreeMap<String, ActionSpec>,
}

/// A named rule: conditions that must all hold, effects applied in order on
/// a match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionSpec {
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub effects: Vec<String>,

    /// Permits this action as a non-terminal segment of a multi-segment
    /// path.
    #[serde(default)]
    pub chainable: bool,

    /// Forces a turn advance when this action completes.
    #[serde(default)]
    pub end_turn: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameFlowSpec {
    #[serde(default)]
    pub initial_phase: Option<String>,
    #[serde(default)]
    pub phases: BTreeMap<String, PhaseSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhaseSpec {
    #[serde(default)]
    pub allowed_actions: Vec<String>,

    /// Move to `next_phase` automatically after any successful action.
    #[serde(default)]
    pub auto_advance: bool,
    #[serde(default)]
    pub next_phase: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PresentationSpec {
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileSpec {
    #[serde(default)]
    pub entity_assets: Vec<AssetSpec>,
    #[serde(default)]
    pub topology_assets: BTreeMap<String, String>,
    #[serde(default)]
    pub card_back: Option<String>,
}

/// Picks an asset for entities matching a condition; `#` in the asset is
/// replaced by the entity's rank.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetSpec {
    pub conditions: String,
    pub asset: String,
}

fn default_count() -> usize {
    2
}

fn default_one() -> usize {
    1
}

fn default_true() -> bool {
    true
}

fn default_zone_kind() -> String {
    "stack".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_a_minimal_grid_document() {
        let spec = GameSpec::from_json(
            r#"{
                "metadata": {"name": "Checkers"},
                "players": {"count": {"min": 2, "max": 2},
                            "roles": [{"name": "Red"}, {"name": "Black"}]},
                "topology": {"type": "discrete", "structure": "grid(8,8)"},
                "setup": {"steps": [
                    {"action": "spawn_entity", "schema": "piece",
                     "set_attributes": {"owner": "player('Red')", "color": "red"},
                     "at": ["grid_nodes(0,0,7,2)"]}
                ]},
                "game_flow": {"initial_phase": "main_turn",
                              "phases": {"main_turn": {"allowed_actions": ["step"]}}}
            }"#,
        )
        .unwrap();
        assert_eq!(spec.metadata.name, "Checkers");
        assert_eq!(spec.players.roles.len(), 2);
        assert!(matches!(spec.setup.steps[0], SetupStep::SpawnEntity { .. }));
        assert_eq!(spec.phase("main_turn").unwrap().allowed_actions, vec!["step"]);
    }

    #[test]
    fn zone_declaration_order_is_kept() {
        let spec = GameSpec::from_json(
            r#"{
                "metadata": {"name": "Cards"},
                "players": {"count": {}, "roles": [{"name": "P1"}, {"name": "P2"}]},
                "topology": {"type": "zones", "zones": {
                    "draw_pile": {"type": "stack", "visible": false},
                    "discard_pile": {"type": "discard"},
                    "p1_hand": {"type": "hand", "owner": "player('P1')"}
                }}
            }"#,
        )
        .unwrap();
        let names: Vec<_> = spec.topology.zones.keys().cloned().collect();
        assert_eq!(names, vec!["draw_pile", "discard_pile", "p1_hand"]);
        assert!(!spec.topology.zones["draw_pile"].visible);
        assert_eq!(spec.topology.zones["discard_pile"].kind, "discard");
    }

    #[test]
    fn malformed_documents_fail_to_load() {
        assert!(matches!(
            GameSpec::from_json("{\"metadata\": {}}"),
            Err(GameError::SpecLoad(_))
        ));
        assert!(matches!(GameSpec::from_json("not json"), Err(GameError::SpecLoad(_))));
    }
}
