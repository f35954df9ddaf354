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

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use serde::{Deserialize, Serialize};

use crate::core::primitives::{EntityId, HasEntityId, PlayerName, Topology};
use crate::core::value::Value;
use crate::entity_states::board::Board;
use crate::entity_states::entity_state::{Entities, Entity};
use crate::entity_states::zones::Zones;
use crate::player_states::player_state::Players;

/// This is the complete state of one running game.
///
/// The turn controller validates player input by cloning this struct,
/// running the trial on the clone, and replacing the live state with the
/// clone only on full success. Everything here is a plain value for that
/// reason; entities are addressed by id so references survive the swap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Whether the game is ongoing or has been won.
    pub status: GameStatus,

    /// The coordinate space: a grid with a board, or named zones only.
    pub topology: Topology,

    /// State for the players within this game, in seating order.
    pub players: Players,

    /// Stores state for all entities in this game.
    pub entities: Entities,

    /// The grid surface. Empty for zone topologies.
    pub board: Board,

    /// All zones, in declaration order.
    pub zones: Zones,

    /// Player whose turn it currently is. Unset only before setup finishes.
    pub current_player: Option<PlayerName>,

    /// Current phase of the game-flow state machine.
    pub current_phase: String,

    /// Dynamically declared state variables (`turn_direction`, …).
    pub vars: BTreeMap<String, Value>,

    /// Random number generator to use for this game.
    pub rng: Xoshiro256StarStar,
}

impl GameState {
    /// A fresh state with no players or entities. `seed` fixes the RNG for
    /// reproducible runs; otherwise it is seeded from entropy.
    pub fn new(topology: Topology, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => Xoshiro256StarStar::seed_from_u64(seed),
            None => Xoshiro256StarStar::from_entropy(),
        };
        Self {
            status: GameStatus::Playing,
            topology,
            players: Players::default(),
            entities: Entities::default(),
            board: Board::default(),
            zones: Zones::default(),
            current_player: None,
            current_phase: "main_turn".to_string(),
            vars: BTreeMap::new(),
            rng,
        }
    }

    pub fn entity(&self, id: impl HasEntityId) -> Option<&Entity> {
        self.entities.get(id.entity_id())
    }

    pub fn entity_mut(&mut self, id: impl HasEntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id.entity_id())
    }

    /// Reads a state variable; unset names are null.
    pub fn var(&self, name: &str) -> Value {
        self.vars.get(name).cloned().unwrap_or(Value::Null)
    }

    pub fn set_var(&mut self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    /// The rotation step for next-player selection. Defaults to `1`
    /// whenever the `turn_direction` variable is unset or non-numeric.
    pub fn turn_direction(&self) -> i64 {
        self.vars.get("turn_direction").and_then(Value::as_int).unwrap_or(1)
    }

    pub fn is_over(&self) -> bool {
        matches!(self.status, GameStatus::GameOver { .. })
    }

    /// Ids referenced from any zone, paired with the owning zone name.
    /// Diagnostic helper for the consistency checks in tests.
    pub fn zoned_entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.zones.iter().flat_map(|z| z.entities.iter().copied())
    }
}

/// Status of the game: ongoing, or ended with a winner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Game is currently ongoing.
    Playing,

    /// Game has ended and the named player has won.
    GameOver { winner: PlayerName },
}
