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

use data::core::value::Value;
use data::game_states::game_state::GameState;
use data::specs::game_spec::GameSpec;
use tracing::debug;

use crate::queries::players;

/// Advances the turn after a committed grid move: strict alternation when
/// exactly two players are seated, otherwise a signed rotation by
/// `turn_direction`.
pub fn advance_turn(game: &mut GameState) {
    let Some(current) = game.current_player.clone() else { return };
    let next = if game.players.len() == 2 {
        players::other_player(game, &Value::Player(current))
    } else {
        players::next_player_after(game, &current, game.turn_direction())
    };
    debug!(?next, "turn advanced");
    game.current_player = next;
}

/// Rotates the turn by `turn_direction` regardless of player count. Card
/// actions flagged `end_turn` advance this way, as does skipping an
/// empty-handed player.
pub fn rotate_turn(game: &mut GameState) {
    let Some(current) = game.current_player.clone() else { return };
    game.current_player = players::next_player_after(game, &current, game.turn_direction());
}

/// Applies a phase's `auto_advance` transition, if it declares one.
///
/// `from_phase` is the phase that allowed the action, captured before any
/// effects ran; the transition follows that declaration even if an effect
/// reassigned the phase meanwhile.
pub fn advance_phase(spec: &GameSpec, game: &mut GameState, from_phase: &str) {
    let Some(phase) = spec.phase(from_phase) else { return };
    if phase.auto_advance {
        if let Some(next) = &phase.next_phase {
            debug!(from = from_phase, to = next.as_str(), "phase advanced");
            game.current_phase = next.clone();
        }
    }
}
