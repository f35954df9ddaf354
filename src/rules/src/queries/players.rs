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

use data::core::primitives::{PlayerName, ZoneName};
use data::core::value::Value;
use data::game_states::game_state::GameState;

/// The first seated player who is not `current`. With a non-player value
/// (including null) this is simply the first seat, mirroring the dynamic
/// comparison the rule language performs.
pub fn other_player(game: &GameState, current: &Value) -> Option<PlayerName> {
    game.players
        .names()
        .find(|name| &Value::Player((*name).clone()) != current)
        .cloned()
}

/// Rotates `direction` seats (negative allowed) from `current` through the
/// seating order, modular. None if `current` is not seated.
pub fn next_player_after(
    game: &GameState,
    current: &PlayerName,
    direction: i64,
) -> Option<PlayerName> {
    let seat = game.players.seat_of(current)? as i64;
    let len = game.players.len() as i64;
    let next = (seat + direction).rem_euclid(len) as usize;
    game.players.at_seat(next).map(|p| p.name.clone())
}

/// The named player's hand: the first zone they own whose name contains
/// `hand`.
pub fn hand_zone(game: &GameState, player: &PlayerName) -> Option<ZoneName> {
    game.zones
        .iter()
        .find(|zone| {
            zone.owner.as_ref() == Some(player)
                && zone.name.as_str().to_lowercase().contains("hand")
        })
        .map(|zone| zone.name.clone())
}
