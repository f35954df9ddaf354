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

use data::core::primitives::{EntityId, ZoneName};
use data::entity_states::entity_state::Position;
use data::game_states::game_state::GameState;
use tracing::trace;

/// Draws one entity from the head of `src` to the tail of `dst`.
///
/// Returns the id of the entity drawn, or None if either zone is missing or
/// the source is empty. The entity's position follows it.
pub fn draw(game: &mut GameState, src: &ZoneName, dst: &ZoneName) -> Option<EntityId> {
    game.zones.get(dst)?;
    let id = game.zones.get_mut(src)?.take_head()?;
    if let Some(zone) = game.zones.get_mut(dst) {
        zone.push(id);
    }
    if let Some(entity) = game.entities.get_mut(id) {
        entity.pos = Some(Position::In(dst.clone()));
    }
    trace!(%id, src = src.as_str(), dst = dst.as_str(), "drew");
    Some(id)
}

/// Draws up to `count` entities in sequence. Returns the entities actually
/// drawn; the result is short when the source runs out.
pub fn draw_cards(
    game: &mut GameState,
    src: &ZoneName,
    dst: &ZoneName,
    count: usize,
) -> Vec<EntityId> {
    (0..count).map_while(|_| draw(game, src, dst)).collect()
}

/// Round-robin deal: `count` passes over `targets`, one entity to each from
/// the head of `src`. Stops handing to a target when the source is empty.
pub fn deal_round_robin(
    game: &mut GameState,
    src: &ZoneName,
    targets: &[ZoneName],
    count: usize,
) {
    for _ in 0..count {
        for dst in targets {
            draw(game, src, dst);
        }
    }
}

/// Moves an entity into `dst`: detaches it from any containing zone or
/// board cell, appends it to the destination's tail and updates its
/// position. No-op when the entity or destination does not exist.
pub fn move_to_zone(game: &mut GameState, id: EntityId, dst: &ZoneName) {
    if game.entities.get(id).is_none() || game.zones.get(dst).is_none() {
        return;
    }
    if let Some(holder) = game.zones.containing(id).map(|z| z.name.clone()) {
        if let Some(zone) = game.zones.get_mut(&holder) {
            zone.remove(id);
        }
    }
    game.board.remove_entity(id);
    if let Some(zone) = game.zones.get_mut(dst) {
        zone.push(id);
    }
    if let Some(entity) = game.entities.get_mut(id) {
        entity.pos = Some(Position::In(dst.clone()));
    }
    trace!(%id, dst = dst.as_str(), "moved to zone");
}
