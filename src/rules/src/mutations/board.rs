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

use data::core::primitives::{Coord, EntityId};
use data::game_states::game_state::GameState;
use tracing::trace;

/// Deletes an entity from play: the entity table, its board cell, and any
/// zone holding it all forget the id together.
pub fn remove_entity(game: &mut GameState, id: EntityId) {
    game.board.remove_entity(id);
    if let Some(holder) = game.zones.containing(id).map(|z| z.name.clone()) {
        if let Some(zone) = game.zones.get_mut(&holder) {
            zone.remove(id);
        }
    }
    game.entities.remove(id);
    trace!(%id, "removed entity");
}

/// Places an entity on a cell, or clears the cell with None. Placement does
/// not touch `entity.pos`; effect lists assign that explicitly.
pub fn set_cell(game: &mut GameState, coord: Coord, occupant: Option<EntityId>) {
    match occupant {
        Some(id) => game.board.place(coord, id),
        None => {
            game.board.clear(coord);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use data::core::primitives::Topology;
    use data::entity_states::zones::Zone;

    use super::*;

    #[test]
    fn remove_entity_scrubs_board_and_zones() {
        let mut game = GameState::new(Topology::Grid { width: 8, height: 8 }, Some(5));
        let on_board = game.entities.spawn("piece", None, BTreeMap::new());
        let in_zone = game.entities.spawn("card", None, BTreeMap::new());
        game.board.place(Coord::new(3, 3), on_board);
        let mut pile = Zone::new("pile", "stack");
        pile.push(in_zone);
        game.zones.insert(pile);

        remove_entity(&mut game, on_board);
        remove_entity(&mut game, in_zone);

        assert!(game.entities.is_empty());
        assert!(game.board.is_empty());
        assert!(game.zones.get(&data::core::primitives::ZoneName::new("pile")).unwrap().is_empty());
    }
}
