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
use data::entity_states::entity_state::Position;
use data::game_states::game_state::GameState;
use tracing::debug;

use crate::eval::evaluator::{self, Context, EvalMode};
use crate::eval::expr::{self, Expr};
use crate::mutations::{board, zones};

/// Applies an action's effect list in order. Effects are expressions from
/// the closed set `set`, `if`, `remove_entity`, `move_to_zone`,
/// `draw_cards`; anything else is logged and skipped.
pub fn apply_all(game: &mut GameState, ctx: &Context, effects: &[String]) {
    for effect in effects {
        apply(game, ctx, effect);
    }
}

pub fn apply(game: &mut GameState, ctx: &Context, source: &str) {
    debug!(source, "applying effect");
    let parsed = expr::parse(source);
    apply_expr(game, ctx, &parsed);
}

fn apply_expr(game: &mut GameState, ctx: &Context, effect: &Expr) {
    let Expr::Call { name, args } = effect else {
        debug!(?effect, "effect is not a call; skipped");
        return;
    };
    match (name.as_str(), args.as_slice()) {
        ("set", [target, value]) => {
            let value = evaluator::eval_expr(game, ctx, value, EvalMode::Effect);
            set_value(game, ctx, target, value);
        }
        ("if", [condition, body]) => {
            if evaluator::eval_expr(game, ctx, condition, EvalMode::Effect).truthy() {
                apply_expr(game, ctx, body);
            }
        }
        ("remove_entity", [target]) => {
            if let Some(id) =
                evaluator::eval_expr(game, ctx, target, EvalMode::Effect).as_entity()
            {
                board::remove_entity(game, id);
            }
        }
        ("move_to_zone", [entity, zone]) => {
            let entity = evaluator::eval_expr(game, ctx, entity, EvalMode::Effect);
            let zone = evaluator::eval_expr(game, ctx, zone, EvalMode::Effect);
            if let (Some(id), Some(name)) = (entity.as_entity(), zone.as_zone()) {
                zones::move_to_zone(game, id, name);
            }
        }
        ("draw_cards", [src, dst, count]) => {
            let src = evaluator::eval_expr(game, ctx, src, EvalMode::Effect);
            let dst = evaluator::eval_expr(game, ctx, dst, EvalMode::Effect);
            let count = evaluator::eval_expr(game, ctx, count, EvalMode::Effect)
                .as_int()
                .unwrap_or(1)
                .max(0) as usize;
            if let (Some(src), Some(dst)) = (src.as_zone().cloned(), dst.as_zone().cloned()) {
                zones::draw_cards(game, &src, &dst, count);
            }
        }
        _ => debug!(name = name.as_str(), "unknown effect; skipped"),
    }
}

/// Assigns to an lvalue: `board[coord]` (null clears the cell), a dotted
/// attribute path, or `state.var`.
fn set_value(game: &mut GameState, ctx: &Context, target: &Expr, value: Value) {
    match target {
        Expr::Index { obj, key } => {
            let obj = evaluator::eval_expr(game, ctx, obj, EvalMode::Effect);
            if !matches!(obj, Value::BoardRef) {
                return;
            }
            let Some(coord) =
                evaluator::eval_expr(game, ctx, key, EvalMode::Effect).as_coord()
            else {
                return;
            };
            match value {
                Value::Null => board::set_cell(game, coord, None),
                Value::Entity(id) => board::set_cell(game, coord, Some(id)),
                other => debug!(?other, "only entities can occupy a cell"),
            }
        }
        Expr::Property { head, path } => {
            let Some((last, walk)) = path.split_last() else { return };
            let mut owner = evaluator::eval_expr(game, ctx, head, EvalMode::Effect);
            for segment in walk {
                owner = evaluator::property(game, &owner, segment);
            }
            assign(game, owner, last, value);
        }
        other => debug!(?other, "not an assignable target"),
    }
}

fn assign(game: &mut GameState, owner: Value, attr: &str, value: Value) {
    match owner {
        Value::Entity(id) => {
            let Some(entity) = game.entities.get_mut(id) else { return };
            match attr {
                "rank" => {
                    entity.rank = match value {
                        Value::Str(s) => s,
                        other => other.to_string(),
                    }
                }
                "owner" => entity.owner = value.as_player().cloned(),
                "pos" => {
                    entity.pos = match &value {
                        Value::Zone(zone) => Some(Position::In(zone.clone())),
                        Value::Null => None,
                        other => other.as_coord().map(Position::At),
                    }
                }
                other => {
                    entity.attributes.insert(other.to_string(), value);
                }
            }
        }
        Value::Player(name) => {
            if attr == "name" {
                debug!("player names are identity and cannot be assigned");
                return;
            }
            if let Some(player) = game.players.get_mut(&name) {
                player.attributes.insert(attr.to_string(), value);
            }
        }
        Value::Zone(name) => {
            let Some(zone) = game.zones.get_mut(&name) else { return };
            match (attr, &value) {
                ("visible", Value::Bool(b)) => zone.visible = *b,
                ("ordered", Value::Bool(b)) => zone.ordered = *b,
                _ => debug!(attr, "unassignable zone attribute"),
            }
        }
        Value::StateRef => match attr {
            "current_player" => game.current_player = value.as_player().cloned(),
            "current_phase" => {
                if let Value::Str(phase) = value {
                    game.current_phase = phase;
                }
            }
            other => game.set_var(other, value),
        },
        other => debug!(?other, attr, "unassignable owner"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use data::core::primitives::{Coord, PlayerName, Topology, ZoneName};
    use data::entity_states::zones::Zone;
    use data::player_states::player_state::Player;

    use super::*;

    fn grid_game() -> (GameState, Value) {
        let mut game = GameState::new(Topology::Grid { width: 8, height: 8 }, Some(4));
        game.players.insert(Player::new("Red", BTreeMap::new()));
        let id = game.entities.spawn("piece", Some(PlayerName::new("Red")), BTreeMap::new());
        game.board.place(Coord::new(2, 2), id);
        game.entity_mut(id).unwrap().pos = Some(Position::At(Coord::new(2, 2)));
        (game, Value::Entity(id))
    }

    #[test]
    fn set_board_and_position_moves_a_piece() {
        let (mut game, entity) = grid_game();
        let id = entity.as_entity().unwrap();
        let ctx = Context::with_state()
            .with("entity", entity)
            .with("start", Value::coord_map(Coord::new(2, 2)))
            .with("target", Value::coord_map(Coord::new(3, 3)));
        apply_all(
            &mut game,
            &ctx,
            &[
                "set(board[start], null)".to_string(),
                "set(board[target], entity)".to_string(),
                "set(entity.pos, target)".to_string(),
            ],
        );
        assert_eq!(game.board.get(Coord::new(2, 2)), None);
        assert_eq!(game.board.get(Coord::new(3, 3)), Some(id));
        assert_eq!(game.entity(id).unwrap().pos, Some(Position::At(Coord::new(3, 3))));
    }

    #[test]
    fn conditional_effect_promotes_on_back_rank() {
        let (mut game, entity) = grid_game();
        let id = entity.as_entity().unwrap();
        let ctx = Context::with_state()
            .with("entity", entity)
            .with("target", Value::coord_map(Coord::new(4, 7)));
        apply(&mut game, &ctx, "if(eq(target.y, 7), set(entity.rank, 'king'))");
        assert_eq!(game.entity(id).unwrap().rank, "king");

        let ctx = ctx.with("target", Value::coord_map(Coord::new(4, 6)));
        apply(&mut game, &ctx, "if(eq(target.y, 7), set(entity.rank, 'man'))");
        assert_eq!(game.entity(id).unwrap().rank, "king", "false condition applies nothing");
    }

    #[test]
    fn remove_entity_clears_every_mapping() {
        let (mut game, entity) = grid_game();
        let id = entity.as_entity().unwrap();
        let ctx = Context::with_state().with("victim", entity);
        apply(&mut game, &ctx, "remove_entity(victim)");
        assert!(game.entity(id).is_none());
        assert!(game.board.is_empty());
    }

    #[test]
    fn state_variable_assignment() {
        let (mut game, _) = grid_game();
        let ctx = Context::with_state();
        apply(&mut game, &ctx, "set(state.turn_direction, -1)");
        assert_eq!(game.turn_direction(), -1);
        apply(&mut game, &ctx, "set(state.mode, 'endgame')");
        assert_eq!(game.var("mode"), Value::Str("endgame".into()));
    }

    #[test]
    fn move_to_zone_effect() {
        let mut game = GameState::new(Topology::Zones, Some(4));
        let mut hand = Zone::new("hand", "hand");
        let id = game.entities.spawn("card", None, BTreeMap::new());
        hand.push(id);
        game.zones.insert(hand);
        game.zones.insert(Zone::new("discard_pile", "discard"));
        let ctx = Context::with_state()
            .with("card", Value::Entity(id))
            .with("discard_pile", Value::Zone(ZoneName::new("discard_pile")));
        apply(&mut game, &ctx, "move_to_zone(card, discard_pile)");
        assert!(game.zones.get(&ZoneName::new("hand")).unwrap().is_empty());
        assert_eq!(
            game.zones.get(&ZoneName::new("discard_pile")).unwrap().top(),
            Some(id)
        );
    }

    #[test]
    fn unknown_effects_change_nothing() {
        let (mut game, _) = grid_game();
        let before = serde_json::to_string(&game).unwrap();
        let ctx = Context::with_state();
        apply(&mut game, &ctx, "explode(everything)");
        apply(&mut game, &ctx, "42");
        assert_eq!(serde_json::to_string(&game).unwrap(), before);
    }
}
