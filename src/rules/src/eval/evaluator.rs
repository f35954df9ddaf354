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

use data::core::value::Value;
use data::entity_states::entity_state::Position;
use data::game_states::game_state::GameState;
use tracing::trace;

use crate::eval::builtins;
use crate::eval::expr::{self, Expr};

/// Name bindings for one evaluation: `entity`, `start`, `target`, `board`,
/// `state`, plus whatever the calling site adds (each zone by name in card
/// contexts). Missing names evaluate to null.
#[derive(Debug, Clone, Default)]
pub struct Context {
    bindings: BTreeMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context pre-bound with `state` and `board`, which almost every
    /// evaluation wants.
    pub fn with_state() -> Self {
        Self::new().with("state", Value::StateRef).with("board", Value::BoardRef)
    }

    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.bindings.insert(name.into(), value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }
}

/// Whether the current evaluation may invoke effectful builtins.
///
/// Conditions must be observations: `shuffle` and `draw_card` inside a
/// condition evaluate to null instead of mutating. Effect expressions get
/// the full set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalMode {
    Condition,
    Effect,
}

/// Evaluates a condition expression. Never fails: unresolvable names and
/// type mismatches yield null, which is falsy.
pub fn eval_condition(game: &mut GameState, ctx: &Context, source: &str) -> Value {
    evaluate(game, ctx, source, EvalMode::Condition)
}

/// Evaluates an expression in effect position, with effectful builtins
/// available.
pub fn eval_effect(game: &mut GameState, ctx: &Context, source: &str) -> Value {
    evaluate(game, ctx, source, EvalMode::Effect)
}

pub fn evaluate(game: &mut GameState, ctx: &Context, source: &str, mode: EvalMode) -> Value {
    let parsed = expr::parse(source);
    let value = eval_expr(game, ctx, &parsed, mode);
    trace!(source, ?value, "evaluated");
    value
}

pub(crate) fn eval_expr(
    game: &mut GameState,
    ctx: &Context,
    expr: &Expr,
    mode: EvalMode,
) -> Value {
    match expr {
        Expr::Null => Value::Null,
        Expr::Bool(b) => Value::Bool(*b),
        Expr::Int(n) => Value::Int(*n),
        Expr::Float(n) => Value::Float(*n),
        Expr::Str(s) => Value::Str(s.clone()),
        Expr::Ident(name) => ctx.get(name).cloned().unwrap_or(Value::Null),
        Expr::Index { obj, key } => {
            let obj = eval_expr(game, ctx, obj, mode);
            if obj.is_null() {
                return Value::Null;
            }
            let key = eval_expr(game, ctx, key, mode);
            index(game, &obj, &key)
        }
        Expr::Call { name, args } => {
            let args: Vec<Value> =
                args.iter().map(|arg| eval_expr(game, ctx, arg, mode)).collect();
            builtins::invoke(game, name, args, mode)
        }
        Expr::Property { head, path } => {
            let mut value = eval_expr(game, ctx, head, mode);
            for segment in path {
                if value.is_null() {
                    return Value::Null;
                }
                value = property(game, &value, segment);
            }
            value
        }
    }
}

/// `obj[key]` lookup. Board keys normalize the `{x, y}` mapping form to a
/// coordinate; list keys must be in-range ints; anything else is null.
fn index(game: &GameState, obj: &Value, key: &Value) -> Value {
    match obj {
        Value::BoardRef => match key.as_coord() {
            Some(coord) => game.board.get(coord).map(Value::Entity).unwrap_or(Value::Null),
            None => Value::Null,
        },
        Value::Map(map) => match key {
            Value::Str(name) => map.get(name).cloned().unwrap_or(Value::Null),
            _ => Value::Null,
        },
        Value::List(items) => match key.as_int() {
            Some(i) if i >= 0 && (i as usize) < items.len() => items[i as usize].clone(),
            _ => Value::Null,
        },
        _ => Value::Null,
    }
}

/// Resolves one `.segment` against a value: structured fields first, then
/// the attribute bag for entities and players. Dangling references and
/// unknown names are null.
pub(crate) fn property(game: &GameState, value: &Value, segment: &str) -> Value {
    match value {
        Value::Entity(id) => match game.entities.get(*id) {
            Some(entity) => match segment {
                "id" => Value::Int(entity.id.as_u64() as i64),
                "schema" => Value::Str(entity.schema.clone()),
                "owner" => entity.owner.clone().map(Value::Player).unwrap_or(Value::Null),
                "rank" => Value::Str(entity.rank.clone()),
                "pos" => match &entity.pos {
                    Some(Position::At(coord)) => Value::Coord(*coord),
                    Some(Position::In(zone)) => Value::Zone(zone.clone()),
                    None => Value::Null,
                },
                other => entity.attribute(other),
            },
            None => Value::Null,
        },
        Value::Player(name) => match game.players.get(name) {
            Some(player) => match segment {
                "name" => Value::Str(player.name.as_str().to_string()),
                other => player.attribute(other),
            },
            None => Value::Null,
        },
        Value::Zone(name) => match game.zones.get(name) {
            Some(zone) => match segment {
                "name" => Value::Str(zone.name.as_str().to_string()),
                "type" => Value::Str(zone.kind.clone()),
                "owner" => zone.owner.clone().map(Value::Player).unwrap_or(Value::Null),
                "visible" => Value::Bool(zone.visible),
                "ordered" => Value::Bool(zone.ordered),
                "visible_to" => {
                    Value::List(zone.visible_to.iter().cloned().map(Value::Player).collect())
                }
                "entities" => {
                    Value::List(zone.entities.iter().copied().map(Value::Entity).collect())
                }
                _ => Value::Null,
            },
            None => Value::Null,
        },
        Value::Coord(coord) => match segment {
            "x" => Value::Int(coord.x),
            "y" => Value::Int(coord.y),
            _ => Value::Null,
        },
        Value::Map(map) => map.get(segment).cloned().unwrap_or(Value::Null),
        Value::StateRef => match segment {
            "current_player" => {
                game.current_player.clone().map(Value::Player).unwrap_or(Value::Null)
            }
            "current_phase" => Value::Str(game.current_phase.clone()),
            "board" => Value::BoardRef,
            other => game.var(other),
        },
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use data::core::primitives::{Coord, PlayerName, Topology, ZoneName};
    use data::entity_states::zones::Zone;
    use data::player_states::player_state::Player;

    use super::*;

    fn game() -> GameState {
        let mut game = GameState::new(Topology::Grid { width: 8, height: 8 }, Some(7));
        let mut attrs = BTreeMap::new();
        attrs.insert("color".to_string(), Value::Str("red".into()));
        game.players.insert(Player::new("Red", attrs));
        game.players.insert(Player::new("Black", BTreeMap::new()));
        game
    }

    fn spawn_at(game: &mut GameState, coord: Coord, color: &str) -> Value {
        let mut attrs = BTreeMap::new();
        attrs.insert("color".to_string(), Value::Str(color.into()));
        let id = game.entities.spawn("piece", Some(PlayerName::new("Red")), attrs);
        game.board.place(coord, id);
        game.entity_mut(id).unwrap().pos = Some(Position::At(coord));
        Value::Entity(id)
    }

    #[test]
    fn identifiers_resolve_from_context() {
        let mut game = game();
        let ctx = Context::new().with("answer", Value::Int(42));
        assert_eq!(eval_condition(&mut game, &ctx, "answer"), Value::Int(42));
        assert_eq!(eval_condition(&mut game, &ctx, "missing"), Value::Null);
    }

    #[test]
    fn entity_properties_and_attribute_bag() {
        let mut game = game();
        let entity = spawn_at(&mut game, Coord::new(2, 2), "red");
        let ctx = Context::with_state().with("entity", entity);
        assert_eq!(eval_condition(&mut game, &ctx, "entity.rank"), Value::Str("man".into()));
        assert_eq!(eval_condition(&mut game, &ctx, "entity.color"), Value::Str("red".into()));
        assert_eq!(
            eval_condition(&mut game, &ctx, "entity.pos"),
            Value::Coord(Coord::new(2, 2))
        );
        assert_eq!(eval_condition(&mut game, &ctx, "entity.pos.x"), Value::Int(2));
        assert_eq!(eval_condition(&mut game, &ctx, "entity.nope"), Value::Null);
    }

    #[test]
    fn board_indexing_accepts_both_coordinate_forms() {
        let mut game = game();
        let entity = spawn_at(&mut game, Coord::new(3, 4), "red");
        let ctx = Context::with_state()
            .with("as_map", Value::coord_map(Coord::new(3, 4)))
            .with("as_coord", Value::Coord(Coord::new(3, 4)))
            .with("empty", Value::coord_map(Coord::new(0, 0)));
        assert_eq!(eval_condition(&mut game, &ctx, "board[as_map]"), entity);
        assert_eq!(
            eval_condition(&mut game, &ctx, "board[as_map]"),
            eval_condition(&mut game, &ctx, "board[as_coord]"),
        );
        assert_eq!(eval_condition(&mut game, &ctx, "board[empty]"), Value::Null);
    }

    #[test]
    fn property_after_index() {
        let mut game = game();
        spawn_at(&mut game, Coord::new(1, 1), "red");
        let ctx = Context::with_state().with("target", Value::coord_map(Coord::new(1, 1)));
        assert_eq!(
            eval_condition(&mut game, &ctx, "board[target].owner"),
            Value::Player(PlayerName::new("Red"))
        );
        assert_eq!(
            eval_condition(&mut game, &ctx, "board[target].owner.color"),
            Value::Str("red".into())
        );
    }

    #[test]
    fn state_reads_fields_and_variables() {
        let mut game = game();
        game.current_player = Some(PlayerName::new("Red"));
        game.set_var("turn_direction", Value::Int(-1));
        let ctx = Context::with_state();
        assert_eq!(
            eval_condition(&mut game, &ctx, "state.current_player"),
            Value::Player(PlayerName::new("Red"))
        );
        assert_eq!(
            eval_condition(&mut game, &ctx, "state.current_player.color"),
            Value::Str("red".into())
        );
        assert_eq!(eval_condition(&mut game, &ctx, "state.turn_direction"), Value::Int(-1));
        assert_eq!(eval_condition(&mut game, &ctx, "state.unset_var"), Value::Null);
    }

    #[test]
    fn zone_properties() {
        let mut game = game();
        let mut zone = Zone::new("discard_pile", "discard");
        let id = game.entities.spawn("card", None, BTreeMap::new());
        zone.push(id);
        game.zones.insert(zone);
        let ctx = Context::with_state()
            .with("discard_pile", Value::Zone(ZoneName::new("discard_pile")));
        assert_eq!(
            eval_condition(&mut game, &ctx, "discard_pile.type"),
            Value::Str("discard".into())
        );
        assert_eq!(
            eval_condition(&mut game, &ctx, "top_card(discard_pile).schema"),
            Value::Str("card".into())
        );
        assert_eq!(eval_condition(&mut game, &ctx, "count(discard_pile)"), Value::Int(1));
    }

    #[test]
    fn evaluation_never_fails() {
        let mut game = game();
        let ctx = Context::with_state();
        assert_eq!(eval_condition(&mut game, &ctx, "missing.attr.chain"), Value::Null);
        assert_eq!(eval_condition(&mut game, &ctx, "unknown_fn(1, 2)"), Value::Null);
        assert_eq!(eval_condition(&mut game, &ctx, "board['oops']"), Value::Null);
        assert_eq!(eval_condition(&mut game, &ctx, ""), Value::Null);
    }

    #[test]
    fn double_negation_normalizes_to_truthiness() {
        let mut game = game();
        for (source, expected) in [
            ("not(not(1))", true),
            ("not(not(0))", false),
            ("not(not('x'))", true),
            ("not(not(null))", false),
        ] {
            let ctx = Context::new();
            assert_eq!(
                eval_condition(&mut game, &ctx, source),
                Value::Bool(expected),
                "{source}"
            );
        }
    }
}
