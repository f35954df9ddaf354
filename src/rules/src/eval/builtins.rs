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

use std::collections::HashMap;

use data::core::primitives::Coord;
use data::core::value::Value;
use data::game_states::game_state::GameState;
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, trace};

use crate::eval::evaluator::EvalMode;
use crate::mutations::zones;
use crate::queries::players;

/// One entry of the closed builtin set. Effectful builtins mutate zones and
/// are only available in effect position.
struct Builtin {
    effectful: bool,
    run: fn(&mut GameState, &[Value]) -> Value,
}

const fn pure(run: fn(&mut GameState, &[Value]) -> Value) -> Builtin {
    Builtin { effectful: false, run }
}

const fn effect(run: fn(&mut GameState, &[Value]) -> Value) -> Builtin {
    Builtin { effectful: true, run }
}

static BUILTINS: Lazy<HashMap<&'static str, Builtin>> = Lazy::new(|| {
    HashMap::from([
        ("eq", pure(eq)),
        ("ne", pure(ne)),
        ("gt", pure(gt)),
        ("lt", pure(lt)),
        ("gte", pure(gte)),
        ("lte", pure(lte)),
        ("and", pure(and)),
        ("or", pure(or)),
        ("not", pure(not)),
        ("abs", pure(abs)),
        ("add", pure(add)),
        ("sub", pure(sub)),
        ("mul", pure(mul)),
        ("mod", pure(modulo)),
        ("count", pure(count)),
        ("zone", pure(zone)),
        ("entities_in_zone", pure(entities_in_zone)),
        ("top_card", pure(top_card)),
        ("mid_pos", pure(mid_pos)),
        ("path_clear", pure(path_clear)),
        ("other_player", pure(other_player)),
        ("next_player", pure(next_player)),
        ("random_int", pure(random_int)),
        ("concat", pure(concat)),
        ("shuffle", effect(shuffle)),
        ("draw_card", effect(draw_card)),
    ])
});

/// Dispatches a call to the closed builtin set. Unknown names evaluate to
/// null, and effectful builtins are rejected in condition position.
pub fn invoke(game: &mut GameState, name: &str, args: Vec<Value>, mode: EvalMode) -> Value {
    let Some(builtin) = BUILTINS.get(name) else {
        trace!(name, "unknown function");
        return Value::Null;
    };
    if builtin.effectful && mode == EvalMode::Condition {
        debug!(name, "effectful builtin is not allowed in a condition");
        return Value::Null;
    }
    let result = (builtin.run)(game, &args);
    trace!(name, ?args, ?result, "builtin");
    result
}

fn eq(_: &mut GameState, args: &[Value]) -> Value {
    Value::Bool(matches!(args, [a, b] if a == b))
}

fn ne(_: &mut GameState, args: &[Value]) -> Value {
    Value::Bool(matches!(args, [a, b] if a != b))
}

/// Ordering comparisons are false when either operand is null or the
/// operands are not mutually ordered.
fn ordered(
    args: &[Value],
    accept: fn(std::cmp::Ordering) -> bool,
) -> Value {
    match args {
        [a, b] => Value::Bool(a.compare(b).map(accept).unwrap_or(false)),
        _ => Value::Bool(false),
    }
}

fn gt(_: &mut GameState, args: &[Value]) -> Value {
    ordered(args, |o| o.is_gt())
}

fn lt(_: &mut GameState, args: &[Value]) -> Value {
    ordered(args, |o| o.is_lt())
}

fn gte(_: &mut GameState, args: &[Value]) -> Value {
    ordered(args, |o| o.is_ge())
}

fn lte(_: &mut GameState, args: &[Value]) -> Value {
    ordered(args, |o| o.is_le())
}

fn and(_: &mut GameState, args: &[Value]) -> Value {
    Value::Bool(args.iter().all(Value::truthy))
}

fn or(_: &mut GameState, args: &[Value]) -> Value {
    Value::Bool(args.iter().any(Value::truthy))
}

fn not(_: &mut GameState, args: &[Value]) -> Value {
    match args {
        [a] => Value::Bool(!a.truthy()),
        _ => Value::Bool(false),
    }
}

fn abs(_: &mut GameState, args: &[Value]) -> Value {
    match args {
        [Value::Int(n)] => Value::Int(n.abs()),
        [Value::Float(n)] => Value::Float(n.abs()),
        _ => Value::Int(0),
    }
}

/// Binary addition; a null operand yields 0. Two strings concatenate.
fn add(_: &mut GameState, args: &[Value]) -> Value {
    match args {
        [Value::Int(a), Value::Int(b)] => Value::Int(a + b),
        [Value::Str(a), Value::Str(b)] => Value::Str(format!("{a}{b}")),
        [a, b] => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => Value::Float(a + b),
            _ => Value::Int(0),
        },
        _ => Value::Int(0),
    }
}

fn sub(_: &mut GameState, args: &[Value]) -> Value {
    match args {
        [Value::Int(a), Value::Int(b)] => Value::Int(a - b),
        [a, b] => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => Value::Float(a - b),
            _ => Value::Int(0),
        },
        _ => Value::Int(0),
    }
}

/// N-ary product with identity 1; null and non-numeric operands contribute
/// the identity.
fn mul(_: &mut GameState, args: &[Value]) -> Value {
    let mut result = Value::Int(1);
    for arg in args {
        result = match (&result, arg) {
            (Value::Int(a), Value::Int(b)) => Value::Int(a * b),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => Value::Float(a * b),
                _ => result,
            },
        };
    }
    result
}

/// Euclidean remainder, matching the floor-division convention of the rest
/// of the geometry. Division by zero degrades to 0.
fn modulo(_: &mut GameState, args: &[Value]) -> Value {
    match args {
        [Value::Int(a), Value::Int(b)] if *b != 0 => Value::Int(a.rem_euclid(*b)),
        [a, b] => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) if b != 0.0 => Value::Float(a.rem_euclid(b)),
            _ => Value::Int(0),
        },
        _ => Value::Int(0),
    }
}

fn count(game: &mut GameState, args: &[Value]) -> Value {
    match args.first() {
        Some(Value::Zone(name)) => {
            Value::Int(game.zones.get(name).map(|z| z.len()).unwrap_or(0) as i64)
        }
        Some(Value::List(items)) => Value::Int(items.len() as i64),
        _ => Value::Int(0),
    }
}

fn zone(game: &mut GameState, args: &[Value]) -> Value {
    match args.first().and_then(Value::as_str) {
        Some(name) => {
            let name = data::core::primitives::ZoneName::new(name);
            if game.zones.get(&name).is_some() { Value::Zone(name) } else { Value::Null }
        }
        None => Value::Null,
    }
}

fn entities_in_zone(game: &mut GameState, args: &[Value]) -> Value {
    let entities = args
        .first()
        .and_then(Value::as_str)
        .and_then(|name| game.zones.get(&data::core::primitives::ZoneName::new(name)))
        .map(|zone| zone.entities.iter().copied().map(Value::Entity).collect())
        .unwrap_or_default();
    Value::List(entities)
}

fn top_card(game: &mut GameState, args: &[Value]) -> Value {
    args.first()
        .and_then(Value::as_zone)
        .and_then(|name| game.zones.get(name))
        .and_then(|zone| zone.top())
        .map(Value::Entity)
        .unwrap_or(Value::Null)
}

/// Integer midpoint with floor division, so negative coordinates truncate
/// toward negative infinity.
fn mid_pos(_: &mut GameState, args: &[Value]) -> Value {
    match args {
        [a, b] => match (a.as_coord(), b.as_coord()) {
            (Some(a), Some(b)) => Value::Coord(Coord::new(
                (a.x + b.x).div_euclid(2),
                (a.y + b.y).div_euclid(2),
            )),
            _ => Value::Null,
        },
        _ => Value::Null,
    }
}

/// Walks the compass line from `a` toward `b`, endpoints exclusive, and
/// reports whether every intermediate cell is empty. Points that are not
/// collinear on one of the 8 compass directions are never clear.
fn path_clear(game: &mut GameState, args: &[Value]) -> Value {
    let [a, b] = args else { return Value::Bool(false) };
    let (Some(a), Some(b)) = (a.as_coord(), b.as_coord()) else {
        return Value::Bool(false);
    };
    let (dx, dy) = ((b.x - a.x).signum(), (b.y - a.y).signum());
    let collinear = a.x == b.x || a.y == b.y || (b.x - a.x).abs() == (b.y - a.y).abs();
    if !collinear {
        return Value::Bool(false);
    }
    let mut current = Coord::new(a.x + dx, a.y + dy);
    while current != b {
        if game.board.is_occupied(current) {
            trace!(?current, "path blocked");
            return Value::Bool(false);
        }
        current = Coord::new(current.x + dx, current.y + dy);
    }
    Value::Bool(true)
}

fn other_player(game: &mut GameState, args: &[Value]) -> Value {
    let current = args.first().cloned().unwrap_or(Value::Null);
    players::other_player(game, &current).map(Value::Player).unwrap_or(Value::Null)
}

fn next_player(game: &mut GameState, args: &[Value]) -> Value {
    let current = match args.first() {
        Some(value) => value.as_player().cloned(),
        None => game.current_player.clone(),
    };
    let Some(current) = current else { return Value::Null };
    let direction = args.get(1).and_then(Value::as_int).unwrap_or(1);
    players::next_player_after(game, &current, direction)
        .map(Value::Player)
        .unwrap_or(Value::Null)
}

fn random_int(game: &mut GameState, args: &[Value]) -> Value {
    let min = args.first().and_then(Value::as_int).unwrap_or(1);
    let max = args.get(1).and_then(Value::as_int).unwrap_or(6);
    if min > max {
        return Value::Null;
    }
    Value::Int(game.rng.gen_range(min..=max))
}

fn concat(_: &mut GameState, args: &[Value]) -> Value {
    Value::Str(args.iter().map(Value::to_string).collect())
}

fn shuffle(game: &mut GameState, args: &[Value]) -> Value {
    if let Some(name) = args.first().and_then(Value::as_zone) {
        let GameState { zones, rng, .. } = game;
        if let Some(zone) = zones.get_mut(name) {
            zone.entities.shuffle(rng);
        }
    }
    Value::Null
}

/// Moves up to `n` entities from the head of `src` to the tail of `dst`,
/// returning the drawn entities.
fn draw_card(game: &mut GameState, args: &[Value]) -> Value {
    let (Some(src), Some(dst)) = (
        args.first().and_then(Value::as_zone).cloned(),
        args.get(1).and_then(Value::as_zone).cloned(),
    ) else {
        return Value::List(Vec::new());
    };
    let n = args.get(2).and_then(Value::as_int).unwrap_or(1).max(0) as usize;
    let drawn = zones::draw_cards(game, &src, &dst, n);
    Value::List(drawn.into_iter().map(Value::Entity).collect())
}
