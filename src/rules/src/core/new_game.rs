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

use data::core::primitives::{Coord, PlayerName, Topology, ZoneName};
use data::core::value::Value;
use data::entity_states::entity_state::Position;
use data::entity_states::zones::Zone;
use data::game_states::game_state::GameState;
use data::player_states::player_state::Player;
use data::specs::game_spec::{AttrMap, GameSpec, SetupStep};
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};
use utils::outcome::{GameError, GameResult};

use crate::eval::expr::{self, Expr};
use crate::mutations::zones;

/// Builds the initial [GameState] for a loaded document: players, topology,
/// zones, state variables, setup steps, initial phase.
///
/// `requested_players` defaults to the document's minimum count; a value
/// outside the declared range is an error. `seed` fixes the RNG so shuffles
/// and deals reproduce.
pub fn create(
    spec: &GameSpec,
    requested_players: Option<usize>,
    seed: Option<u64>,
) -> GameResult<GameState> {
    let min = spec.players.count.min;
    let max = spec.players.count.max;
    let num_players = requested_players.unwrap_or(min);
    if num_players < min || num_players > max {
        return Err(GameError::InvalidPlayerCount { min, max });
    }

    let mut game = GameState::new(topology(spec)?, seed);
    seat_players(spec, &mut game, num_players);
    create_zones(spec, &mut game);
    initialize_variables(spec, &mut game);
    for step in &spec.setup.steps {
        execute_step(&mut game, step);
    }
    game.current_phase =
        spec.game_flow.initial_phase.clone().unwrap_or_else(|| "main_turn".to_string());

    info!(
        name = spec.metadata.name.as_str(),
        players = game.players.len(),
        entities = game.entities.len(),
        "setup complete"
    );
    Ok(game)
}

fn topology(spec: &GameSpec) -> GameResult<Topology> {
    match spec.topology.kind.as_str() {
        "discrete" => {
            let structure = spec.topology.structure.as_deref().unwrap_or("");
            match extract_ints(structure).as_slice() {
                [width, height, ..] => Ok(Topology::Grid { width: *width, height: *height }),
                _ => Err(GameError::SpecLoad(format!(
                    "discrete topology needs a structure like grid(8,8), got '{structure}'"
                ))),
            }
        }
        "zones" => Ok(Topology::Zones),
        other => Err(GameError::SpecLoad(format!("unknown topology type '{other}'"))),
    }
}

fn seat_players(spec: &GameSpec, game: &mut GameState, num_players: usize) {
    if spec.players.dynamic_roles {
        let template =
            spec.players.roles.first().map(|r| convert_attrs(game, &r.attributes));
        for i in 1..=num_players {
            game.players.insert(Player::new(
                format!("Player{i}"),
                template.clone().unwrap_or_default(),
            ));
        }
    } else {
        for role in spec.players.roles.iter().take(num_players) {
            let attrs = convert_attrs(game, &role.attributes);
            game.players.insert(Player::new(role.name.clone(), attrs));
        }
    }
}

fn create_zones(spec: &GameSpec, game: &mut GameState) {
    for (name, zone_spec) in &spec.topology.zones {
        let mut owner = None;
        if let Some(owner_expr) = &zone_spec.owner {
            if let Some(player) = player_ref(owner_expr) {
                if !game.players.contains(&player) {
                    warn!(zone = name.as_str(), owner = %player, "owner not seated; zone skipped");
                    continue;
                }
                owner = Some(player);
            }
        }
        let visible_to = zone_spec
            .visible_to
            .iter()
            .filter_map(|v| player_ref(v))
            .filter(|p| game.players.contains(p))
            .collect();
        game.zones.insert(Zone {
            name: ZoneName::new(name.clone()),
            kind: zone_spec.kind.clone(),
            owner,
            visible: zone_spec.visible,
            ordered: zone_spec.ordered,
            visible_to,
            entities: Vec::new(),
        });
    }
}

fn initialize_variables(spec: &GameSpec, game: &mut GameState) {
    for (name, var) in &spec.state_schema.global {
        let value = initial_value(game, &var.initial);
        debug!(name = name.as_str(), ?value, "state variable");
        if name == "current_player" {
            if let Value::Player(player) = &value {
                game.current_player = Some(player.clone());
                continue;
            }
        }
        game.set_var(name.clone(), value);
    }
}

/// `player('X')` strings resolve to player references, numeric strings to
/// ints, anything else stays what it was (floats truncate, as ints are the
/// only counter type the rule language steps).
fn initial_value(game: &GameState, initial: &serde_json::Value) -> Value {
    match initial {
        serde_json::Value::String(s) => {
            if let Some(player) = player_ref(s) {
                return if game.players.contains(&player) {
                    Value::Player(player)
                } else {
                    Value::Null
                };
            }
            match s.trim().parse::<i64>() {
                Ok(n) => Value::Int(n),
                Err(_) => Value::Str(s.clone()),
            }
        }
        serde_json::Value::Bool(b) => Value::Int(*b as i64),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Int(n.as_f64().unwrap_or(0.0) as i64),
        },
        other => Value::from(other),
    }
}

fn execute_step(game: &mut GameState, step: &SetupStep) {
    match step {
        SetupStep::SpawnEntity { schema, set_attributes, at } => {
            spawn_entities(game, schema, set_attributes, at)
        }
        SetupStep::ShuffleZone { zone } => {
            let name = ZoneName::new(zone.clone());
            let GameState { zones, rng, .. } = game;
            match zones.get_mut(&name) {
                Some(zone) => zone.entities.shuffle(rng),
                None => warn!(zone = name.as_str(), "cannot shuffle unknown zone"),
            }
        }
        SetupStep::DealCards { from, to, count } => {
            let Some(src) = zone_ref(from) else {
                warn!(from = from.as_str(), "deal source is not a zone reference");
                return;
            };
            let targets: Vec<ZoneName> = to
                .iter()
                .filter_map(|t| zone_ref(t))
                .filter(|z| game.zones.get(z).is_some())
                .collect();
            if !targets.is_empty() {
                zones::deal_round_robin(game, &src, &targets, *count);
            }
        }
        SetupStep::MoveCard { from, to, count } => {
            if let (Some(src), Some(dst)) = (zone_ref(from), zone_ref(to)) {
                zones::draw_cards(game, &src, &dst, *count);
            }
        }
    }
}

fn spawn_entities(game: &mut GameState, schema: &str, set_attributes: &AttrMap, at: &[String]) {
    let owner = set_attributes
        .get("owner")
        .and_then(|v| v.as_str())
        .and_then(player_ref)
        .filter(|p| game.players.contains(p));

    let mut attrs = BTreeMap::new();
    for (key, value) in set_attributes {
        if key == "owner" {
            continue;
        }
        attrs.insert(key.clone(), attr_value(game, value));
    }

    let locations: Vec<SpawnLocation> =
        at.iter().flat_map(|loc| parse_locations(loc)).collect();
    for location in locations {
        let id = game.entities.spawn(schema, owner.clone(), attrs.clone());
        match location {
            SpawnLocation::Cell(coord) => {
                game.board.place(coord, id);
                if let Some(entity) = game.entities.get_mut(id) {
                    entity.pos = Some(Position::At(coord));
                }
            }
            SpawnLocation::InZone(name) => match game.zones.get_mut(&name) {
                Some(zone) => {
                    zone.push(id);
                    if let Some(entity) = game.entities.get_mut(id) {
                        entity.pos = Some(Position::In(name.clone()));
                    }
                }
                None => warn!(zone = name.as_str(), "spawn target zone does not exist"),
            },
        }
    }
}

/// Attribute values in spawn steps pass through as-is except `player('X')`
/// strings, which become player references (null when no such player).
fn attr_value(game: &GameState, value: &serde_json::Value) -> Value {
    if let Some(text) = value.as_str() {
        if text.starts_with("player('") {
            return match player_ref(text).filter(|p| game.players.contains(p)) {
                Some(player) => Value::Player(player),
                None => Value::Null,
            };
        }
    }
    Value::from(value)
}

enum SpawnLocation {
    Cell(Coord),
    InZone(ZoneName),
}

/// Location micro-syntax: `grid_nodes(x0,y0,x1,y1)` enumerates the
/// inclusive rectangle row-major from the bottom; `zone('Name')` is a
/// single zone placement. Anything else resolves to no locations.
fn parse_locations(location: &str) -> Vec<SpawnLocation> {
    match &*expr::parse(location) {
        Expr::Call { name, args } if name == "grid_nodes" => {
            let ints: Vec<i64> =
                args.iter().filter_map(|a| match a {
                    Expr::Int(n) => Some(*n),
                    _ => None,
                }).collect();
            let [x_min, y_min, x_max, y_max] = ints.as_slice() else {
                warn!(location, "grid_nodes needs four integer bounds");
                return Vec::new();
            };
            let mut cells = Vec::new();
            for y in *y_min..=*y_max {
                for x in *x_min..=*x_max {
                    cells.push(SpawnLocation::Cell(Coord::new(x, y)));
                }
            }
            cells
        }
        Expr::Call { name, args } if name == "zone" => match args.as_slice() {
            [Expr::Str(zone)] => vec![SpawnLocation::InZone(ZoneName::new(zone.clone()))],
            _ => Vec::new(),
        },
        _ => {
            warn!(location, "unrecognized spawn location");
            Vec::new()
        }
    }
}

fn convert_attrs(game: &GameState, attrs: &AttrMap) -> BTreeMap<String, Value> {
    attrs.iter().map(|(k, v)| (k.clone(), attr_value(game, v))).collect()
}

/// Recognizes the `player('Name')` micro-syntax.
fn player_ref(text: &str) -> Option<PlayerName> {
    match &*expr::parse(text) {
        Expr::Call { name, args } if name == "player" => match args.as_slice() {
            [Expr::Str(player)] => Some(PlayerName::new(player.clone())),
            _ => None,
        },
        _ => None,
    }
}

/// Recognizes the `zone('Name')` micro-syntax.
fn zone_ref(text: &str) -> Option<ZoneName> {
    match &*expr::parse(text) {
        Expr::Call { name, args } if name == "zone" => match args.as_slice() {
            [Expr::Str(zone)] => Some(ZoneName::new(zone.clone())),
            _ => None,
        },
        _ => None,
    }
}

/// Runs of decimal digits anywhere in the string, in order. The tolerant
/// reading grid shapes get: `grid(8,8)`, `8x8` and `grid 8 by 8` all yield
/// `[8, 8]`.
fn extract_ints(text: &str) -> Vec<i64> {
    let mut ints = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if c.is_ascii_digit() {
            current.push(c);
        } else if !current.is_empty() {
            if let Ok(n) = current.parse() {
                ints.push(n);
            }
            current.clear();
        }
    }
    if !current.is_empty() {
        if let Ok(n) = current.parse() {
            ints.push(n);
        }
    }
    ints
}
