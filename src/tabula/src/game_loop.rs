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

use std::collections::VecDeque;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use color_eyre::Result;
use data::actions::game_action::GameAction;
use data::core::primitives::{Coord, Topology};
use data::game_states::game_state::{GameState, GameStatus};
use data::specs::game_spec::{GameSpec, ProfileSpec};
use display::rendering::{assets, render};
use rules::core::handle_action;
use rules::queries::players;
use rules::steps::step;
use tracing::warn;
use utils::outcome::{GameError, GameResult};

/// Drives the interactive loop matching the game's topology until the
/// player quits, input ends, or someone wins.
pub fn run(spec: &GameSpec, mut game: GameState, moves_path: Option<&Path>) -> Result<()> {
    let default_profile = ProfileSpec::default();
    let profile = spec.profile("ascii").unwrap_or(&default_profile);
    match game.topology {
        Topology::Grid { .. } => run_grid(spec, &mut game, profile, moves_path),
        Topology::Zones => run_cards(spec, &mut game, profile),
    }
}

fn run_grid(
    spec: &GameSpec,
    game: &mut GameState,
    profile: &ProfileSpec,
    moves_path: Option<&Path>,
) -> Result<()> {
    let mut script: VecDeque<String> = VecDeque::new();
    let mut scripted = false;
    if let Some(path) = moves_path {
        match fs::read_to_string(path) {
            Ok(text) => {
                script = text
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(String::from)
                    .collect();
                scripted = true;
                println!("--- Running in scripted mode from '{}' ---", path.display());
            }
            Err(e) => {
                println!("!! Error: moves file not found at '{}' ({e})", path.display());
                return Ok(());
            }
        }
    }

    loop {
        print!("{}", render::render(game, profile, None));
        let Some(current) = game.current_player.clone() else {
            println!("Game over or error: No current player.");
            break;
        };
        println!("Turn: {current}");

        let line = if scripted {
            match script.pop_front() {
                Some(line) => {
                    println!("Executing from file: {line}");
                    line
                }
                None => {
                    scripted = false;
                    println!("--- End of script. Now in interactive mode. ---");
                    match prompt(&format!(
                        "Player '{current}', enter move (e.g., A1 B2) or 'quit': "
                    ))? {
                        Some(line) => line,
                        None => break,
                    }
                }
            }
        } else {
            match prompt(&format!(
                "Player '{current}', enter move (e.g., A1 B2) or 'quit': "
            ))? {
                Some(line) => line,
                None => break,
            }
        };

        if line.eq_ignore_ascii_case("quit") {
            println!("Game ended by user.");
            break;
        }

        if line.split_whitespace().count() < 2 {
            println!("!! A move requires at least a start and end position.");
            continue;
        }
        let path = match parse_path(game, &line) {
            Ok(path) => path,
            Err(error) => {
                // A malformed position re-prompts without giving up on the
                // rest of the script.
                println!("!! {error}");
                continue;
            }
        };
        if let Err(error) = handle_action::execute(spec, game, GameAction::MovePath(path)) {
            report_failure(&line, error, &mut scripted);
        }
    }
    Ok(())
}

/// Splits a move line into board coordinates, validating the position
/// format and the board bounds.
fn parse_path(game: &GameState, line: &str) -> GameResult<Vec<Coord>> {
    line.split_whitespace()
        .map(|label| {
            let coord = Coord::parse_label(label)
                .ok_or_else(|| GameError::InvalidPosition(label.to_string()))?;
            if !game.topology.contains(coord) {
                return Err(GameError::OutOfBounds(label.to_string()));
            }
            Ok(coord)
        })
        .collect()
}

fn report_failure(line: &str, error: GameError, scripted: &mut bool) {
    println!("!! {error}");
    if *scripted {
        let error = GameError::ScriptedMoveFailed {
            line: line.to_string(),
            cause: Box::new(error),
        };
        warn!(%error, "aborting script");
        println!("!! Aborting script. Switching to interactive mode.");
        *scripted = false;
    }
}

fn run_cards(spec: &GameSpec, game: &mut GameState, profile: &ProfileSpec) -> Result<()> {
    loop {
        let Some(current) = game.current_player.clone() else {
            println!("Game over or error: No current player.");
            break;
        };
        print!("{}", render::render(game, profile, Some(&current)));
        println!("\n>>> {current}'s Turn <<<");

        let hand = players::hand_zone(game, &current);
        let hand_empty = hand
            .as_ref()
            .and_then(|name| game.zones.get(name))
            .map(|zone| zone.is_empty())
            .unwrap_or(true);
        if hand_empty {
            println!("You have no cards! Skipping turn.");
            step::rotate_turn(game);
            continue;
        }

        let Some(line) = prompt("Enter card # to play, 0 to draw (or 'quit'): ")? else {
            break;
        };
        if line.eq_ignore_ascii_case("quit") {
            println!("Game ended by user.");
            break;
        }
        let Ok(number) = line.trim().parse::<usize>() else {
            println!("!! Invalid input. Enter a card number.");
            continue;
        };

        let (action, played) = if number == 0 {
            (GameAction::DrawCard, None)
        } else {
            let played = hand
                .as_ref()
                .and_then(|name| game.zones.get(name))
                .and_then(|zone| zone.entities.get(number - 1))
                .copied();
            (GameAction::PlayCard(number), played)
        };

        match handle_action::execute(spec, game, action) {
            Ok(()) => {
                match played {
                    Some(id) => {
                        println!("\nPlayed {}", assets::entity_asset(game, profile, id, false))
                    }
                    None => println!("\nDrew a card."),
                }
                if let GameStatus::GameOver { winner } = game.status.clone() {
                    print!("{}", render::render(game, profile, Some(&current)));
                    println!("\n\n*** {winner} WINS! ***");
                    break;
                }
            }
            Err(error) => {
                println!("\n!! {error}");
                println!("Try again.");
            }
        }
    }
    Ok(())
}

/// Writes the prompt to stdout and reads one line. None means end of input.
fn prompt(message: &str) -> io::Result<Option<String>> {
    print!("{message}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
