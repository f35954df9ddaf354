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

use std::fmt::Write;

use data::core::primitives::{Coord, PlayerName, Topology, ZoneName};
use data::game_states::game_state::GameState;
use data::specs::game_spec::ProfileSpec;
use itertools::Itertools;

use crate::rendering::assets;

/// Renders the whole game surface for the given viewer: the grid for grid
/// topologies, the zone listing otherwise. The viewer controls which hands
/// are revealed; grid games have no hidden information and pass None.
pub fn render(
    game: &mut GameState,
    profile: &ProfileSpec,
    viewer: Option<&PlayerName>,
) -> String {
    match game.topology {
        Topology::Grid { .. } => render_grid(game, profile),
        Topology::Zones => render_zones(game, profile, viewer),
    }
}

/// Column letters across the top and bottom, row numbers down both sides,
/// highest row first. Empty cells alternate the profile's light and dark
/// squares.
fn render_grid(game: &mut GameState, profile: &ProfileSpec) -> String {
    let Topology::Grid { width, height } = game.topology else {
        return String::new();
    };
    let light = profile
        .topology_assets
        .get("empty_light_square")
        .cloned()
        .unwrap_or_else(|| "  ".to_string());
    let dark = profile
        .topology_assets
        .get("empty_dark_square")
        .cloned()
        .unwrap_or_else(|| "##".to_string());
    let header: String =
        (0..width).map(|x| format!(" {} ", column_letter(x))).join("");

    let mut out = String::new();
    let _ = writeln!(out, "\n  {header}");
    for y in (0..height).rev() {
        let mut row = format!("{} ", y + 1);
        for x in 0..width {
            match game.board.get(Coord::new(x, y)) {
                Some(id) => {
                    let asset = assets::entity_asset(game, profile, id, false);
                    let _ = write!(row, " {asset} ");
                }
                None => {
                    row.push_str(if (x + y) % 2 == 0 { &light } else { &dark });
                    row.push(' ');
                }
            }
        }
        let _ = writeln!(out, "{row} {}", y + 1);
    }
    let _ = writeln!(out, "  {header}");
    out.push('\n');
    out
}

fn column_letter(x: i64) -> char {
    (b'A' + (x.clamp(0, 25)) as u8) as char
}

/// Zone listing: public unowned zones first, then the other players' hands
/// (count only), then the viewer's own hand with selection indices.
fn render_zones(
    game: &mut GameState,
    profile: &ProfileSpec,
    viewer: Option<&PlayerName>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", "=".repeat(60));

    let unowned: Vec<ZoneName> = game
        .zones
        .iter()
        .filter(|z| z.owner.is_none())
        .map(|z| z.name.clone())
        .collect();
    for name in unowned {
        render_zone(&mut out, game, profile, &name, viewer);
    }

    if let Some(viewer) = viewer {
        let others: Vec<ZoneName> = game
            .zones
            .iter()
            .filter(|z| z.owner.as_ref().is_some_and(|o| o != viewer))
            .map(|z| z.name.clone())
            .collect();
        for name in others {
            render_zone(&mut out, game, profile, &name, Some(viewer));
        }
        let own: Vec<ZoneName> = game
            .zones
            .iter()
            .filter(|z| z.owner.as_ref() == Some(viewer))
            .map(|z| z.name.clone())
            .collect();
        for name in own {
            render_zone(&mut out, game, profile, &name, Some(viewer));
        }
    }

    let _ = writeln!(out, "{}", "=".repeat(60));
    out.push('\n');
    out
}

fn render_zone(
    out: &mut String,
    game: &mut GameState,
    profile: &ProfileSpec,
    name: &ZoneName,
    viewer: Option<&PlayerName>,
) {
    let Some(zone) = game.zones.get(name) else { return };
    let owner = zone.owner.clone();
    let visible = zone.visible;
    let entities = zone.entities.clone();

    match owner {
        Some(owner) => {
            let _ = writeln!(out, "\n{owner}'s HAND:");
            if Some(&owner) == viewer {
                if entities.is_empty() {
                    out.push_str("  (empty)\n");
                } else {
                    for (i, id) in entities.iter().enumerate() {
                        let asset = assets::entity_asset(game, profile, *id, false);
                        let _ = writeln!(out, "  [{}] {asset}", i + 1);
                    }
                }
            } else {
                let _ = writeln!(out, "  {} cards (hidden)", entities.len());
            }
        }
        None => {
            let title = name.as_str().to_uppercase().replace('_', " ");
            let _ = writeln!(out, "\n{title}:");
            if entities.is_empty() {
                out.push_str("  (empty)\n");
            } else if !visible {
                let _ = writeln!(out, "  {} cards (hidden)", entities.len());
            } else if let Some(top) = entities.last() {
                let asset = assets::entity_asset(game, profile, *top, false);
                let _ = writeln!(out, "  Top card: {asset} ({} total)", entities.len());
            }
        }
    }
}
