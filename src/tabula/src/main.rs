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

use clap::Parser;
use color_eyre::Result;
use data::specs::game_spec::GameSpec;
use rules::core::new_game;
use tracing::info;

use crate::cli::Cli;

mod cli;
mod game_loop;
mod logging;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::initialize(cli.verbose)?;
    color_eyre::install()?;

    let spec = GameSpec::from_path(&cli.spec)?;
    info!(name = spec.metadata.name.as_str(), "loaded game spec");
    println!("Successfully loaded game: {}", spec.metadata.name);

    let game = new_game::create(&spec, cli.players, cli.seed)?;
    game_loop::run(&spec, game, cli.moves.as_deref())
}
