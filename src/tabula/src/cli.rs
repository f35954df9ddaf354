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

use std::path::PathBuf;

use clap::Parser;

/// Runs a declarative game document as a playable terminal game.
#[derive(Debug, Parser)]
#[command(name = "tabula", version, about)]
pub struct Cli {
    /// Path to the game document (JSON).
    pub spec: PathBuf,

    /// Optional move script, one move per line (grid games), e.g. `C3 D4`.
    /// Play falls back to interactive mode when the script ends or fails.
    pub moves: Option<PathBuf>,

    /// Trace rule evaluation: tested actions, conditions and their results.
    #[arg(short, long)]
    pub verbose: bool,

    /// Number of players to seat. Defaults to the document's minimum.
    #[arg(short, long)]
    pub players: Option<usize>,

    /// Seed for the game RNG, making shuffles and dice reproducible.
    #[arg(long)]
    pub seed: Option<u64>,
}
