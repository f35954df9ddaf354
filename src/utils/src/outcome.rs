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

use thiserror::Error;

/// Possible reasons why the rules engine rejects a player input or halts.
///
/// Every variant except [GameError::SpecLoad] is recoverable: the driver
/// reports it and re-prompts. A failed input never leaves a partially
/// applied move behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// The declarative game document could not be read or parsed. Fatal.
    #[error("failed to load game spec: {0}")]
    SpecLoad(String),

    /// A board position string such as `A1` could not be parsed.
    #[error("invalid position '{0}'")]
    InvalidPosition(String),

    /// A parsed position lies outside the board rectangle.
    #[error("position {0} is out of bounds")]
    OutOfBounds(String),

    /// The first position of a move path holds no entity.
    #[error("no piece at starting position")]
    NoPieceAtOrigin,

    /// No phase-allowed action matched a segment of the proposed path.
    #[error("invalid move sequence")]
    NoMatchingAction,

    /// A multi-segment path matched an action not declared `chainable`.
    #[error("action '{0}' cannot be chained")]
    NonChainableInChain(String),

    /// The card number does not name a card in the player's hand.
    #[error("invalid card number")]
    InvalidCardIndex,

    /// The selected card satisfied no playable action's conditions.
    #[error("cannot play that card")]
    CannotPlayCard,

    /// The draw action's conditions do not hold right now.
    #[error("cannot draw a card right now")]
    CannotDraw,

    /// A player in a zone-topology game has no owned hand zone.
    #[error("no hand zone found for player '{0}'")]
    NoHandZone(String),

    /// The requested player count falls outside the document's range.
    #[error("player count must be between {min} and {max}")]
    InvalidPlayerCount { min: usize, max: usize },

    /// A move read from a script file was rejected. The script driver
    /// abandons the rest of the file and falls back to interactive play.
    #[error("scripted move '{line}' failed: {cause}")]
    ScriptedMoveFailed { line: String, cause: Box<GameError> },
}

/// Represents the result of executing a player input against the rules.
pub type Outcome = Result<(), GameError>;

/// Equivalent alias to [Outcome] which wraps a returned value.
pub type GameResult<T> = Result<T, GameError>;

/// Input accepted and committed, play continues.
pub const OK: Outcome = Ok(());
