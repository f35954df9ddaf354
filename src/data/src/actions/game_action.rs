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

use crate::core::primitives::Coord;

/// A single player input, as produced by the interactive loop or the move
/// script reader and consumed by the turn controller.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum GameAction {
    /// Move the entity at the first position along the path. Requires at
    /// least two positions; paths of more than two demand a `chainable`
    /// action for every segment.
    MovePath(Vec<Coord>),

    /// Play the n-th card of the current player's hand (1-based, matching
    /// what the hand rendering shows).
    PlayCard(usize),

    /// Take the draw action instead of playing a card.
    DrawCard,
}
