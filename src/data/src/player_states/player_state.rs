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

use serde::{Deserialize, Serialize};

use crate::core::primitives::PlayerName;
use crate::core::value::Value;

/// A participant in a game: a unique name plus whatever attributes the game
/// document declared for the role (`color`, `score`, …).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub name: PlayerName,
    pub attributes: BTreeMap<String, Value>,
}

impl Player {
    pub fn new(name: impl Into<String>, attributes: BTreeMap<String, Value>) -> Self {
        Self { name: PlayerName::new(name), attributes }
    }

    pub fn attribute(&self, name: &str) -> Value {
        self.attributes.get(name).cloned().unwrap_or(Value::Null)
    }
}

/// State for the players within a game, in seating order.
///
/// Insertion order is significant: next-player rotation walks this sequence,
/// so players must be added in the order the game document declares them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Players {
    seats: Vec<Player>,
}

impl Players {
    /// Adds a player to the last seat. Names must be unique; a duplicate
    /// name replaces the existing player's attributes in place, mirroring
    /// map-like insertion.
    pub fn insert(&mut self, player: Player) {
        match self.seats.iter_mut().find(|p| p.name == player.name) {
            Some(existing) => *existing = player,
            None => self.seats.push(player),
        }
    }

    pub fn get(&self, name: &PlayerName) -> Option<&Player> {
        self.seats.iter().find(|p| &p.name == name)
    }

    pub fn get_mut(&mut self, name: &PlayerName) -> Option<&mut Player> {
        self.seats.iter_mut().find(|p| &p.name == name)
    }

    pub fn contains(&self, name: &PlayerName) -> bool {
        self.get(name).is_some()
    }

    /// Seat index of the named player, used for rotation arithmetic.
    pub fn seat_of(&self, name: &PlayerName) -> Option<usize> {
        self.seats.iter().position(|p| &p.name == name)
    }

    pub fn at_seat(&self, seat: usize) -> Option<&Player> {
        self.seats.get(seat)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.seats.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &PlayerName> {
        self.seats.iter().map(|p| &p.name)
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(name: &str) -> Player {
        Player::new(name, BTreeMap::new())
    }

    #[test]
    fn seating_preserves_insertion_order() {
        let mut players = Players::default();
        players.insert(player("Red"));
        players.insert(player("Black"));
        players.insert(player("Blue"));
        let names: Vec<_> = players.names().map(|n| n.as_str().to_string()).collect();
        assert_eq!(names, vec!["Red", "Black", "Blue"]);
        assert_eq!(players.seat_of(&PlayerName::new("Black")), Some(1));
    }

    #[test]
    fn duplicate_insert_replaces_in_place() {
        let mut players = Players::default();
        players.insert(player("Red"));
        players.insert(player("Black"));
        let mut attrs = BTreeMap::new();
        attrs.insert("score".to_string(), Value::Int(3));
        players.insert(Player::new("Red", attrs));
        assert_eq!(players.len(), 2);
        assert_eq!(players.seat_of(&PlayerName::new("Red")), Some(0));
        assert_eq!(
            players.get(&PlayerName::new("Red")).unwrap().attribute("score"),
            Value::Int(3)
        );
    }
}
