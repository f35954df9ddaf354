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

use std::fmt;

use serde::{Deserialize, Serialize};

/// An identifier for an entity within a game.
///
/// Ids are assigned monotonically by the entity table and are never reused
/// within a run, so an id remains a stable address for the same logical
/// entity across state snapshots.
#[derive(
    Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct EntityId(pub u64);

impl EntityId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifies a struct that is 1:1 associated with a given [EntityId].
pub trait HasEntityId {
    fn entity_id(&self) -> EntityId;
}

impl HasEntityId for EntityId {
    fn entity_id(&self) -> EntityId {
        *self
    }
}

/// Identifies one of the players in a game.
///
/// Player identity is the name: two references with the same name denote the
/// same player, and names are unique within a game.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct PlayerName(pub String);

impl PlayerName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies a zone by its unique name.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ZoneName(pub String);

impl ZoneName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A grid coordinate. `x` counts columns from the left, `y` counts rows from
/// the bottom, both zero-based.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct Coord {
    pub x: i64,
    pub y: i64,
}

impl Coord {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Parses a board label like `A1` or `C12`: one column letter (`A` = 0)
    /// followed by a 1-based decimal row. Bounds are the caller's concern.
    pub fn parse_label(label: &str) -> Option<Coord> {
        let mut chars = label.chars();
        let col = chars.next()?;
        if !col.is_ascii_alphabetic() {
            return None;
        }
        let row_str = chars.as_str();
        if row_str.is_empty() || !row_str.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let row: i64 = row_str.parse().ok()?;
        Some(Coord { x: (col.to_ascii_uppercase() as u8 - b'A') as i64, y: row - 1 })
    }

    /// The inverse of [Self::parse_label] for on-board coordinates.
    pub fn label(&self) -> String {
        if (0..26).contains(&self.x) && self.y >= 0 {
            format!("{}{}", (b'A' + self.x as u8) as char, self.y + 1)
        } else {
            format!("({}, {})", self.x, self.y)
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The coordinate space of a game.
///
/// Grid games have a board of `width` × `height` cells; zone games have no
/// coordinate space at all and play entirely out of named zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topology {
    Grid { width: i64, height: i64 },
    Zones,
}

impl Topology {
    pub fn is_grid(&self) -> bool {
        matches!(self, Topology::Grid { .. })
    }

    /// True if `coord` lies inside this topology's board rectangle. Always
    /// false for zone topologies.
    pub fn contains(&self, coord: Coord) -> bool {
        match self {
            Topology::Grid { width, height } => {
                (0..*width).contains(&coord.x) && (0..*height).contains(&coord.y)
            }
            Topology::Zones => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_label_round_trips() {
        let c3 = Coord::parse_label("C3").unwrap();
        assert_eq!(c3, Coord::new(2, 2));
        assert_eq!(c3.label(), "C3");
        assert_eq!(Coord::parse_label("a10"), Some(Coord::new(0, 9)));
    }

    #[test]
    fn parse_label_rejects_garbage() {
        assert_eq!(Coord::parse_label(""), None);
        assert_eq!(Coord::parse_label("A"), None);
        assert_eq!(Coord::parse_label("11"), None);
        assert_eq!(Coord::parse_label("AA1"), None);
        assert_eq!(Coord::parse_label("A-1"), None);
    }

    #[test]
    fn topology_bounds() {
        let grid = Topology::Grid { width: 8, height: 8 };
        assert!(grid.contains(Coord::new(0, 0)));
        assert!(grid.contains(Coord::new(7, 7)));
        assert!(!grid.contains(Coord::new(8, 0)));
        assert!(!grid.contains(Coord::new(0, -1)));
        assert!(!Topology::Zones.contains(Coord::new(0, 0)));
    }
}
