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

use crate::core::primitives::{Coord, EntityId, HasEntityId};

/// The grid surface: a sparse mapping from coordinate to the single entity
/// occupying that cell. Only grid-topology games have a non-empty board.
///
/// Serialized as a sequence of `(coordinate, entity)` pairs; JSON cannot
/// key an object by a coordinate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Board {
    #[serde(with = "cells_as_pairs")]
    cells: BTreeMap<Coord, EntityId>,
}

mod cells_as_pairs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::*;

    pub fn serialize<S: Serializer>(
        cells: &BTreeMap<Coord, EntityId>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        cells.iter().collect::<Vec<_>>().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<Coord, EntityId>, D::Error> {
        Ok(Vec::<(Coord, EntityId)>::deserialize(deserializer)?.into_iter().collect())
    }
}

impl Board {
    pub fn get(&self, coord: Coord) -> Option<EntityId> {
        self.cells.get(&coord).copied()
    }

    /// Occupies a cell, replacing any previous occupant.
    pub fn place(&mut self, coord: Coord, id: EntityId) {
        self.cells.insert(coord, id);
    }

    pub fn clear(&mut self, coord: Coord) -> Option<EntityId> {
        self.cells.remove(&coord)
    }

    /// Clears every cell holding the given entity.
    pub fn remove_entity(&mut self, id: impl HasEntityId) {
        let id = id.entity_id();
        self.cells.retain(|_, occupant| *occupant != id);
    }

    /// The cell currently holding the given entity, if any.
    pub fn position_of(&self, id: impl HasEntityId) -> Option<Coord> {
        let id = id.entity_id();
        self.cells
            .iter()
            .find(|(_, occupant)| **occupant == id)
            .map(|(coord, _)| *coord)
    }

    pub fn is_occupied(&self, coord: Coord) -> bool {
        self.cells.contains_key(&coord)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coord, EntityId)> + '_ {
        self.cells.iter().map(|(c, id)| (*c, *id))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
