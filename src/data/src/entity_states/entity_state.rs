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

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::primitives::{Coord, EntityId, HasEntityId, PlayerName, ZoneName};
use crate::core::value::Value;

/// Where an entity currently sits: a board cell or a zone. Entities with no
/// position exist only in the entity table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    At(Coord),
    In(ZoneName),
}

/// A game piece or card.
///
/// `schema` classifies the entity kind and is opaque to the engine. `rank`
/// is the one attribute every entity carries (games promote pieces by
/// assigning to it); everything else the spawning document declared lives in
/// the attribute bag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub schema: String,
    pub owner: Option<PlayerName>,
    pub rank: String,
    pub pos: Option<Position>,
    pub attributes: BTreeMap<String, Value>,
}

impl Entity {
    pub fn attribute(&self, name: &str) -> Value {
        self.attributes.get(name).cloned().unwrap_or(Value::Null)
    }
}

impl HasEntityId for Entity {
    fn entity_id(&self) -> EntityId {
        self.id
    }
}

/// Stores the state of all entities in a game, addressed by id.
///
/// Ids are handed out monotonically and never reused, so a snapshot of the
/// state resolves the same id to the same logical entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entities {
    all: BTreeMap<EntityId, Entity>,

    /// Next id to assign.
    next_id: EntityId,
}

impl Entities {
    /// Creates a new entity from a spawning document's attribute bag.
    ///
    /// The `rank` attribute is lifted out of the bag (default `"man"`); the
    /// caller resolves `owner` separately. The entity starts with no
    /// position.
    pub fn spawn(
        &mut self,
        schema: impl Into<String>,
        owner: Option<PlayerName>,
        mut attributes: BTreeMap<String, Value>,
    ) -> EntityId {
        let rank = match attributes.remove("rank") {
            Some(Value::Str(rank)) => rank,
            Some(other) => other.to_string(),
            None => "man".to_string(),
        };
        let id = self.next_id;
        self.next_id = EntityId(id.0 + 1);
        self.all.insert(
            id,
            Entity { id, schema: schema.into(), owner, rank, pos: None, attributes },
        );
        id
    }

    pub fn get(&self, id: impl HasEntityId) -> Option<&Entity> {
        self.all.get(&id.entity_id())
    }

    pub fn get_mut(&mut self, id: impl HasEntityId) -> Option<&mut Entity> {
        self.all.get_mut(&id.entity_id())
    }

    pub fn contains(&self, id: impl HasEntityId) -> bool {
        self.all.contains_key(&id.entity_id())
    }

    pub fn remove(&mut self, id: impl HasEntityId) -> Option<Entity> {
        self.all.remove(&id.entity_id())
    }

    pub fn iter(&self) -> btree_map::Values<'_, EntityId, Entity> {
        self.all.values()
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_assigns_monotonic_ids() {
        let mut entities = Entities::default();
        let a = entities.spawn("piece", None, BTreeMap::new());
        let b = entities.spawn("piece", None, BTreeMap::new());
        entities.remove(a);
        let c = entities.spawn("piece", None, BTreeMap::new());
        assert!(b > a);
        assert!(c > b, "removed ids must never be reused");
        assert_eq!(entities.len(), 2);
    }

    #[test]
    fn spawn_lifts_rank_out_of_the_bag() {
        let mut entities = Entities::default();
        let mut attrs = BTreeMap::new();
        attrs.insert("rank".to_string(), Value::Str("king".into()));
        attrs.insert("color".to_string(), Value::Str("red".into()));
        let id = entities.spawn("piece", None, attrs);
        let entity = entities.get(id).unwrap();
        assert_eq!(entity.rank, "king");
        assert_eq!(entity.attribute("color"), Value::Str("red".into()));
        assert!(entity.attributes.get("rank").is_none());
    }

    #[test]
    fn rank_defaults_to_man() {
        let mut entities = Entities::default();
        let id = entities.spawn("piece", None, BTreeMap::new());
        assert_eq!(entities.get(id).unwrap().rank, "man");
    }
}
