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

use serde::{Deserialize, Serialize};

use crate::core::primitives::{EntityId, HasEntityId, PlayerName, ZoneName};

/// A named, ordered container of entities: a hand, a deck, a discard pile.
///
/// The sequence runs bottom-to-top: the top card is the last element and
/// draws take from the head. `kind` (`stack`, `hand`, …) is opaque to the
/// engine; visibility fields drive rendering only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub name: ZoneName,
    pub kind: String,
    pub owner: Option<PlayerName>,
    pub visible: bool,
    pub ordered: bool,
    pub visible_to: Vec<PlayerName>,
    pub entities: Vec<EntityId>,
}

impl Zone {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: ZoneName::new(name),
            kind: kind.into(),
            owner: None,
            visible: true,
            ordered: true,
            visible_to: Vec::new(),
            entities: Vec::new(),
        }
    }

    /// The top of the pile, if any.
    pub fn top(&self) -> Option<EntityId> {
        self.entities.last().copied()
    }

    /// Removes and returns the entity at the head of the sequence. Draws
    /// and deals consume from here.
    pub fn take_head(&mut self) -> Option<EntityId> {
        if self.entities.is_empty() {
            None
        } else {
            Some(self.entities.remove(0))
        }
    }

    /// Appends to the tail (the top of the pile).
    pub fn push(&mut self, id: EntityId) {
        self.entities.push(id);
    }

    /// Detaches the given entity wherever it sits in the sequence.
    pub fn remove(&mut self, id: impl HasEntityId) -> bool {
        let id = id.entity_id();
        let before = self.entities.len();
        self.entities.retain(|e| *e != id);
        self.entities.len() != before
    }

    pub fn contains(&self, id: impl HasEntityId) -> bool {
        self.entities.contains(&id.entity_id())
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// All zones of a game, in the order the game document declared them. That
/// order is what the renderer walks, so it is kept rather than sorted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Zones {
    zones: Vec<Zone>,
}

impl Zones {
    pub fn insert(&mut self, zone: Zone) {
        match self.zones.iter_mut().find(|z| z.name == zone.name) {
            Some(existing) => *existing = zone,
            None => self.zones.push(zone),
        }
    }

    pub fn get(&self, name: &ZoneName) -> Option<&Zone> {
        self.zones.iter().find(|z| &z.name == name)
    }

    pub fn get_mut(&mut self, name: &ZoneName) -> Option<&mut Zone> {
        self.zones.iter_mut().find(|z| &z.name == name)
    }

    /// The zone currently holding the given entity, if any. An entity is in
    /// at most one zone at a time.
    pub fn containing(&self, id: impl HasEntityId) -> Option<&Zone> {
        let id = id.entity_id();
        self.zones.iter().find(|z| z.contains(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Zone> {
        self.zones.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_and_top_are_opposite_ends() {
        let mut zone = Zone::new("draw_pile", "stack");
        zone.push(EntityId(1));
        zone.push(EntityId(2));
        zone.push(EntityId(3));
        assert_eq!(zone.top(), Some(EntityId(3)));
        assert_eq!(zone.take_head(), Some(EntityId(1)));
        assert_eq!(zone.top(), Some(EntityId(3)));
        assert_eq!(zone.len(), 2);
    }

    #[test]
    fn containing_finds_the_single_holder() {
        let mut zones = Zones::default();
        let mut hand = Zone::new("red_hand", "hand");
        hand.push(EntityId(7));
        zones.insert(hand);
        zones.insert(Zone::new("discard_pile", "discard"));
        assert_eq!(zones.containing(EntityId(7)).unwrap().name.as_str(), "red_hand");
        assert!(zones.containing(EntityId(8)).is_none());
    }
}
