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

use data::core::primitives::EntityId;
use data::core::value::Value;
use data::game_states::game_state::GameState;
use data::specs::game_spec::ProfileSpec;
use rules::eval::evaluator::{eval_condition, Context};

/// Resolves the display asset for an entity from a presentation profile:
/// the first `entity_assets` rule whose condition holds, with `#` in the
/// asset standing for the entity's rank. Hidden entities show the card
/// back. No matching rule renders as `?`.
pub fn entity_asset(
    game: &mut GameState,
    profile: &ProfileSpec,
    id: EntityId,
    hide: bool,
) -> String {
    if hide {
        return profile.card_back.clone().unwrap_or_else(|| "??".to_string());
    }
    for rule in &profile.entity_assets {
        let ctx = Context::new().with("entity", Value::Entity(id));
        if eval_condition(game, &ctx, &rule.conditions).truthy() {
            if rule.asset.contains('#') {
                let rank = game.entity(id).map(|e| e.rank.clone()).unwrap_or_default();
                return rule.asset.replace('#', &rank);
            }
            return rule.asset.clone();
        }
    }
    "?".to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use data::core::primitives::Topology;
    use data::specs::game_spec::GameSpec;

    use super::*;

    fn profile() -> ProfileSpec {
        let spec = GameSpec::from_value(serde_json::json!({
            "metadata": {"name": "x"},
            "players": {"count": {}, "roles": []},
            "topology": {"type": "zones", "zones": {}},
            "presentation": {"profiles": {"ascii": {
                "entity_assets": [
                    {"conditions": "eq(entity.color, 'red')", "asset": "r#"},
                    {"conditions": "eq(entity.color, 'black')", "asset": "bb"}
                ],
                "card_back": "??"
            }}}
        }))
        .unwrap();
        spec.profile("ascii").unwrap().clone()
    }

    fn spawn(game: &mut GameState, color: &str) -> EntityId {
        let mut attrs = BTreeMap::new();
        attrs.insert("color".to_string(), Value::Str(color.into()));
        game.entities.spawn("piece", None, attrs)
    }

    #[test]
    fn first_matching_rule_wins_and_rank_substitutes() {
        let mut game = GameState::new(Topology::Zones, Some(6));
        let profile = profile();
        let red = spawn(&mut game, "red");
        let black = spawn(&mut game, "black");
        let unknown = spawn(&mut game, "purple");

        assert_eq!(entity_asset(&mut game, &profile, red, false), "rman");
        assert_eq!(entity_asset(&mut game, &profile, black, false), "bb");
        assert_eq!(entity_asset(&mut game, &profile, unknown, false), "?");

        game.entity_mut(red).unwrap().rank = "king".to_string();
        assert_eq!(entity_asset(&mut game, &profile, red, false), "rking");
    }

    #[test]
    fn hidden_entities_show_the_card_back() {
        let mut game = GameState::new(Topology::Zones, Some(6));
        let profile = profile();
        let red = spawn(&mut game, "red");
        assert_eq!(entity_asset(&mut game, &profile, red, true), "??");
    }
}
