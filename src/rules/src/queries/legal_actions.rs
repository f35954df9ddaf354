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

use data::game_states::game_state::GameState;
use data::specs::game_spec::{ActionSpec, GameSpec};
use once_cell::sync::Lazy;
use tracing::debug;

use crate::eval::evaluator::{eval_condition, Context};

/// An action listed in `allowed_actions` but absent from the interactions
/// table matches trivially in grid mode: no conditions, no effects.
static EMPTY_ACTION: Lazy<ActionSpec> = Lazy::new(ActionSpec::default);

/// Finds the first action allowed by the current phase whose conditions all
/// hold for the bound segment context. Declaration order in
/// `allowed_actions` is the matching priority.
pub fn find_for_segment<'a>(
    spec: &'a GameSpec,
    game: &mut GameState,
    ctx: &Context,
) -> Option<(&'a str, &'a ActionSpec)> {
    let phase = game.current_phase.clone();
    let allowed = spec.phase(&phase).map(|p| p.allowed_actions.as_slice()).unwrap_or(&[]);
    for name in allowed {
        debug!(action = name.as_str(), "testing action");
        let action = spec.action(name).unwrap_or(&EMPTY_ACTION);
        if conditions_met(game, ctx, &action.conditions, false) {
            debug!(action = name.as_str(), "action matched");
            return Some((name.as_str(), action));
        }
    }
    debug!("no valid action found");
    None
}

/// Card-mode matching over an explicit candidate list. Candidates missing
/// from the interactions table are skipped. When no card is selected (the
/// draw input), conditions whose source mentions `card.` are skipped rather
/// than evaluated against nothing.
pub fn find_card_action<'a>(
    spec: &'a GameSpec,
    game: &mut GameState,
    ctx: &Context,
    candidates: &[String],
    has_card: bool,
) -> Option<(String, &'a ActionSpec)> {
    for name in candidates {
        let Some(action) = spec.action(name) else { continue };
        debug!(action = name.as_str(), "testing action");
        if conditions_met(game, ctx, &action.conditions, !has_card) {
            debug!(action = name.as_str(), "action matched");
            return Some((name.clone(), action));
        }
    }
    None
}

fn conditions_met(
    game: &mut GameState,
    ctx: &Context,
    conditions: &[String],
    skip_card_conditions: bool,
) -> bool {
    for condition in conditions {
        if skip_card_conditions && condition.contains("card.") {
            continue;
        }
        let result = eval_condition(game, ctx, condition);
        debug!(condition = condition.as_str(), ?result, "condition");
        if !result.truthy() {
            return false;
        }
    }
    true
}
