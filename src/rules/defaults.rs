//! Default catch-all rules.
//!
//! These are ordinary triggers with no source entity, registered at
//! `default_rule_priority` so card abilities always get first refusal.

use crate::core::EngineConfig;
use crate::effects::Effect;
use crate::expr::Expr;
use crate::triggers::{Trigger, TriggerTiming, STANDARD_ACTION_AFTER};

/// Name of the default scoring rule.
pub const SCORING_RULE: &str = "rule:score-made-shot";

/// A made shot scores `score_value` for the shooting team, plus
/// `bonus_score` when the skill test earned a bonus.
#[must_use]
pub fn scoring_rule(config: &EngineConfig) -> Trigger {
    let condition = Expr::path_eq("action", "shoot").and(Expr::path_eq("success", true));
    let effect = Effect::Sequence(vec![
        Effect::modify_score(Expr::path("team"), config.score_value),
        Effect::when(
            Expr::path_eq("bonus", true),
            Effect::modify_score(Expr::path("team"), config.bonus_score),
        ),
    ]);
    Trigger::new(SCORING_RULE, STANDARD_ACTION_AFTER, effect)
        .with_timing(TriggerTiming::After)
        .with_priority(config.default_rule_priority)
        .with_condition(condition)
}

/// All default rules.
#[must_use]
pub fn default_rules(config: &EngineConfig) -> Vec<Trigger> {
    vec![scoring_rule(config)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoring_rule_uses_config() {
        let config = EngineConfig::new().with_default_rule_priority(900);
        let rule = scoring_rule(&config);
        assert_eq!(rule.priority, 900);
        assert!(rule.bindings.source.is_none());
        assert!(rule.condition.is_some());
    }

    #[test]
    fn test_default_rules() {
        let rules = default_rules(&EngineConfig::new());
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, SCORING_RULE);
    }
}
