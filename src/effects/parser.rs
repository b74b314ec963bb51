//! The effect mini-language parser.
//!
//! Card behavior is persisted as a compact colon/semicolon string:
//!
//! ```text
//! effect_type:param1:param2[;effect_type:...]
//! ```
//!
//! This module is the sole parser and validator of that format; the card
//! authoring tool produces it and both sides honor this contract. Effect
//! definitions are authored data, not user input, so every malformed
//! string is a hard error at load time rather than a silent default.
//!
//! ## Grammar
//!
//! ```text
//! stat_boost:<stat>:<amount>[:<scope>]       continuous stat delta
//! auto_win:own_turn                          win tussles on own turn
//! cost_mod:<card|tussle>:<amount>[:<scope>]  cost alteration
//! protection:<effects|auto_win>              immunity
//! triggered:<event>:<action...>[:optional]   event-driven effect
//! activated:<cost>:<action...>               pay-CC ability
//! play:<action...>:<min>:<max>               one-shot on play
//! interrupt:cancel_tussle                    off-turn interrupt (stub)
//! ```
//!
//! Trigger/activated/play actions: `gain_cc:<n>`, `return_to_hand`,
//! `boost_turn:<stat>:<n>`, `restore_stamina:<n>`, `sleep_target`,
//! `return_target`, `take_control`, `transform_copy`, `damage_target:<n>`.

use thiserror::Error;

use crate::core::Stat;

use super::effect::{
    ActivatedAction, ActivatedEffect, ContinuousEffect, CostDomain, CostModEffect, EffectDef,
    EffectScope, InterruptEffect, PlayAction, PlayEffect, ProtectionEffect, TriggerEvent,
    TriggeredAction, TriggeredEffect,
};

/// Stat deltas outside this magnitude indicate authoring typos.
const MAX_STAT_DELTA: i32 = 9;

/// CC amounts are bounded by the CC cap.
const MAX_CC_AMOUNT: u8 = 7;

/// Failure to parse an effect definition string.
///
/// Raised at card-template load time; a library that fails to load is a
/// data bug that must be fixed before the game can run.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EffectParseError {
    #[error("unknown effect type `{0}`")]
    UnknownEffectType(String),

    #[error("`{effect}`: missing `{name}` parameter")]
    MissingParam { effect: String, name: &'static str },

    #[error("`{effect}`: invalid {name} `{value}`")]
    InvalidParam {
        effect: String,
        name: &'static str,
        value: String,
    },

    #[error("`{effect}`: expected {expected} parameters, got {got}")]
    WrongArity {
        effect: String,
        expected: &'static str,
        got: usize,
    },
}

/// Parse a full effect-definitions string into typed effects.
///
/// An empty or whitespace-only string is a card with no effects.
/// Semicolons separate effects; a trailing semicolon is tolerated.
pub fn parse_effects(input: &str) -> Result<Vec<EffectDef>, EffectParseError> {
    input
        .split(';')
        .map(str::trim)
        .filter(|seg| !seg.is_empty())
        .map(parse_one)
        .collect()
}

fn parse_one(segment: &str) -> Result<EffectDef, EffectParseError> {
    let parts: Vec<&str> = segment.split(':').map(str::trim).collect();
    let head = parts[0];
    let params = &parts[1..];

    match head {
        "stat_boost" => parse_stat_boost(segment, params),
        "auto_win" => parse_auto_win(segment, params),
        "cost_mod" => parse_cost_mod(segment, params),
        "protection" => parse_protection(segment, params),
        "triggered" => parse_triggered(segment, params),
        "activated" => parse_activated(segment, params),
        "play" => parse_play(segment, params),
        "interrupt" => parse_interrupt(segment, params),
        other => Err(EffectParseError::UnknownEffectType(other.to_string())),
    }
}

fn parse_stat_boost(segment: &str, params: &[&str]) -> Result<EffectDef, EffectParseError> {
    if params.len() < 2 || params.len() > 3 {
        return Err(wrong_arity(segment, "2 or 3", params.len()));
    }
    let stat = parse_stat(segment, params[0])?;
    let amount = parse_stat_delta(segment, params[1])?;
    let scope = match params.get(2) {
        Some(s) => parse_scope(segment, s, true)?,
        None => EffectScope::Team,
    };
    Ok(EffectDef::Continuous(ContinuousEffect::StatBoost {
        stat,
        amount,
        scope,
    }))
}

fn parse_auto_win(segment: &str, params: &[&str]) -> Result<EffectDef, EffectParseError> {
    match params {
        ["own_turn"] => Ok(EffectDef::Continuous(ContinuousEffect::AutoWinOnOwnTurn)),
        [other] => Err(invalid(segment, "condition", other)),
        _ => Err(wrong_arity(segment, "1", params.len())),
    }
}

fn parse_cost_mod(segment: &str, params: &[&str]) -> Result<EffectDef, EffectParseError> {
    if params.len() < 2 || params.len() > 3 {
        return Err(wrong_arity(segment, "2 or 3", params.len()));
    }
    let domain = match params[0] {
        "card" => CostDomain::Card,
        "tussle" => CostDomain::Tussle,
        other => return Err(invalid(segment, "cost domain", other)),
    };
    let amount = parse_stat_delta(segment, params[1])?;
    let scope = match params.get(2) {
        // A cost mod that only reaches its own card is meaningless, so
        // source_only is rejected here.
        Some(s) => parse_scope(segment, s, false)?,
        None => EffectScope::Team,
    };
    Ok(EffectDef::CostMod(CostModEffect {
        domain,
        amount,
        scope,
    }))
}

fn parse_protection(segment: &str, params: &[&str]) -> Result<EffectDef, EffectParseError> {
    match params {
        ["effects"] => Ok(EffectDef::Protection(ProtectionEffect::EffectImmunity)),
        ["auto_win"] => Ok(EffectDef::Protection(ProtectionEffect::NullifyAutoWin)),
        [other] => Err(invalid(segment, "protection kind", other)),
        _ => Err(wrong_arity(segment, "1", params.len())),
    }
}

fn parse_triggered(segment: &str, params: &[&str]) -> Result<EffectDef, EffectParseError> {
    let (params, mandatory) = match params.last() {
        Some(&"optional") => (&params[..params.len() - 1], false),
        _ => (params, true),
    };

    let event = match params.first() {
        Some(&"when_sleeped") => TriggerEvent::WhenSleeped,
        Some(&"when_played") => TriggerEvent::WhenPlayed,
        Some(&"start_of_turn") => TriggerEvent::StartOfTurn,
        Some(&"when_other_card_played") => TriggerEvent::WhenOtherCardPlayed,
        Some(other) => return Err(invalid(segment, "trigger event", other)),
        None => return Err(missing(segment, "trigger event")),
    };

    let action = match params.get(1) {
        Some(&"gain_cc") => {
            expect_arity(segment, params.len(), 3)?;
            TriggeredAction::GainCc(parse_cc_amount(segment, params[2])?)
        }
        Some(&"return_to_hand") => {
            expect_arity(segment, params.len(), 2)?;
            TriggeredAction::ReturnToHand
        }
        Some(&"boost_turn") => {
            expect_arity(segment, params.len(), 4)?;
            TriggeredAction::StatBoostThisTurn {
                stat: parse_stat(segment, params[2])?,
                amount: parse_stat_delta(segment, params[3])?,
            }
        }
        Some(other) => return Err(invalid(segment, "trigger action", other)),
        None => return Err(missing(segment, "trigger action")),
    };

    Ok(EffectDef::Triggered(TriggeredEffect {
        event,
        action,
        mandatory,
    }))
}

fn parse_activated(segment: &str, params: &[&str]) -> Result<EffectDef, EffectParseError> {
    let cost = match params.first() {
        Some(raw) => raw
            .parse::<u8>()
            .ok()
            .filter(|&c| c <= MAX_CC_AMOUNT)
            .ok_or_else(|| invalid(segment, "activation cost", raw))?,
        None => return Err(missing(segment, "activation cost")),
    };

    let action = match params.get(1) {
        Some(&"boost_turn") => {
            expect_arity(segment, params.len(), 4)?;
            ActivatedAction::StatBoostThisTurn {
                stat: parse_stat(segment, params[2])?,
                amount: parse_stat_delta(segment, params[3])?,
            }
        }
        Some(&"restore_stamina") => {
            expect_arity(segment, params.len(), 3)?;
            ActivatedAction::RestoreStamina(parse_positive_u8(segment, "stamina amount", params[2])?)
        }
        Some(other) => return Err(invalid(segment, "activated action", other)),
        None => return Err(missing(segment, "activated action")),
    };

    Ok(EffectDef::Activated(ActivatedEffect { cost, action }))
}

fn parse_play(segment: &str, params: &[&str]) -> Result<EffectDef, EffectParseError> {
    // The last two params are always the declared min/max target counts.
    if params.len() < 3 {
        return Err(wrong_arity(segment, "at least 3", params.len()));
    }
    let (action_params, arity_params) = params.split_at(params.len() - 2);

    let action = match action_params {
        ["sleep_target"] => PlayAction::SleepTarget,
        ["return_target"] => PlayAction::ReturnTargetToHand,
        ["take_control"] => PlayAction::TakeControlOfTarget,
        ["transform_copy"] => PlayAction::TransformIntoTarget,
        ["damage_target", n] => {
            PlayAction::DamageTarget(parse_positive_u8(segment, "damage amount", n)?)
        }
        ["gain_cc", n] => PlayAction::GainCc(parse_cc_amount(segment, n)?),
        [other, ..] => return Err(invalid(segment, "play action", other)),
        [] => return Err(missing(segment, "play action")),
    };

    let min_targets = parse_target_count(segment, "min targets", arity_params[0])?;
    let max_targets = parse_target_count(segment, "max targets", arity_params[1])?;

    if min_targets > max_targets {
        return Err(invalid(segment, "target range", arity_params[0]));
    }
    let targetless = matches!(action, PlayAction::GainCc(_));
    if targetless && max_targets != 0 {
        return Err(invalid(segment, "max targets", arity_params[1]));
    }
    if !targetless && max_targets == 0 {
        return Err(invalid(segment, "max targets", arity_params[1]));
    }

    Ok(EffectDef::Play(PlayEffect {
        action,
        min_targets,
        max_targets,
    }))
}

fn parse_interrupt(segment: &str, params: &[&str]) -> Result<EffectDef, EffectParseError> {
    match params {
        ["cancel_tussle"] => Ok(EffectDef::Interrupt(InterruptEffect::CancelTussle)),
        [other] => Err(invalid(segment, "interrupt kind", other)),
        _ => Err(wrong_arity(segment, "1", params.len())),
    }
}

// === Shared param parsers ===

fn parse_stat(segment: &str, raw: &str) -> Result<Stat, EffectParseError> {
    match raw {
        "speed" => Ok(Stat::Speed),
        "strength" => Ok(Stat::Strength),
        "stamina" => Ok(Stat::Stamina),
        other => Err(invalid(segment, "stat", other)),
    }
}

fn parse_scope(
    segment: &str,
    raw: &str,
    allow_source_only: bool,
) -> Result<EffectScope, EffectParseError> {
    match raw {
        "self" if allow_source_only => Ok(EffectScope::SourceOnly),
        "team" => Ok(EffectScope::Team),
        "all" => Ok(EffectScope::All),
        other => Err(invalid(segment, "scope", other)),
    }
}

fn parse_stat_delta(segment: &str, raw: &str) -> Result<i32, EffectParseError> {
    raw.parse::<i32>()
        .ok()
        .filter(|&n| n != 0 && n.abs() <= MAX_STAT_DELTA)
        .ok_or_else(|| invalid(segment, "amount", raw))
}

fn parse_cc_amount(segment: &str, raw: &str) -> Result<u8, EffectParseError> {
    raw.parse::<u8>()
        .ok()
        .filter(|&n| (1..=MAX_CC_AMOUNT).contains(&n))
        .ok_or_else(|| invalid(segment, "CC amount", raw))
}

fn parse_positive_u8(
    segment: &str,
    name: &'static str,
    raw: &str,
) -> Result<u8, EffectParseError> {
    raw.parse::<u8>()
        .ok()
        .filter(|&n| (1..=9).contains(&n))
        .ok_or_else(|| invalid(segment, name, raw))
}

fn parse_target_count(
    segment: &str,
    name: &'static str,
    raw: &str,
) -> Result<u8, EffectParseError> {
    raw.parse::<u8>()
        .ok()
        .filter(|&n| n <= 3)
        .ok_or_else(|| invalid(segment, name, raw))
}

fn expect_arity(segment: &str, got: usize, expected: usize) -> Result<(), EffectParseError> {
    if got == expected {
        Ok(())
    } else {
        Err(EffectParseError::WrongArity {
            effect: segment.to_string(),
            expected: "exact",
            got,
        })
    }
}

fn invalid(segment: &str, name: &'static str, value: &str) -> EffectParseError {
    EffectParseError::InvalidParam {
        effect: segment.to_string(),
        name,
        value: value.to_string(),
    }
}

fn missing(segment: &str, name: &'static str) -> EffectParseError {
    EffectParseError::MissingParam {
        effect: segment.to_string(),
        name,
    }
}

fn wrong_arity(segment: &str, expected: &'static str, got: usize) -> EffectParseError {
    EffectParseError::WrongArity {
        effect: segment.to_string(),
        expected,
        got,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_string_is_no_effects() {
        assert_eq!(parse_effects("").unwrap(), vec![]);
        assert_eq!(parse_effects("   ").unwrap(), vec![]);
    }

    #[test]
    fn test_stat_boost_default_scope() {
        let effects = parse_effects("stat_boost:speed:1").unwrap();

        assert_eq!(
            effects,
            vec![EffectDef::Continuous(ContinuousEffect::StatBoost {
                stat: Stat::Speed,
                amount: 1,
                scope: EffectScope::Team,
            })]
        );
    }

    #[test]
    fn test_stat_boost_explicit_scopes() {
        let self_scoped = parse_effects("stat_boost:strength:2:self").unwrap();
        let universal = parse_effects("stat_boost:stamina:-1:all").unwrap();

        assert_eq!(
            self_scoped[0],
            EffectDef::Continuous(ContinuousEffect::StatBoost {
                stat: Stat::Strength,
                amount: 2,
                scope: EffectScope::SourceOnly,
            })
        );
        assert_eq!(
            universal[0],
            EffectDef::Continuous(ContinuousEffect::StatBoost {
                stat: Stat::Stamina,
                amount: -1,
                scope: EffectScope::All,
            })
        );
    }

    #[test]
    fn test_multiple_effects_semicolon_delimited() {
        let effects =
            parse_effects("stat_boost:speed:1;protection:auto_win;triggered:when_sleeped:gain_cc:2")
                .unwrap();
        assert_eq!(effects.len(), 3);
    }

    #[test]
    fn test_trailing_semicolon_tolerated() {
        let effects = parse_effects("auto_win:own_turn;").unwrap();
        assert_eq!(
            effects,
            vec![EffectDef::Continuous(ContinuousEffect::AutoWinOnOwnTurn)]
        );
    }

    #[test]
    fn test_cost_mod() {
        let effects = parse_effects("cost_mod:tussle:-1").unwrap();
        assert_eq!(
            effects[0],
            EffectDef::CostMod(CostModEffect {
                domain: CostDomain::Tussle,
                amount: -1,
                scope: EffectScope::Team,
            })
        );
    }

    #[test]
    fn test_cost_mod_rejects_self_scope() {
        assert!(parse_effects("cost_mod:card:-1:self").is_err());
    }

    #[test]
    fn test_triggered_actions() {
        let gain = parse_effects("triggered:when_sleeped:gain_cc:2").unwrap();
        assert_eq!(
            gain[0],
            EffectDef::Triggered(TriggeredEffect {
                event: TriggerEvent::WhenSleeped,
                action: TriggeredAction::GainCc(2),
                mandatory: true,
            })
        );

        let bounce = parse_effects("triggered:when_sleeped:return_to_hand:optional").unwrap();
        assert_eq!(
            bounce[0],
            EffectDef::Triggered(TriggeredEffect {
                event: TriggerEvent::WhenSleeped,
                action: TriggeredAction::ReturnToHand,
                mandatory: false,
            })
        );

        let boost = parse_effects("triggered:when_played:boost_turn:strength:2").unwrap();
        assert_eq!(
            boost[0],
            EffectDef::Triggered(TriggeredEffect {
                event: TriggerEvent::WhenPlayed,
                action: TriggeredAction::StatBoostThisTurn {
                    stat: Stat::Strength,
                    amount: 2,
                },
                mandatory: true,
            })
        );
    }

    #[test]
    fn test_activated() {
        let effects = parse_effects("activated:2:boost_turn:strength:2").unwrap();
        assert_eq!(
            effects[0],
            EffectDef::Activated(ActivatedEffect {
                cost: 2,
                action: ActivatedAction::StatBoostThisTurn {
                    stat: Stat::Strength,
                    amount: 2,
                },
            })
        );

        let heal = parse_effects("activated:1:restore_stamina:3").unwrap();
        assert_eq!(
            heal[0],
            EffectDef::Activated(ActivatedEffect {
                cost: 1,
                action: ActivatedAction::RestoreStamina(3),
            })
        );
    }

    #[test]
    fn test_play_effects() {
        let sleep = parse_effects("play:sleep_target:1:1").unwrap();
        assert_eq!(
            sleep[0],
            EffectDef::Play(PlayEffect {
                action: PlayAction::SleepTarget,
                min_targets: 1,
                max_targets: 1,
            })
        );

        let damage = parse_effects("play:damage_target:2:1:1").unwrap();
        assert_eq!(
            damage[0],
            EffectDef::Play(PlayEffect {
                action: PlayAction::DamageTarget(2),
                min_targets: 1,
                max_targets: 1,
            })
        );

        let gain = parse_effects("play:gain_cc:2:0:0").unwrap();
        assert_eq!(
            gain[0],
            EffectDef::Play(PlayEffect {
                action: PlayAction::GainCc(2),
                min_targets: 0,
                max_targets: 0,
            })
        );
    }

    #[test]
    fn test_play_target_arity_validation() {
        // min > max
        assert!(parse_effects("play:sleep_target:2:1").is_err());
        // targetless action declaring targets
        assert!(parse_effects("play:gain_cc:2:1:1").is_err());
        // targeted action declaring no targets
        assert!(parse_effects("play:sleep_target:0:0").is_err());
    }

    #[test]
    fn test_interrupt() {
        let effects = parse_effects("interrupt:cancel_tussle").unwrap();
        assert_eq!(
            effects[0],
            EffectDef::Interrupt(InterruptEffect::CancelTussle)
        );
    }

    #[test]
    fn test_malformed_inputs_fail_loudly() {
        assert!(matches!(
            parse_effects("frobnicate:1:2"),
            Err(EffectParseError::UnknownEffectType(_))
        ));
        assert!(parse_effects("stat_boost:speed").is_err()); // missing amount
        assert!(parse_effects("stat_boost:luck:1").is_err()); // unknown stat
        assert!(parse_effects("stat_boost:speed:0").is_err()); // zero delta
        assert!(parse_effects("stat_boost:speed:100").is_err()); // out of range
        assert!(parse_effects("triggered:when_eaten:gain_cc:1").is_err());
        assert!(parse_effects("activated:99:restore_stamina:1").is_err());
        assert!(parse_effects("auto_win:whenever").is_err());
    }

    #[test]
    fn test_parse_error_displays_offending_segment() {
        let err = parse_effects("stat_boost:speed:zebra").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("stat_boost:speed:zebra"));
        assert!(message.contains("zebra"));
    }
}
