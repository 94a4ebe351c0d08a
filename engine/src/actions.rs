//! Table actions built from the dice primitives: roll-under ability checks
//! that spend stamina, and multi-effect spells that spend mana.

use serde::Serialize;
use tracing::warn;

use crate::dice::{AdMode, Dice, DiceNotation, RandomSource, RollResult};
use crate::error::RuleError;
use crate::player::{Attribute, PlayerStats, Pool};
use crate::rules::RulesConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub attribute: Attribute,
    pub score: i32,
    pub mode: AdMode,
    pub roll: RollResult,
    pub passed: bool,
    pub stamina_spent: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectRoll {
    pub dice: DiceNotation,
    pub roll: RollResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpellOutcome {
    pub effects: Vec<EffectRoll>,
    pub effect_total: i64,
    /// Intelligence left after the effect rolls; the check must roll at or under it.
    pub threshold: i64,
    pub mode: AdMode,
    pub roll: RollResult,
    pub passed: bool,
    pub mana_spent: i32,
}

/// Roll under an attribute. Strength and agility checks cost stamina and are
/// refused before rolling when the player cannot pay.
pub fn ability_check<S: RandomSource>(
    dice: &mut Dice<S>,
    stats: &mut PlayerStats,
    attribute: Attribute,
    mode: AdMode,
    rules: &RulesConfig,
    mut log: impl FnMut(String),
) -> Result<CheckOutcome, RuleError> {
    let cost = if attribute.is_physical() {
        rules.stamina_cost.max(0)
    } else {
        0
    };
    if stats.stam < cost {
        warn!(%attribute, cost, stam = stats.stam, "check rejected: not enough stamina");
        return Err(RuleError::InsufficientPool {
            pool: Pool::Stamina,
            needed: i64::from(cost),
            available: i64::from(stats.stam),
        });
    }

    let score = stats.score(attribute);
    let roll = dice.resolve_check(rules.check_die, mode);
    let passed = roll.total <= i64::from(score);
    stats.stam -= cost;

    log(format!(
        "[CHECK][{}] {} vs {} → {}",
        attribute,
        format_rolls(&roll.rolls, roll.total),
        score,
        if passed { "SUCCESS" } else { "FAIL" }
    ));
    if cost > 0 {
        log(format!(
            "[STAM] −{} ({} / {})",
            cost, stats.stam, stats.stam_max
        ));
    }

    Ok(CheckOutcome {
        attribute,
        score,
        mode,
        roll,
        passed,
        stamina_spent: cost,
    })
}

/// Cast a spell made of one or more effect dice.
///
/// The combined maximum of the effects must fit in both intelligence and
/// current mana, otherwise nothing is rolled. Each effect is then rolled, the
/// effect total is taken off intelligence to give the check threshold, and
/// the same total is paid in mana whether or not the check succeeds.
pub fn cast_spell<S: RandomSource>(
    dice: &mut Dice<S>,
    stats: &mut PlayerStats,
    effects: &[DiceNotation],
    mode: AdMode,
    rules: &RulesConfig,
    mut log: impl FnMut(String),
) -> Result<SpellOutcome, RuleError> {
    if effects.is_empty() {
        return Err(RuleError::NoEffects);
    }

    let budget = effects
        .iter()
        .map(DiceNotation::max_total)
        .fold(0u64, u64::saturating_add);
    let budget = i64::try_from(budget).unwrap_or(i64::MAX);
    if budget > i64::from(stats.intelligence) {
        warn!(budget, intelligence = stats.intelligence, "spell rejected");
        return Err(RuleError::InsufficientPool {
            pool: Pool::Intelligence,
            needed: budget,
            available: i64::from(stats.intelligence),
        });
    }
    if budget > i64::from(stats.mana) {
        warn!(budget, mana = stats.mana, "spell rejected");
        return Err(RuleError::InsufficientPool {
            pool: Pool::Mana,
            needed: budget,
            available: i64::from(stats.mana),
        });
    }

    let mut rolled = Vec::with_capacity(effects.len());
    let mut effect_total = 0i64;
    for (idx, notation) in effects.iter().enumerate() {
        let roll = dice.roll_notation(*notation);
        effect_total += roll.total;
        log(format!(
            "[EFFECT {}] {} → {:?} = {}",
            idx + 1,
            notation,
            roll.rolls,
            roll.total
        ));
        rolled.push(EffectRoll {
            dice: *notation,
            roll,
        });
    }

    let threshold = i64::from(stats.intelligence) - effect_total;
    let roll = dice.resolve_check(rules.check_die, mode);
    let passed = roll.total <= threshold;
    // Bounded by the budget, which already fit in current mana.
    let mana_spent = i32::try_from(effect_total).unwrap_or(stats.mana);
    stats.mana -= mana_spent;

    log(format!(
        "[CAST] {} vs {} (intelligence {} − effects {}) → {}",
        format_rolls(&roll.rolls, roll.total),
        threshold,
        stats.intelligence,
        effect_total,
        if passed { "SUCCESS" } else { "FAIL" }
    ));
    log(format!(
        "[MANA] −{} ({} / {})",
        mana_spent, stats.mana, stats.mana_max
    ));

    Ok(SpellOutcome {
        effects: rolled,
        effect_total,
        threshold,
        mode,
        roll,
        passed,
        mana_spent,
    })
}

/// Render check rolls, e.g. `d=7 vs d=15 (keep=15)`.
pub fn format_rolls(rolls: &[i32], kept: i64) -> String {
    match rolls {
        [] => format!("d=? (keep={})", kept),
        [only] => format!("d={} (keep={})", only, kept),
        [first, second] => format!("d={} vs d={} (keep={})", first, second, kept),
        _ => {
            let joined = rolls
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            format!("ds=[{}] (keep={})", joined, kept)
        }
    }
}
