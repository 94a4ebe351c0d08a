use gm_engine::actions::format_rolls;
use gm_engine::{
    ability_check, cast_spell, AdMode, Attribute, Dice, DiceNotation, PlayerStats, Pool,
    RuleError, RulesConfig,
};

fn caster() -> PlayerStats {
    let mut stats = PlayerStats {
        strength: 12,
        constitution: 10,
        agility: 6,
        intelligence: 10,
        perception: 9,
        ..PlayerStats::default()
    };
    stats.refresh_derived();
    stats.restore_all();
    stats
}

fn noop_log(_: String) {}

#[test]
fn strength_check_rolls_under_and_spends_stamina() {
    let mut stats = caster();
    let mut dice = Dice::from_scripted(vec![7]);
    let mut logs = vec![];
    let out = ability_check(
        &mut dice,
        &mut stats,
        Attribute::Strength,
        AdMode::Normal,
        &RulesConfig::default(),
        |s| logs.push(s),
    )
    .unwrap();
    assert!(out.passed);
    assert_eq!(out.score, 12);
    assert_eq!(out.roll.total, 7);
    assert_eq!(out.stamina_spent, 10);
    assert_eq!(stats.stam, 170);
    assert_eq!(logs[0], "[CHECK][force] d=7 (keep=7) vs 12 → SUCCESS");
}

#[test]
fn failed_physical_check_still_costs_stamina() {
    let mut stats = caster();
    let mut dice = Dice::from_scripted(vec![18, 15]);
    let out = ability_check(
        &mut dice,
        &mut stats,
        Attribute::Agility,
        AdMode::Disadvantage,
        &RulesConfig::default(),
        noop_log,
    )
    .unwrap();
    assert!(!out.passed);
    assert_eq!(out.roll.rolls, vec![18, 15]);
    assert_eq!(out.roll.total, 15);
    assert_eq!(stats.stam, 170);
}

#[test]
fn mental_check_is_free() {
    let mut stats = caster();
    let mut dice = Dice::from_scripted(vec![9]);
    let out = ability_check(
        &mut dice,
        &mut stats,
        Attribute::Perception,
        AdMode::Normal,
        &RulesConfig::default(),
        noop_log,
    )
    .unwrap();
    assert!(out.passed);
    assert_eq!(out.stamina_spent, 0);
    assert_eq!(stats.stam, stats.stam_max);
}

#[test]
fn exhausted_player_cannot_attempt_physical_check() {
    let mut stats = caster();
    stats.stam = 4;
    let mut dice = Dice::from_scripted(vec![3, 11]);
    let err = ability_check(
        &mut dice,
        &mut stats,
        Attribute::Strength,
        AdMode::Normal,
        &RulesConfig::default(),
        noop_log,
    )
    .unwrap_err();
    assert_eq!(
        err,
        RuleError::InsufficientPool {
            pool: Pool::Stamina,
            needed: 10,
            available: 4
        }
    );
    assert_eq!(stats.stam, 4);
    // Nothing was rolled: the script still starts at its first value.
    assert_eq!(dice.roll_die(20), 3);
}

#[test]
fn spell_effects_lower_the_threshold_and_cost_mana() {
    let mut stats = caster();
    let mut dice = Dice::from_scripted(vec![3, 2, 5]);
    let effects = [DiceNotation::new(1, 4), DiceNotation::new(1, 6)];
    let mut logs = vec![];
    let out = cast_spell(
        &mut dice,
        &mut stats,
        &effects,
        AdMode::Normal,
        &RulesConfig::default(),
        |s| logs.push(s),
    )
    .unwrap();
    assert_eq!(out.effect_total, 5);
    assert_eq!(out.threshold, 5);
    assert_eq!(out.roll.total, 5);
    assert!(out.passed);
    assert_eq!(out.mana_spent, 5);
    assert_eq!(stats.mana, 195);
    assert_eq!(stats.intelligence, 10);
    assert_eq!(logs.len(), 4);
}

#[test]
fn failed_spell_still_costs_mana() {
    let mut stats = caster();
    let mut dice = Dice::from_scripted(vec![4, 9]);
    let out = cast_spell(
        &mut dice,
        &mut stats,
        &[DiceNotation::new(1, 4)],
        AdMode::Normal,
        &RulesConfig::default(),
        noop_log,
    )
    .unwrap();
    assert_eq!(out.threshold, 6);
    assert!(!out.passed);
    assert_eq!(stats.mana, 196);
}

#[test]
fn spell_beyond_intelligence_is_rejected_before_rolling() {
    let mut stats = caster();
    let mut dice = Dice::from_scripted(vec![1]);
    let err = cast_spell(
        &mut dice,
        &mut stats,
        &[DiceNotation::new(2, 6)],
        AdMode::Normal,
        &RulesConfig::default(),
        noop_log,
    )
    .unwrap_err();
    assert_eq!(
        err,
        RuleError::InsufficientPool {
            pool: Pool::Intelligence,
            needed: 12,
            available: 10
        }
    );
    assert_eq!(stats.mana, 200);
}

#[test]
fn spell_beyond_mana_is_rejected() {
    let mut stats = caster();
    stats.mana = 3;
    let mut dice = Dice::from_scripted(vec![1]);
    let err = cast_spell(
        &mut dice,
        &mut stats,
        &[DiceNotation::new(1, 6)],
        AdMode::Normal,
        &RulesConfig::default(),
        noop_log,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        RuleError::InsufficientPool {
            pool: Pool::Mana,
            ..
        }
    ));
    assert_eq!(stats.mana, 3);
}

#[test]
fn spell_without_effects_is_rejected() {
    let mut stats = caster();
    let mut dice = Dice::seeded(1);
    let err = cast_spell(
        &mut dice,
        &mut stats,
        &[],
        AdMode::Normal,
        &RulesConfig::default(),
        noop_log,
    )
    .unwrap_err();
    assert_eq!(err, RuleError::NoEffects);
}

#[test]
fn rolls_render_for_each_mode() {
    assert_eq!(format_rolls(&[12], 12), "d=12 (keep=12)");
    assert_eq!(format_rolls(&[3, 17], 17), "d=3 vs d=17 (keep=17)");
    assert_eq!(format_rolls(&[], 0), "d=? (keep=0)");
}
