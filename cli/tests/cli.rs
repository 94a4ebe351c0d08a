use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn gm(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("gm").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .args(["--data", "data.json", "--session", "test"]);
    cmd
}

#[test]
fn seeded_notation_roll_is_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    gm(&dir)
        .args(["--seed", "42", "roll", "2d6"])
        .assert()
        .success()
        .stdout("2d6 → [2, 1] = 3\n");
}

#[test]
fn unknown_roll_expression_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    gm(&dir)
        .args(["roll", "abc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("neither dice notation nor an attribute"));
    gm(&dir)
        .args(["roll", "force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("needs --player"));
}

#[test]
fn oversized_dice_are_refused_before_rolling() {
    let dir = tempfile::tempdir().unwrap();
    gm(&dir)
        .args(["--seed", "1", "roll", "5d2000000000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("at most 100 dice of up to 1000 faces"));
    gm(&dir)
        .args(["--seed", "1", "roll", "101d6"])
        .assert()
        .success()
        .stdout(predicate::str::contains("at most 100 dice"));
    assert!(!dir.path().join("data.json").exists());
}

#[test]
fn showing_an_unknown_player_does_not_create_a_record() {
    let dir = tempfile::tempdir().unwrap();
    gm(&dir)
        .args(["money", "show", "--player", "ghost"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wallet: 0 pp, 0 po, 0 pa, 0 pc"));
    gm(&dir)
        .args(["player", "show", "--player", "ghost"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hp 0/0"));
    assert!(!dir.path().join("data.json").exists());

    gm(&dir)
        .args(["player", "set", "--player", "1", "constitution", "5"])
        .assert()
        .success();
    gm(&dir)
        .args(["player", "show", "--player", "ghost", "--json"])
        .assert()
        .success();
    gm(&dir)
        .args(["player", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ghost").not());
}

#[test]
fn money_round_trip_through_the_store() {
    let dir = tempfile::tempdir().unwrap();
    gm(&dir)
        .args(["money", "add", "--player", "42", "pc", "2500"])
        .assert()
        .success()
        .stdout("wallet: +2500 pc (now 2500 pc)\n");
    gm(&dir)
        .args(["money", "exchange", "--player", "42", "pc", "pp", "2500"])
        .assert()
        .success()
        .stdout("exchanged 2500 pc → 2 pp (500 pc returned)\n");
    gm(&dir)
        .args(["money", "transfer", "--player", "42", "pp", "1"])
        .assert()
        .success()
        .stdout("moved 1 pp from wallet to bank\n");
    gm(&dir)
        .args(["money", "show", "--player", "42"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wallet: 1 pp, 0 po, 0 pa, 500 pc"))
        .stdout(predicate::str::contains("bank:   1 pp, 0 po, 0 pa, 0 pc"))
        .stdout(predicate::str::contains("total:  2500 pc"));
}

#[test]
fn money_rejections_leave_balances_alone() {
    let dir = tempfile::tempdir().unwrap();
    gm(&dir)
        .args(["money", "add", "--player", "7", "pc", "999"])
        .assert()
        .success();
    gm(&dir)
        .args(["money", "exchange", "--player", "7", "pc", "pp", "999"])
        .assert()
        .success()
        .stdout(predicate::str::contains("too small"));
    gm(&dir)
        .args([
            "money", "transfer", "--player", "7", "pc", "5", "--from", "bank", "--to", "bank",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("same"));
    gm(&dir)
        .args(["money", "add", "--player", "7", "gp", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unknown coin 'gp'"));
    gm(&dir)
        .args(["money", "remove", "--player", "7", "pc", "5000"])
        .assert()
        .success()
        .stdout("wallet: −5000 pc (now 0 pc)\n");
}

#[test]
fn zero_amount_is_refused_by_the_parser() {
    let dir = tempfile::tempdir().unwrap();
    gm(&dir)
        .args(["money", "add", "--player", "7", "pc", "0"])
        .assert()
        .failure();
}

#[test]
fn sheet_updates_and_exhaustion() {
    let dir = tempfile::tempdir().unwrap();
    gm(&dir)
        .args(["player", "set", "--player", "1", "constitution", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hp 0/20"));
    gm(&dir)
        .args(["check", "force", "--player", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not enough stamina"));
    gm(&dir)
        .args(["player", "set", "--player", "1", "force", "3"])
        .assert()
        .success();
    gm(&dir)
        .args(["player", "rest", "--player", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stam 30/30"));
    gm(&dir)
        .args(["--seed", "9", "check", "force", "--player", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[CHECK][force]"))
        .stdout(predicate::str::contains("[STAM] −10 (20 / 30)"));
    gm(&dir)
        .args(["player", "adjust", "--player", "1", "hp", "-7"])
        .assert()
        .success()
        .stdout("hp 13/20\n");
    gm(&dir)
        .args(["player", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1: hp 13/20"));
}

#[test]
fn spell_needs_enough_intelligence() {
    let dir = tempfile::tempdir().unwrap();
    gm(&dir)
        .args(["cast", "--player", "5", "1d6"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not enough intelligence"));
    gm(&dir)
        .args(["cast", "--player", "5", "fireball"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not dice notation"));
}

#[test]
fn config_file_sets_session_and_rules() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("gm.yaml"),
        "data_path: table.json\nsession: tavern\nrules:\n  stamina_cost: 0\n",
    )
    .unwrap();
    let mut cmd = Command::cargo_bin("gm").unwrap();
    cmd.current_dir(dir.path())
        .args(["check", "agilite", "--player", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[CHECK][agilite]"));
    let stored = std::fs::read_to_string(dir.path().join("table.json")).unwrap();
    assert!(stored.contains("\"tavern\""));
}
