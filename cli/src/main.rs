use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use gm_engine::{
    ability_check, add_funds, cast_spell, default_player_record, exchange_within_wallet,
    parse_dice_notation, remove_funds, AdMode, Attribute, Coin, Dice, DiceNotation,
    EntropySource, PlayerRecord, RandomSource, Resource, RuleError, RulesConfig, SeededSource,
    Store, WalletKind,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::CliConfig;

#[derive(Copy, Clone, ValueEnum)]
enum Adv {
    Normal,
    Advantage,
    Disadvantage,
}

#[derive(Subcommand)]
enum Cmd {
    /// Roll dice (XdY) or, given an attribute name, make an ability check
    Roll {
        /// Dice notation such as 2d20, or an attribute such as force
        expr: String,
        /// Player id (required for attribute rolls)
        #[arg(long)]
        player: Option<String>,
        /// Advantage mode for attribute rolls
        #[arg(long, value_enum, default_value_t = Adv::Normal)]
        adv: Adv,
    },
    /// Roll under an attribute; strength and agility cost stamina
    Check {
        /// force, constitution, agilite, intelligence or perception
        attribute: String,
        #[arg(long)]
        player: String,
        #[arg(long, value_enum, default_value_t = Adv::Normal)]
        adv: Adv,
    },
    /// Cast a spell made of one or more effect dice (XdY), paid in mana
    Cast {
        #[arg(long)]
        player: String,
        #[arg(required = true)]
        effects: Vec<String>,
        #[arg(long, value_enum, default_value_t = Adv::Normal)]
        adv: Adv,
    },
    /// Coin purse and bank
    Money {
        #[command(subcommand)]
        action: MoneyCmd,
    },
    /// Character sheet
    Player {
        #[command(subcommand)]
        action: PlayerCmd,
    },
}

#[derive(Subcommand)]
enum MoneyCmd {
    /// Show wallet and bank balances
    Show {
        #[arg(long)]
        player: String,
    },
    /// Credit coins
    Add {
        #[arg(long)]
        player: String,
        /// pc, pa, po or pp
        coin: String,
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        amount: u64,
        /// wallet or bank
        #[arg(long, default_value = "wallet")]
        target: String,
    },
    /// Debit coins (never below zero)
    Remove {
        #[arg(long)]
        player: String,
        coin: String,
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        amount: u64,
        #[arg(long, default_value = "wallet")]
        target: String,
    },
    /// Move coins between wallet and bank
    Transfer {
        #[arg(long)]
        player: String,
        coin: String,
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        quantity: u64,
        #[arg(long, default_value = "wallet")]
        from: String,
        #[arg(long, default_value = "bank")]
        to: String,
    },
    /// Change one denomination into another at fixed rates
    Exchange {
        #[arg(long)]
        player: String,
        from: String,
        to: String,
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        quantity: u64,
        #[arg(long, default_value = "wallet")]
        target: String,
    },
}

#[derive(Subcommand)]
enum PlayerCmd {
    /// Print the character sheet
    Show {
        #[arg(long)]
        player: String,
        /// Dump the stored record as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Set a base attribute; maxima are recomputed
    Set {
        #[arg(long)]
        player: String,
        attribute: String,
        #[arg(allow_hyphen_values = true)]
        value: i32,
    },
    /// Damage or restore hp, mana or stam by a signed amount
    Adjust {
        #[arg(long)]
        player: String,
        resource: String,
        #[arg(allow_hyphen_values = true)]
        delta: i32,
    },
    /// Refill hp, mana and stamina
    Rest {
        #[arg(long)]
        player: String,
    },
    /// List players in the session
    List,
}

#[derive(Parser)]
#[command(name = "gm")]
#[command(about = "Game master assistant: dice, character sheets and coin purses")]
struct Cli {
    /// YAML config file (defaults to ./gm.yaml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// JSON datastore path
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    /// Campaign session key
    #[arg(long, global = true)]
    session: Option<String>,
    /// Seed for reproducible dice; omit for live randomness
    #[arg(long, global = true)]
    seed: Option<u32>,
    #[command(subcommand)]
    cmd: Cmd,
}

struct Table {
    cfg: CliConfig,
    store: Store,
    dice: Dice<Box<dyn RandomSource>>,
}

impl Table {
    fn record(&mut self, player: &str) -> &mut PlayerRecord {
        self.store.player_mut(&self.cfg.session, player)
    }

    /// Read-only view; an unknown player shows the fresh record without storing it.
    fn peek(&self, player: &str) -> PlayerRecord {
        self.store
            .player(&self.cfg.session, player)
            .copied()
            .unwrap_or_else(default_player_record)
    }
}

fn to_mode(a: Adv) -> AdMode {
    match a {
        Adv::Normal => AdMode::Normal,
        Adv::Advantage => AdMode::Advantage,
        Adv::Disadvantage => AdMode::Disadvantage,
    }
}

fn make_dice(seed: Option<u32>) -> Dice<Box<dyn RandomSource>> {
    let source: Box<dyn RandomSource> = match seed {
        Some(seed) => Box::new(SeededSource::new(seed)),
        None => Box::new(EntropySource::new()),
    };
    Dice::new(source)
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "gm_engine=warn,gm=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let cfg = CliConfig::load(cli.config.as_deref())?.with_overrides(cli.data, cli.session);
    let store = Store::open(&cfg.data_path)?;
    info!(data = %cfg.data_path.display(), session = %cfg.session, "table opened");
    let mut table = Table {
        cfg,
        store,
        dice: make_dice(cli.seed),
    };

    let dirty = match cli.cmd {
        Cmd::Roll { expr, player, adv } => roll(&mut table, &expr, player.as_deref(), to_mode(adv)),
        Cmd::Check {
            attribute,
            player,
            adv,
        } => {
            match attribute.parse::<Attribute>() {
                Ok(attr) => check(&mut table, &player, attr, to_mode(adv)),
                Err(e) => reject(e),
            }
            true
        }
        Cmd::Cast {
            player,
            effects,
            adv,
        } => {
            cast(&mut table, &player, &effects, to_mode(adv));
            true
        }
        Cmd::Money { action } => money(&mut table, action),
        Cmd::Player { action } => player_cmd(&mut table, action)?,
    };

    if dirty {
        table.store.save()?;
    }
    Ok(())
}

fn reject(err: RuleError) {
    println!("✖ {}", err);
}

fn reject_limits(rules: &RulesConfig) {
    println!(
        "✖ at most {} dice of up to {} faces per expression",
        rules.max_dice, rules.max_faces
    );
}

/// Returns whether the store was touched.
fn roll(table: &mut Table, expr: &str, player: Option<&str>, mode: AdMode) -> bool {
    if let Some(notation) = parse_dice_notation(expr.trim()) {
        if !table.cfg.rules.allows(notation) {
            reject_limits(&table.cfg.rules);
            return false;
        }
        let res = table.dice.roll_notation(notation);
        println!("{} → {:?} = {}", notation, res.rolls, res.total);
        return false;
    }

    match (expr.parse::<Attribute>(), player) {
        (Ok(attr), Some(player)) => {
            check(table, player, attr, mode);
            true
        }
        (Ok(attr), None) => {
            println!("✖ rolling {} needs --player", attr);
            false
        }
        (Err(_), _) => {
            println!("✖ '{}' is neither dice notation nor an attribute", expr);
            false
        }
    }
}

fn check(table: &mut Table, player: &str, attr: Attribute, mode: AdMode) {
    let rec = table.store.player_mut(&table.cfg.session, player);
    let res = ability_check(
        &mut table.dice,
        &mut rec.joueur,
        attr,
        mode,
        &table.cfg.rules,
        |line| println!("{}", line),
    );
    if let Err(e) = res {
        reject(e);
    }
}

fn cast(table: &mut Table, player: &str, effects: &[String], mode: AdMode) {
    let parsed: Result<Vec<DiceNotation>, RuleError> =
        effects.iter().map(|e| e.trim().parse()).collect();
    let parsed = match parsed {
        Ok(p) => p,
        Err(e) => return reject(e),
    };
    if !parsed.iter().all(|n| table.cfg.rules.allows(*n)) {
        return reject_limits(&table.cfg.rules);
    }

    let rec = table.store.player_mut(&table.cfg.session, player);
    let res = cast_spell(
        &mut table.dice,
        &mut rec.joueur,
        &parsed,
        mode,
        &table.cfg.rules,
        |line| println!("{}", line),
    );
    if let Err(e) = res {
        reject(e);
    }
}

/// Returns whether the store was touched.
fn money(table: &mut Table, action: MoneyCmd) -> bool {
    let res = match action {
        MoneyCmd::Show { player } => {
            let money = table.peek(&player).money;
            println!("wallet: {}", money.wallet);
            println!("bank:   {}", money.bank);
            println!(
                "total:  {} pc",
                money
                    .wallet
                    .total_base_units()
                    .saturating_add(money.bank.total_base_units())
            );
            return false;
        }
        MoneyCmd::Add {
            player,
            coin,
            amount,
            target,
        } => parse_coin_target(&coin, &target).map(|(coin, kind)| {
            let wallet = table.record(&player).money.get_mut(kind);
            let now = add_funds(wallet, coin, amount);
            println!("{}: +{} {} (now {} {})", kind, amount, coin, now, coin);
        }),
        MoneyCmd::Remove {
            player,
            coin,
            amount,
            target,
        } => parse_coin_target(&coin, &target).map(|(coin, kind)| {
            let wallet = table.record(&player).money.get_mut(kind);
            let now = remove_funds(wallet, coin, amount);
            println!("{}: −{} {} (now {} {})", kind, amount, coin, now, coin);
        }),
        MoneyCmd::Transfer {
            player,
            coin,
            quantity,
            from,
            to,
        } => transfer(table, &player, &coin, quantity, &from, &to),
        MoneyCmd::Exchange {
            player,
            from,
            to,
            quantity,
            target,
        } => exchange(table, &player, &from, &to, quantity, &target),
    };
    if let Err(e) = res {
        reject(e);
    }
    true
}

fn parse_coin_target(coin: &str, target: &str) -> Result<(Coin, WalletKind), RuleError> {
    Ok((coin.parse()?, target.parse()?))
}

fn transfer(
    table: &mut Table,
    player: &str,
    coin: &str,
    quantity: u64,
    from: &str,
    to: &str,
) -> Result<(), RuleError> {
    let coin: Coin = coin.parse()?;
    let from: WalletKind = from.parse()?;
    let to: WalletKind = to.parse()?;
    table.record(player).money.transfer(from, to, coin, quantity)?;
    println!("moved {} {} from {} to {}", quantity, coin, from, to);
    Ok(())
}

fn exchange(
    table: &mut Table,
    player: &str,
    from: &str,
    to: &str,
    quantity: u64,
    target: &str,
) -> Result<(), RuleError> {
    let from: Coin = from.parse()?;
    let to: Coin = to.parse()?;
    let kind: WalletKind = target.parse()?;
    let wallet = table.record(player).money.get_mut(kind);
    let conv = exchange_within_wallet(wallet, from, to, quantity)?;
    let mut line = format!("exchanged {} {} → {} {}", quantity, from, conv.converted, to);
    if conv.remainder > 0 {
        line.push_str(&format!(" ({} {} returned)", conv.remainder, from));
    }
    if conv.loss > 0 {
        line.push_str(&format!(" ({} pc lost)", conv.loss));
    }
    println!("{}", line);
    Ok(())
}

/// Returns whether the store needs saving.
fn player_cmd(table: &mut Table, action: PlayerCmd) -> Result<bool> {
    match action {
        PlayerCmd::Show { player, json } => {
            let rec = table.peek(&player);
            if json {
                println!("{}", serde_json::to_string_pretty(&rec)?);
            } else {
                print_sheet(&rec);
            }
            return Ok(false);
        }
        PlayerCmd::Set {
            player,
            attribute,
            value,
        } => match attribute.parse::<Attribute>() {
            Ok(attr) => {
                let rec = table.record(&player);
                rec.joueur.set_attribute(attr, value);
                println!("{} set to {}", attr, value);
                print_sheet(rec);
            }
            Err(e) => reject(e),
        },
        PlayerCmd::Adjust {
            player,
            resource,
            delta,
        } => match resource.parse::<Resource>() {
            Ok(resource) => {
                let stats = &mut table.record(&player).joueur;
                let now = stats.adjust(resource, delta);
                println!("{} {}/{}", resource, now, stats.max(resource));
            }
            Err(e) => reject(e),
        },
        PlayerCmd::Rest { player } => {
            let rec = table.record(&player);
            rec.joueur.restore_all();
            println!("rested");
            print_sheet(rec);
        }
        PlayerCmd::List => {
            let mut any = false;
            for (id, rec) in table.store.players(&table.cfg.session) {
                any = true;
                println!(
                    "{}: hp {}/{}, wallet {}",
                    id, rec.joueur.hp, rec.joueur.hp_max, rec.money.wallet
                );
            }
            if !any {
                println!("no players in session '{}'", table.cfg.session);
            }
            return Ok(false);
        }
    }
    Ok(true)
}

fn print_sheet(rec: &PlayerRecord) {
    let j = &rec.joueur;
    let attrs = Attribute::ALL
        .iter()
        .map(|a| format!("{} {}", a, j.score(*a)))
        .collect::<Vec<_>>()
        .join(" | ");
    println!("{}", attrs);
    println!(
        "hp {}/{} | mana {}/{} | stam {}/{}",
        j.hp, j.hp_max, j.mana, j.mana_max, j.stam, j.stam_max
    );
}
