pub mod actions;
pub mod currency;
pub mod dice;
pub mod error;
pub mod player;
pub mod rules;
pub mod store;

pub use actions::{ability_check, cast_spell, CheckOutcome, SpellOutcome};
pub use currency::{
    add_funds, convert, exchange_within_wallet, remove_funds, transfer_between_wallets, Coin,
    Conversion, Money, Wallet, WalletKind,
};
pub use dice::{
    parse_dice_notation, AdMode, Dice, DiceNotation, EntropySource, RandomSource, RollResult,
    ScriptedSource, SeededSource,
};
pub use error::RuleError;
pub use player::{default_player_record, Attribute, PlayerRecord, PlayerStats, Pool, Resource};
pub use rules::RulesConfig;
pub use store::Store;
