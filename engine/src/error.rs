use thiserror::Error;

use crate::currency::Coin;
use crate::player::Pool;

/// A rejected game operation. Nothing is mutated when one of these is returned;
/// the caller turns it into a message for the player.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("unknown coin '{0}' (expected pc, pa, po or pp)")]
    InvalidCoin(String),
    #[error("unknown wallet '{0}' (expected wallet or bank)")]
    InvalidTarget(String),
    #[error("unknown attribute '{0}'")]
    InvalidAttribute(String),
    #[error("'{0}' is not dice notation (expected XdY)")]
    InvalidNotation(String),
    #[error("source and destination wallets are the same")]
    SameTarget,
    #[error("cannot exchange a coin for itself")]
    SamePiece,
    #[error("insufficient funds: {requested} {coin} requested, {available} available")]
    InsufficientFunds {
        coin: Coin,
        requested: u64,
        available: u64,
    },
    #[error("the {coin} balance cannot hold that many coins")]
    BalanceOverflow { coin: Coin },
    #[error("{quantity} {from} is too small to make a single {to}")]
    TooSmall { from: Coin, to: Coin, quantity: u64 },
    #[error("not enough {pool}: {needed} needed, {available} available")]
    InsufficientPool {
        pool: Pool,
        needed: i64,
        available: i64,
    },
    #[error("a spell needs at least one effect")]
    NoEffects,
}
