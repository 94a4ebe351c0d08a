use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::RuleError;

/// The four denominations, valued in copper ("base units").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Coin {
    #[serde(rename = "pc")]
    Copper,
    #[serde(rename = "pa")]
    Silver,
    #[serde(rename = "po")]
    Gold,
    #[serde(rename = "pp")]
    Platinum,
}

impl Coin {
    pub const ALL: [Coin; 4] = [Coin::Copper, Coin::Silver, Coin::Gold, Coin::Platinum];

    pub const fn value(self) -> u64 {
        match self {
            Coin::Copper => 1,
            Coin::Silver => 10,
            Coin::Gold => 100,
            Coin::Platinum => 1000,
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            Coin::Copper => "pc",
            Coin::Silver => "pa",
            Coin::Gold => "po",
            Coin::Platinum => "pp",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Coin::Copper => "copper",
            Coin::Silver => "silver",
            Coin::Gold => "gold",
            Coin::Platinum => "platinum",
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Coin {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pc" => Ok(Coin::Copper),
            "pa" => Ok(Coin::Silver),
            "po" => Ok(Coin::Gold),
            "pp" => Ok(Coin::Platinum),
            _ => Err(RuleError::InvalidCoin(s.to_string())),
        }
    }
}

/// Coin counts for one purse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    #[serde(default)]
    pub pc: u64,
    #[serde(default)]
    pub pa: u64,
    #[serde(default)]
    pub po: u64,
    #[serde(default)]
    pub pp: u64,
}

impl Wallet {
    pub fn get(&self, coin: Coin) -> u64 {
        match coin {
            Coin::Copper => self.pc,
            Coin::Silver => self.pa,
            Coin::Gold => self.po,
            Coin::Platinum => self.pp,
        }
    }

    fn slot(&mut self, coin: Coin) -> &mut u64 {
        match coin {
            Coin::Copper => &mut self.pc,
            Coin::Silver => &mut self.pa,
            Coin::Gold => &mut self.po,
            Coin::Platinum => &mut self.pp,
        }
    }

    pub fn total_base_units(&self) -> u64 {
        Coin::ALL
            .iter()
            .map(|c| self.get(*c).saturating_mul(c.value()))
            .fold(0u64, u64::saturating_add)
    }
}

impl fmt::Display for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pp, {} po, {} pa, {} pc",
            self.pp, self.po, self.pa, self.pc
        )
    }
}

/// Which of a player's two purses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletKind {
    Wallet,
    Bank,
}

impl fmt::Display for WalletKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletKind::Wallet => f.write_str("wallet"),
            WalletKind::Bank => f.write_str("bank"),
        }
    }
}

impl FromStr for WalletKind {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wallet" => Ok(WalletKind::Wallet),
            "bank" => Ok(WalletKind::Bank),
            _ => Err(RuleError::InvalidTarget(s.to_string())),
        }
    }
}

/// On-hand purse plus bank account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    #[serde(default)]
    pub wallet: Wallet,
    #[serde(default)]
    pub bank: Wallet,
}

impl Money {
    pub fn get(&self, kind: WalletKind) -> &Wallet {
        match kind {
            WalletKind::Wallet => &self.wallet,
            WalletKind::Bank => &self.bank,
        }
    }

    pub fn get_mut(&mut self, kind: WalletKind) -> &mut Wallet {
        match kind {
            WalletKind::Wallet => &mut self.wallet,
            WalletKind::Bank => &mut self.bank,
        }
    }

    /// Move coins between the purse and the bank.
    pub fn transfer(
        &mut self,
        from: WalletKind,
        to: WalletKind,
        coin: Coin,
        quantity: u64,
    ) -> Result<(), RuleError> {
        let (source, dest) = match (from, to) {
            (WalletKind::Wallet, WalletKind::Bank) => (&mut self.wallet, &mut self.bank),
            (WalletKind::Bank, WalletKind::Wallet) => (&mut self.bank, &mut self.wallet),
            _ => {
                warn!(%from, %to, "transfer rejected: same target");
                return Err(RuleError::SameTarget);
            }
        };
        transfer_between_wallets(source, dest, coin, quantity)
    }
}

/// Outcome of converting a quantity of one coin into another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Conversion {
    pub from: Coin,
    pub to: Coin,
    pub quantity: u64,
    /// Whole units of the target coin.
    pub converted: u128,
    /// Leftover expressed in whole units of the source coin.
    pub remainder: u64,
    /// Base units too small to be a whole source coin; destroyed.
    pub loss: u64,
    /// Exact for every `u64` quantity.
    pub total_base: u128,
}

/// Convert at the fixed table rates.
///
/// `converted * v(to) + remainder * v(from) + loss == total_base` always
/// holds. A zero `converted` is returned as-is; rejecting it is up to the caller.
pub fn convert(from: Coin, to: Coin, quantity: u64) -> Conversion {
    let (from_value, to_value) = (u128::from(from.value()), u128::from(to.value()));
    let total_base = u128::from(quantity) * from_value;
    let converted = total_base / to_value;
    // Below one target coin, so it fits in u64.
    let remainder_base = (total_base % to_value) as u64;
    let remainder = remainder_base / from.value();
    let loss = remainder_base % from.value();
    debug!(%from, %to, quantity, converted, remainder, loss, "converted coins");
    Conversion {
        from,
        to,
        quantity,
        converted,
        remainder,
        loss,
        total_base,
    }
}

/// Move `quantity` of `coin` from `source` to `dest`; both are left
/// untouched when the source cannot cover it.
pub fn transfer_between_wallets(
    source: &mut Wallet,
    dest: &mut Wallet,
    coin: Coin,
    quantity: u64,
) -> Result<(), RuleError> {
    let available = source.get(coin);
    if available < quantity {
        warn!(%coin, quantity, available, "transfer rejected: insufficient funds");
        return Err(RuleError::InsufficientFunds {
            coin,
            requested: quantity,
            available,
        });
    }
    let Some(credited) = dest.get(coin).checked_add(quantity) else {
        warn!(%coin, quantity, "transfer rejected: destination balance overflow");
        return Err(RuleError::BalanceOverflow { coin });
    };
    *source.slot(coin) -= quantity;
    *dest.slot(coin) = credited;
    info!(%coin, quantity, "transferred coins");
    Ok(())
}

/// Exchange coins inside one purse. Only the exactly-converted portion leaves
/// the source denomination; the remainder is credited back and the loss vanishes.
pub fn exchange_within_wallet(
    wallet: &mut Wallet,
    from: Coin,
    to: Coin,
    quantity: u64,
) -> Result<Conversion, RuleError> {
    if from == to {
        return Err(RuleError::SamePiece);
    }
    let available = wallet.get(from);
    if available < quantity {
        warn!(%from, quantity, available, "exchange rejected: insufficient funds");
        return Err(RuleError::InsufficientFunds {
            coin: from,
            requested: quantity,
            available,
        });
    }
    let conversion = convert(from, to, quantity);
    if conversion.converted == 0 {
        warn!(%from, %to, quantity, "exchange rejected: too small");
        return Err(RuleError::TooSmall { from, to, quantity });
    }
    let credited = u64::try_from(conversion.converted)
        .ok()
        .and_then(|converted| wallet.get(to).checked_add(converted));
    let Some(credited) = credited else {
        warn!(%from, %to, quantity, "exchange rejected: destination balance overflow");
        return Err(RuleError::BalanceOverflow { coin: to });
    };
    // remainder <= quantity, so the source slot cannot overflow.
    *wallet.slot(from) = available - quantity + conversion.remainder;
    *wallet.slot(to) = credited;
    info!(
        %from,
        %to,
        quantity,
        converted = conversion.converted,
        loss = conversion.loss,
        "exchanged coins"
    );
    Ok(conversion)
}

/// Unconditional credit. Non-positive amounts are rejected by the caller.
pub fn add_funds(wallet: &mut Wallet, coin: Coin, amount: u64) -> u64 {
    let slot = wallet.slot(coin);
    *slot = slot.saturating_add(amount);
    info!(%coin, amount, balance = *slot, "added funds");
    *slot
}

/// Debit clamped at zero.
pub fn remove_funds(wallet: &mut Wallet, coin: Coin, amount: u64) -> u64 {
    let slot = wallet.slot(coin);
    *slot = slot.saturating_sub(amount);
    info!(%coin, amount, balance = *slot, "removed funds");
    *slot
}
