//! Pure vault accounting.
//!
//! Nothing in here touches accounts directly. Handlers hand in implementations
//! of the traits below, so the same code runs on-chain and in host tests.

pub mod conversion;
pub mod ledger;
pub mod surface;

pub use conversion::*;
pub use ledger::*;
pub use surface::*;

use anchor_lang::prelude::*;

/// Read side of the lending position backing a vault. Every call observes the
/// balance as it stands now; nothing is cached between calls.
pub trait PositionOracle {
    /// Value the position would pay out if fully withdrawn.
    fn live_balance(&self) -> Result<u64>;

    /// Remaining supply the lending market accepts.
    fn max_supply(&self) -> Result<u64>;

    /// Liquidity the lending market can pay out right now.
    fn available_liquidity(&self) -> Result<u64>;
}

/// Value movement between the operation's counterparty and the position.
pub trait PositionCustody: PositionOracle {
    /// Pulls `amount` from the counterparty and supplies it to the position.
    fn supply(&mut self, amount: u64) -> Result<()>;

    /// Pulls `amount` out of the position and delivers it to the counterparty.
    fn withdraw(&mut self, amount: u64) -> Result<u64>;
}

/// Share supply plus the share balance of the account an operation acts on.
pub trait ShareRegistry {
    fn total_shares(&self) -> Result<u64>;

    fn balance(&self) -> Result<u64>;

    fn mint(&mut self, shares: u64) -> Result<()>;

    fn burn(&mut self, shares: u64) -> Result<()>;
}

pub trait AccessControl {
    fn is_authorized_depositor(&self, depositor: &Pubkey) -> bool;

    fn is_fee_administrator(&self, caller: &Pubkey) -> bool;
}
