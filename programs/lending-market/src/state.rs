use anchor_lang::prelude::*;

use crate::constants::{VIRTUAL_LIQUIDITY, VIRTUAL_SHARES};
use crate::error::LendingError;

/// A liquidity pool for one mint. Positions own shares of the pool, so any
/// liquidity that lands in `liquidity_account` outside of `supply` raises the
/// balance of every position pro rata.
#[account]
pub struct Reserve {
    /// May cap supply and slash liquidity
    pub authority: Pubkey,
    /// The mint this reserve lends
    pub liquidity_mint: Pubkey,
    /// Token account (owned by the reserve PDA) holding all liquidity
    pub liquidity_account: Pubkey,
    /// Shares outstanding across all positions
    pub total_shares: u64,
    /// Upper bound on liquidity accepted through `supply`
    pub supply_cap: u64,
    /// Bump seed for PDA derivation
    pub bump: u8,
}

impl Reserve {
    pub const LEN: usize = 8 + // discriminator
        32 + // authority
        32 + // liquidity_mint
        32 + // liquidity_account
        8 + // total_shares
        8 + // supply_cap
        1; // bump

    /// Liquidity redeemable by `shares`, rounded down.
    pub fn balance_of(&self, shares: u64, liquidity: u64) -> Result<u64> {
        mul_div(shares, self.virtual_liquidity(liquidity), self.virtual_shares(), false)
    }

    /// Shares issued for supplying `amount`, rounded down.
    pub fn shares_for_supply(&self, amount: u64, liquidity: u64) -> Result<u64> {
        require!(
            self.total_shares == 0 || liquidity > 0,
            LendingError::ReserveInsolvent
        );
        mul_div(amount, self.virtual_shares(), self.virtual_liquidity(liquidity), false)
    }

    /// Shares burned for withdrawing `amount`, rounded up.
    pub fn shares_for_withdraw(&self, amount: u64, liquidity: u64) -> Result<u64> {
        require!(amount <= liquidity, LendingError::InsufficientLiquidity);
        mul_div(amount, self.virtual_shares(), self.virtual_liquidity(liquidity), true)
    }

    fn virtual_shares(&self) -> u128 {
        self.total_shares as u128 + VIRTUAL_SHARES as u128
    }

    fn virtual_liquidity(&self, liquidity: u64) -> u128 {
        liquidity as u128 + VIRTUAL_LIQUIDITY as u128
    }

    pub fn remaining_capacity(&self, liquidity: u64) -> u64 {
        self.supply_cap.saturating_sub(liquidity)
    }
}

#[account]
pub struct Position {
    /// Reserve this position belongs to
    pub reserve: Pubkey,
    /// Only the owner may supply or withdraw
    pub owner: Pubkey,
    /// Reserve shares held
    pub shares: u64,
    /// Bump seed for PDA derivation
    pub bump: u8,
}

impl Position {
    pub const LEN: usize = 8 + // discriminator
        32 + // reserve
        32 + // owner
        8 + // shares
        1; // bump
}

fn mul_div(a: u64, b: u128, denominator: u128, round_up: bool) -> Result<u64> {
    let product = (a as u128)
        .checked_mul(b)
        .ok_or(LendingError::MathOverflow)?;
    let mut quotient = product
        .checked_div(denominator)
        .ok_or(LendingError::MathOverflow)?;
    if round_up && quotient * denominator != product {
        quotient += 1;
    }
    u64::try_from(quotient).map_err(|_| error!(LendingError::MathOverflow))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reserve(total_shares: u64) -> Reserve {
        Reserve {
            authority: Pubkey::default(),
            liquidity_mint: Pubkey::default(),
            liquidity_account: Pubkey::default(),
            total_shares,
            supply_cap: u64::MAX,
            bump: 255,
        }
    }

    #[test]
    fn first_supply_mints_against_the_virtual_offset() {
        assert_eq!(reserve(0).shares_for_supply(1_000, 0).unwrap(), 1_000_000);
        assert_eq!(reserve(0).balance_of(0, 0).unwrap(), 0);
    }

    #[test]
    fn donated_liquidity_raises_position_balance() {
        let reserve = reserve(1_000_000_000);
        assert_eq!(reserve.balance_of(400_000_000, 1_000_000).unwrap(), 400_000);
        // 10% donated into the liquidity account, a sliver of it to the virtual shares
        assert_eq!(reserve.balance_of(400_000_000, 1_100_000).unwrap(), 439_999);
    }

    #[test]
    fn withdraw_burns_rounded_up_shares() {
        let reserve = reserve(1_000_000_000);
        assert_eq!(reserve.shares_for_withdraw(1, 1_100_000).unwrap(), 910);
        assert_eq!(
            reserve.shares_for_withdraw(110_000, 1_100_000).unwrap(),
            100_000_010
        );
        assert!(reserve.shares_for_withdraw(1_100_001, 1_100_000).is_err());
    }

    #[test]
    fn donation_into_a_thin_reserve_mostly_goes_to_virtual_shares() {
        // One unit supplied, then 999_999 donated
        let mut reserve = reserve(0);
        reserve.total_shares = reserve.shares_for_supply(1, 0).unwrap();
        assert_eq!(reserve.total_shares, 1_000);
        assert_eq!(reserve.balance_of(1_000, 1_000_000).unwrap(), 500_000);
    }

    #[test]
    fn full_balance_is_always_withdrawable() {
        let reserve = reserve(1_000_000_123);
        let (shares, liquidity) = (333_333_333, 1_234_567);
        let balance = reserve.balance_of(shares, liquidity).unwrap();
        assert!(reserve.shares_for_withdraw(balance, liquidity).unwrap() <= shares);
    }

    #[test]
    fn supply_into_drained_reserve_is_rejected() {
        assert!(reserve(1_000).shares_for_supply(10, 0).is_err());
    }

    #[test]
    fn capacity_saturates_at_zero() {
        let mut reserve = reserve(0);
        reserve.supply_cap = 500;
        assert_eq!(reserve.remaining_capacity(200), 300);
        assert_eq!(reserve.remaining_capacity(900), 0);
    }
}
