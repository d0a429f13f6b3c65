//! Vault operations over the ledger.
//!
//! Every state-changing operation runs the same fixed sequence:
//!
//! 1. resynchronize the ledger against the live position balance
//! 2. check roles and bounds
//! 3. convert with the just-synchronized totals
//! 4. reject a zero counter-value
//! 5. move value between the counterparty and the position
//! 6. mint or burn shares
//! 7. restamp the checkpoint to the post-transfer balance
//!
//! Resynchronizing before the transfer means the fee split only ever sees
//! organic yield or loss, never the caller's own principal.

use anchor_lang::prelude::*;

use super::conversion::{to_assets, to_shares, Rounding};
use super::ledger::{validate_fee_rate, Accrual, AccrualLedger};
use super::{AccessControl, PositionCustody, PositionOracle, ShareRegistry};
use crate::error::VaultError;

/// Result of a deposit, mint, withdraw or redeem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub assets: u64,
    pub shares: u64,
    pub accrual: Option<Accrual>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeSweep {
    pub amount: u64,
    pub accrual: Option<Accrual>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeRateChange {
    pub old_rate_bps: u16,
    pub new_rate_bps: u16,
    pub accrual: Option<Accrual>,
}

/// The two sides of the share price.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VaultTotals {
    pub total_assets: u64,
    pub total_shares: u64,
}

impl VaultTotals {
    /// Totals as a resynchronization would leave them, without persisting one.
    pub fn observe<P: PositionOracle>(
        ledger: &AccrualLedger,
        position: &P,
        total_shares: u64,
    ) -> Result<Self> {
        Ok(Self {
            total_assets: ledger.live_total_assets(position.live_balance()?)?,
            total_shares,
        })
    }

    /// Totals of a ledger that was just resynchronized.
    pub fn synced(ledger: &AccrualLedger, total_shares: u64) -> Result<Self> {
        Ok(Self {
            total_assets: ledger.depositor_assets()?,
            total_shares,
        })
    }

    pub fn preview_deposit(&self, assets: u64) -> Result<u64> {
        to_shares(assets, self.total_assets, self.total_shares, Rounding::Floor)
    }

    pub fn preview_mint(&self, shares: u64) -> Result<u64> {
        to_assets(shares, self.total_assets, self.total_shares, Rounding::Ceil)
    }

    pub fn preview_withdraw(&self, assets: u64) -> Result<u64> {
        to_shares(assets, self.total_assets, self.total_shares, Rounding::Ceil)
    }

    pub fn preview_redeem(&self, shares: u64) -> Result<u64> {
        to_assets(shares, self.total_assets, self.total_shares, Rounding::Floor)
    }
}

pub fn claimable_fees<P: PositionOracle>(ledger: &AccrualLedger, position: &P) -> Result<u64> {
    ledger.live_fees(position.live_balance()?)
}

pub fn max_deposit<P: PositionOracle, A: AccessControl>(
    position: &P,
    roles: &A,
    depositor: &Pubkey,
) -> Result<u64> {
    if !roles.is_authorized_depositor(depositor) {
        return Ok(0);
    }
    position.max_supply()
}

pub fn max_mint<P: PositionOracle, A: AccessControl>(
    totals: &VaultTotals,
    position: &P,
    roles: &A,
    depositor: &Pubkey,
) -> Result<u64> {
    totals.preview_deposit(max_deposit(position, roles, depositor)?)
}

pub fn max_withdraw<P: PositionOracle>(totals: &VaultTotals, position: &P, balance: u64) -> Result<u64> {
    let owned = totals.preview_redeem(balance)?;
    Ok(owned.min(position.available_liquidity()?))
}

pub fn max_redeem<P: PositionOracle>(totals: &VaultTotals, position: &P, balance: u64) -> Result<u64> {
    let payable = to_shares(
        position.available_liquidity()?,
        totals.total_assets,
        totals.total_shares,
        Rounding::Floor,
    )?;
    Ok(balance.min(payable))
}

/// Creates the ledger for a new vault: supplies the seed deposit and mints the
/// matching shares to the account held by `shares`.
pub fn seed<P, S>(position: &mut P, shares: &mut S, assets: u64, fee_rate_bps: u16) -> Result<(AccrualLedger, u64)>
where
    P: PositionCustody,
    S: ShareRegistry,
{
    require!(assets > 0, VaultError::InvalidInput);
    validate_fee_rate(fee_rate_bps)?;
    require!(shares.total_shares()? == 0, VaultError::InvalidInput);

    let opening = position.live_balance()?;
    let minted = to_shares(assets, opening, 0, Rounding::Floor)?;
    require!(minted > 0, VaultError::ZeroResult);

    position.supply(assets)?;
    shares.mint(minted)?;

    let ledger = AccrualLedger::new(position.live_balance()?, fee_rate_bps)?;
    Ok((ledger, minted))
}

pub fn deposit<P, S, A>(
    ledger: &mut AccrualLedger,
    position: &mut P,
    shares: &mut S,
    roles: &A,
    depositor: &Pubkey,
    assets: u64,
) -> Result<Settlement>
where
    P: PositionCustody,
    S: ShareRegistry,
    A: AccessControl,
{
    let accrual = ledger.resynchronize(position.live_balance()?)?;

    require!(
        roles.is_authorized_depositor(depositor),
        VaultError::Unauthorized
    );
    require!(
        assets <= position.max_supply()?,
        VaultError::ExceedsBound
    );

    let totals = VaultTotals::synced(ledger, shares.total_shares()?)?;
    let minted = totals.preview_deposit(assets)?;
    require!(minted > 0, VaultError::ZeroResult);

    position.supply(assets)?;
    shares.mint(minted)?;
    ledger.restamp(position.live_balance()?)?;

    Ok(Settlement {
        assets,
        shares: minted,
        accrual,
    })
}

pub fn mint<P, S, A>(
    ledger: &mut AccrualLedger,
    position: &mut P,
    shares: &mut S,
    roles: &A,
    depositor: &Pubkey,
    shares_out: u64,
) -> Result<Settlement>
where
    P: PositionCustody,
    S: ShareRegistry,
    A: AccessControl,
{
    let accrual = ledger.resynchronize(position.live_balance()?)?;

    require!(
        roles.is_authorized_depositor(depositor),
        VaultError::Unauthorized
    );

    let totals = VaultTotals::synced(ledger, shares.total_shares()?)?;
    let assets = totals.preview_mint(shares_out)?;
    require!(
        assets <= position.max_supply()?,
        VaultError::ExceedsBound
    );
    require!(shares_out > 0 && assets > 0, VaultError::ZeroResult);

    position.supply(assets)?;
    shares.mint(shares_out)?;
    ledger.restamp(position.live_balance()?)?;

    Ok(Settlement {
        assets,
        shares: shares_out,
        accrual,
    })
}

pub fn withdraw<P, S>(
    ledger: &mut AccrualLedger,
    position: &mut P,
    shares: &mut S,
    assets: u64,
) -> Result<Settlement>
where
    P: PositionCustody,
    S: ShareRegistry,
{
    let accrual = ledger.resynchronize(position.live_balance()?)?;

    let totals = VaultTotals::synced(ledger, shares.total_shares()?)?;
    let balance = shares.balance()?;
    require!(
        assets <= max_withdraw(&totals, position, balance)?,
        VaultError::ExceedsBound
    );

    let burned = totals.preview_withdraw(assets)?;
    require!(burned > 0, VaultError::ZeroResult);
    require!(burned <= balance, VaultError::ExceedsBound);

    let delivered = position.withdraw(assets)?;
    shares.burn(burned)?;
    ledger.restamp(position.live_balance()?)?;

    Ok(Settlement {
        assets: delivered,
        shares: burned,
        accrual,
    })
}

pub fn redeem<P, S>(
    ledger: &mut AccrualLedger,
    position: &mut P,
    shares: &mut S,
    shares_in: u64,
) -> Result<Settlement>
where
    P: PositionCustody,
    S: ShareRegistry,
{
    let accrual = ledger.resynchronize(position.live_balance()?)?;

    let totals = VaultTotals::synced(ledger, shares.total_shares()?)?;
    require!(
        shares_in <= max_redeem(&totals, position, shares.balance()?)?,
        VaultError::ExceedsBound
    );

    let assets = totals.preview_redeem(shares_in)?;
    require!(assets > 0, VaultError::ZeroResult);

    let delivered = position.withdraw(assets)?;
    shares.burn(shares_in)?;
    ledger.restamp(position.live_balance()?)?;

    Ok(Settlement {
        assets: delivered,
        shares: shares_in,
        accrual,
    })
}

/// Resynchronizes at the old rate, then switches to the new one.
pub fn set_fee_rate<P, A>(
    ledger: &mut AccrualLedger,
    position: &P,
    roles: &A,
    caller: &Pubkey,
    fee_rate_bps: u16,
) -> Result<FeeRateChange>
where
    P: PositionOracle,
    A: AccessControl,
{
    let accrual = ledger.resynchronize(position.live_balance()?)?;

    require!(roles.is_fee_administrator(caller), VaultError::Unauthorized);

    let old_rate_bps = ledger.fee_rate_bps;
    ledger.set_fee_rate(fee_rate_bps)?;

    Ok(FeeRateChange {
        old_rate_bps,
        new_rate_bps: fee_rate_bps,
        accrual,
    })
}

/// Moves the whole fee balance to the counterparty held by `position`.
pub fn collect_fees<P, A>(
    ledger: &mut AccrualLedger,
    position: &mut P,
    roles: &A,
    caller: &Pubkey,
) -> Result<FeeSweep>
where
    P: PositionCustody,
    A: AccessControl,
{
    let accrual = ledger.resynchronize(position.live_balance()?)?;

    require!(roles.is_fee_administrator(caller), VaultError::Unauthorized);

    let amount = ledger.take_fees()?;
    require!(
        amount <= position.available_liquidity()?,
        VaultError::ExceedsBound
    );

    position.withdraw(amount)?;
    ledger.restamp(position.live_balance()?)?;

    Ok(FeeSweep { amount, accrual })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;

    struct Market {
        balance: u64,
        cap: u64,
        liquidity: Option<u64>,
    }

    impl PositionOracle for Market {
        fn live_balance(&self) -> Result<u64> {
            Ok(self.balance)
        }

        fn max_supply(&self) -> Result<u64> {
            Ok(self.cap)
        }

        fn available_liquidity(&self) -> Result<u64> {
            Ok(self.liquidity.unwrap_or(self.balance))
        }
    }

    impl PositionCustody for Market {
        fn supply(&mut self, amount: u64) -> Result<()> {
            self.balance += amount;
            Ok(())
        }

        fn withdraw(&mut self, amount: u64) -> Result<u64> {
            self.balance -= amount;
            Ok(amount)
        }
    }

    struct Shares {
        total: u64,
        balance: u64,
    }

    impl ShareRegistry for Shares {
        fn total_shares(&self) -> Result<u64> {
            Ok(self.total)
        }

        fn balance(&self) -> Result<u64> {
            Ok(self.balance)
        }

        fn mint(&mut self, shares: u64) -> Result<()> {
            self.total += shares;
            self.balance += shares;
            Ok(())
        }

        fn burn(&mut self, shares: u64) -> Result<()> {
            self.total -= shares;
            self.balance -= shares;
            Ok(())
        }
    }

    struct Roles {
        depositor: Pubkey,
        admin: Pubkey,
    }

    impl AccessControl for Roles {
        fn is_authorized_depositor(&self, depositor: &Pubkey) -> bool {
            *depositor == self.depositor
        }

        fn is_fee_administrator(&self, caller: &Pubkey) -> bool {
            *caller == self.admin
        }
    }

    const SEED: u64 = 1_000_000;

    /// A vault seeded with `SEED` at 10%, where the caller's share account is
    /// empty and the seed shares sit elsewhere.
    fn seeded() -> (AccrualLedger, Market, Shares, Roles) {
        let mut market = Market {
            balance: 0,
            cap: u64::MAX / 4,
            liquidity: None,
        };
        let mut seed_account = Shares {
            total: 0,
            balance: 0,
        };
        let (ledger, minted) = seed(&mut market, &mut seed_account, SEED, 1_000).unwrap();
        assert_eq!(minted, SEED);

        let shares = Shares {
            total: seed_account.total,
            balance: 0,
        };
        let roles = Roles {
            depositor: Pubkey::new_unique(),
            admin: Pubkey::new_unique(),
        };
        (ledger, market, shares, roles)
    }

    #[test]
    fn seed_stamps_the_supplied_balance() {
        let (ledger, market, shares, _) = seeded();
        assert_eq!(ledger.checkpoint_balance, SEED);
        assert_eq!(ledger.accumulated_fees, 0);
        assert_eq!(market.balance, SEED);
        assert_eq!(shares.total, SEED);
    }

    #[test]
    fn seed_rejects_zero_assets() {
        let mut market = Market {
            balance: 0,
            cap: u64::MAX,
            liquidity: None,
        };
        let mut shares = Shares {
            total: 0,
            balance: 0,
        };
        let err = seed(&mut market, &mut shares, 0, 1_000).unwrap_err();
        assert_eq!(err, Error::from(VaultError::InvalidInput));
    }

    #[test]
    fn deposit_at_par_mints_one_to_one() {
        let (mut ledger, mut market, mut shares, roles) = seeded();
        let depositor = roles.depositor;

        let settled =
            deposit(&mut ledger, &mut market, &mut shares, &roles, &depositor, 50_000).unwrap();

        assert_eq!(settled.shares, 50_000);
        assert_eq!(settled.accrual, None);
        assert_eq!(shares.balance, 50_000);
        assert_eq!(ledger.checkpoint_balance, SEED + 50_000);
    }

    #[test]
    fn deposit_prices_against_fee_adjusted_assets() {
        let (mut ledger, mut market, mut shares, roles) = seeded();
        let depositor = roles.depositor;
        market.balance += 100_000;

        let settled =
            deposit(&mut ledger, &mut market, &mut shares, &roles, &depositor, 109_000).unwrap();

        // 10_000 of the yield goes to fees, so 1_090_000 backs 1_000_000 shares
        assert_eq!(
            settled.accrual,
            Some(Accrual::Yield {
                amount: 100_000,
                fee_delta: 10_000,
                new_balance: 1_100_000,
            })
        );
        assert_eq!(settled.shares, 100_000);
        assert_eq!(ledger.accumulated_fees, 10_000);
        assert_eq!(ledger.checkpoint_balance, 1_209_000);
    }

    #[test]
    fn deposit_checks_roles_bounds_and_zero_results() {
        let (mut ledger, mut market, mut shares, roles) = seeded();
        let stranger = Pubkey::new_unique();
        let depositor = roles.depositor;

        let err =
            deposit(&mut ledger, &mut market, &mut shares, &roles, &stranger, 10).unwrap_err();
        assert_eq!(err, Error::from(VaultError::Unauthorized));

        market.cap = 100;
        let err =
            deposit(&mut ledger, &mut market, &mut shares, &roles, &depositor, 101).unwrap_err();
        assert_eq!(err, Error::from(VaultError::ExceedsBound));

        let err =
            deposit(&mut ledger, &mut market, &mut shares, &roles, &depositor, 0).unwrap_err();
        assert_eq!(err, Error::from(VaultError::ZeroResult));
    }

    #[test]
    fn mint_charges_rounded_up_assets() {
        let (mut ledger, mut market, mut shares, roles) = seeded();
        let depositor = roles.depositor;
        market.balance += 100_000;

        let settled = mint(&mut ledger, &mut market, &mut shares, &roles, &depositor, 3).unwrap();

        // 3 * 1_090_001 / 1_000_001 = 3.27, rounded up
        assert_eq!(settled.assets, 4);
        assert_eq!(shares.balance, 3);
    }

    #[test]
    fn withdraw_burns_rounded_up_shares() {
        let (mut ledger, mut market, mut shares, roles) = seeded();
        let depositor = roles.depositor;
        deposit(&mut ledger, &mut market, &mut shares, &roles, &depositor, 100_000).unwrap();
        market.balance += 110_000;

        let settled = withdraw(&mut ledger, &mut market, &mut shares, 1_000).unwrap();

        // Depositors own 1_199_000 backing 1_100_000 shares
        assert_eq!(settled.assets, 1_000);
        assert_eq!(settled.shares, 918);
        assert_eq!(shares.balance, 100_000 - 918);
        assert_eq!(ledger.checkpoint_balance, market.balance);
    }

    #[test]
    fn withdraw_beyond_owned_assets_is_rejected() {
        let (mut ledger, mut market, mut shares, roles) = seeded();
        let depositor = roles.depositor;
        deposit(&mut ledger, &mut market, &mut shares, &roles, &depositor, 100_000).unwrap();

        let err = withdraw(&mut ledger, &mut market, &mut shares, 100_001).unwrap_err();
        assert_eq!(err, Error::from(VaultError::ExceedsBound));

        let err = withdraw(&mut ledger, &mut market, &mut shares, 0).unwrap_err();
        assert_eq!(err, Error::from(VaultError::ZeroResult));
    }

    #[test]
    fn withdraw_is_capped_by_market_liquidity() {
        let (mut ledger, mut market, mut shares, roles) = seeded();
        let depositor = roles.depositor;
        deposit(&mut ledger, &mut market, &mut shares, &roles, &depositor, 100_000).unwrap();
        market.liquidity = Some(40_000);

        let totals = VaultTotals::observe(&ledger, &market, shares.total).unwrap();
        assert_eq!(max_withdraw(&totals, &market, shares.balance).unwrap(), 40_000);

        let err = withdraw(&mut ledger, &mut market, &mut shares, 40_001).unwrap_err();
        assert_eq!(err, Error::from(VaultError::ExceedsBound));
        withdraw(&mut ledger, &mut market, &mut shares, 40_000).unwrap();
    }

    #[test]
    fn redeem_after_loss_pays_the_reduced_price() {
        let (mut ledger, mut market, mut shares, roles) = seeded();
        let depositor = roles.depositor;
        deposit(&mut ledger, &mut market, &mut shares, &roles, &depositor, 1_000_000).unwrap();
        market.balance -= 200_000;

        let settled = redeem(&mut ledger, &mut market, &mut shares, 1_000_000).unwrap();

        assert!(matches!(settled.accrual, Some(Accrual::Loss { amount: 200_000, .. })));
        // 1_800_000 shared across 2_000_000 shares, rounded down
        assert_eq!(settled.assets, 900_000);
        assert_eq!(shares.balance, 0);
        assert_eq!(ledger.checkpoint_balance, 900_000);
    }

    #[test]
    fn fee_administration_is_gated() {
        let (mut ledger, mut market, _, roles) = seeded();
        let stranger = Pubkey::new_unique();

        let err = set_fee_rate(&mut ledger, &market, &roles, &stranger, 500).unwrap_err();
        assert_eq!(err, Error::from(VaultError::Unauthorized));

        let err = collect_fees(&mut ledger, &mut market, &roles, &stranger).unwrap_err();
        assert_eq!(err, Error::from(VaultError::Unauthorized));
    }

    #[test]
    fn fee_rate_change_settles_pending_yield_at_the_old_rate() {
        let (mut ledger, mut market, _, roles) = seeded();
        let admin = roles.admin;
        market.balance += 100_000;

        let change = set_fee_rate(&mut ledger, &market, &roles, &admin, 5_000).unwrap();

        assert_eq!(change.old_rate_bps, 1_000);
        assert_eq!(change.new_rate_bps, 5_000);
        assert_eq!(ledger.accumulated_fees, 10_000);
        assert_eq!(ledger.fee_rate_bps, 5_000);

        let err = set_fee_rate(&mut ledger, &market, &roles, &admin, 10_001).unwrap_err();
        assert_eq!(err, Error::from(VaultError::InvalidInput));
    }

    #[test]
    fn collect_fees_leaves_depositor_assets_untouched() {
        let (mut ledger, mut market, shares, roles) = seeded();
        let admin = roles.admin;

        let err = collect_fees(&mut ledger, &mut market, &roles, &admin).unwrap_err();
        assert_eq!(err, Error::from(VaultError::NothingToCollect));

        market.balance += 100_000;
        assert_eq!(claimable_fees(&ledger, &market).unwrap(), 10_000);
        let before = VaultTotals::observe(&ledger, &market, shares.total).unwrap();

        let sweep = collect_fees(&mut ledger, &mut market, &roles, &admin).unwrap();

        assert_eq!(sweep.amount, 10_000);
        assert_eq!(market.balance, 1_090_000);
        assert_eq!(ledger.accumulated_fees, 0);
        assert_eq!(ledger.checkpoint_balance, 1_090_000);
        let after = VaultTotals::observe(&ledger, &market, shares.total).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn collect_fees_needs_liquidity() {
        let (mut ledger, mut market, _, roles) = seeded();
        let admin = roles.admin;
        market.balance += 100_000;
        market.liquidity = Some(9_999);

        let err = collect_fees(&mut ledger, &mut market, &roles, &admin).unwrap_err();
        assert_eq!(err, Error::from(VaultError::ExceedsBound));
    }

    #[test]
    fn max_queries_respect_roles_and_balances() {
        let (ledger, market, shares, roles) = seeded();
        let stranger = Pubkey::new_unique();
        let totals = VaultTotals::observe(&ledger, &market, shares.total).unwrap();

        assert_eq!(max_deposit(&market, &roles, &stranger).unwrap(), 0);
        assert_eq!(max_mint(&totals, &market, &roles, &stranger).unwrap(), 0);
        assert_eq!(
            max_deposit(&market, &roles, &roles.depositor).unwrap(),
            market.cap
        );
        assert_eq!(max_withdraw(&totals, &market, 0).unwrap(), 0);
        assert_eq!(max_redeem(&totals, &market, 0).unwrap(), 0);
        assert_eq!(max_redeem(&totals, &market, 250).unwrap(), 250);
    }
}
