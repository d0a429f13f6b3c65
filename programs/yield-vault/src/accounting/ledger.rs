//! Checkpointed split of the lending position between depositors and the
//! treasury.
//!
//! The ledger remembers the position balance it last saw (`checkpoint_balance`)
//! and how much of it belongs to the treasury (`accumulated_fees`). Whenever an
//! operation observes a different live balance, the difference is split:
//!
//! - **Yield** `Y`: the fee-owned fraction of the pool earns its full share of
//!   `Y`, and the depositor-owned fraction gives up `fee_rate_bps` of its share.
//!   ```text
//!   fee_delta = Y * fees / checkpoint
//!             + Y * (checkpoint - fees) / checkpoint * rate / MAX
//!   ```
//!   With `checkpoint == 0` there is nothing to split proportionally and
//!   `fee_delta = Y * rate / MAX`.
//! - **Loss** `L`: fees take a proportional haircut,
//!   `fee_delta = fees * L / checkpoint`, with no extra skim.
//!
//! Every division truncates, which keeps `accumulated_fees <= checkpoint_balance`.

use core::cmp::Ordering;

use anchor_lang::prelude::*;

use super::conversion::{mul_div, Rounding};
use crate::constants::MAX_FEE_RATE_BPS;
use crate::error::VaultError;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccrualLedger {
    /// Position balance as of the last resynchronization
    pub checkpoint_balance: u64,
    /// Part of the checkpoint owed to the treasury
    pub accumulated_fees: u64,
    /// Share of depositor yield skimmed for the treasury
    pub fee_rate_bps: u16,
}

/// Outcome of a resynchronization that observed a balance change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Accrual {
    Yield {
        amount: u64,
        fee_delta: u64,
        new_balance: u64,
    },
    Loss {
        amount: u64,
        fee_delta: u64,
        new_balance: u64,
    },
}

pub fn validate_fee_rate(fee_rate_bps: u16) -> Result<()> {
    require!(
        fee_rate_bps <= MAX_FEE_RATE_BPS,
        VaultError::InvalidInput
    );
    Ok(())
}

impl AccrualLedger {
    pub const LEN: usize = 8 + // checkpoint_balance
        8 + // accumulated_fees
        2; // fee_rate_bps

    /// A ledger seeded with the position balance after the initial deposit.
    pub fn new(seed_balance: u64, fee_rate_bps: u16) -> Result<Self> {
        require!(seed_balance > 0, VaultError::InvalidInput);
        validate_fee_rate(fee_rate_bps)?;

        Ok(Self {
            checkpoint_balance: seed_balance,
            accumulated_fees: 0,
            fee_rate_bps,
        })
    }

    /// Folds the difference between `live_balance` and the checkpoint into the
    /// fee balance and moves the checkpoint. Returns `None` when the balance
    /// did not move, in which case nothing changes.
    pub fn resynchronize(&mut self, live_balance: u64) -> Result<Option<Accrual>> {
        let checkpoint = self.checkpoint_balance;

        let accrual = match live_balance.cmp(&checkpoint) {
            Ordering::Equal => return Ok(None),
            Ordering::Greater => {
                let amount = live_balance - checkpoint;
                let fee_delta = self.yield_fee(amount)?;
                self.accumulated_fees = self
                    .accumulated_fees
                    .checked_add(fee_delta)
                    .ok_or(VaultError::MathOverflow)?;
                Accrual::Yield {
                    amount,
                    fee_delta,
                    new_balance: live_balance,
                }
            }
            Ordering::Less => {
                let amount = checkpoint - live_balance;
                let fee_delta = mul_div(
                    self.accumulated_fees as u128,
                    amount as u128,
                    checkpoint as u128,
                    Rounding::Floor,
                )?;
                self.accumulated_fees = self
                    .accumulated_fees
                    .checked_sub(fee_delta)
                    .ok_or(VaultError::MathOverflow)?;
                Accrual::Loss {
                    amount,
                    fee_delta,
                    new_balance: live_balance,
                }
            }
        };

        self.checkpoint_balance = live_balance;
        Ok(Some(accrual))
    }

    fn yield_fee(&self, amount: u64) -> Result<u64> {
        let rate = self.fee_rate_bps as u128;
        let max = MAX_FEE_RATE_BPS as u128;

        if self.checkpoint_balance == 0 {
            return mul_div(amount as u128, rate, max, Rounding::Floor);
        }

        let checkpoint = self.checkpoint_balance as u128;
        let fees = self.accumulated_fees as u128;

        let fee_share = mul_div(amount as u128, fees, checkpoint, Rounding::Floor)?;
        let depositor_share = mul_div(
            amount as u128,
            checkpoint - fees,
            checkpoint,
            Rounding::Floor,
        )?;
        let skim = mul_div(depositor_share as u128, rate, max, Rounding::Floor)?;

        fee_share
            .checked_add(skim)
            .ok_or(error!(VaultError::MathOverflow))
    }

    /// Fee balance a resynchronization against `live_balance` would produce.
    pub fn live_fees(&self, live_balance: u64) -> Result<u64> {
        let mut settled = *self;
        settled.resynchronize(live_balance)?;
        Ok(settled.accumulated_fees)
    }

    /// Depositor-owned assets if the ledger were resynchronized against `live_balance`.
    pub fn live_total_assets(&self, live_balance: u64) -> Result<u64> {
        live_balance
            .checked_sub(self.live_fees(live_balance)?)
            .ok_or(error!(VaultError::MathOverflow))
    }

    /// Depositor-owned assets as of the checkpoint.
    pub fn depositor_assets(&self) -> Result<u64> {
        self.checkpoint_balance
            .checked_sub(self.accumulated_fees)
            .ok_or(error!(VaultError::MathOverflow))
    }

    /// Moves the checkpoint to the balance left after the operation's own
    /// transfer, so that transfer is never mistaken for yield or loss.
    pub fn restamp(&mut self, live_balance: u64) -> Result<()> {
        require!(
            live_balance >= self.accumulated_fees,
            VaultError::ExceedsBound
        );
        self.checkpoint_balance = live_balance;
        Ok(())
    }

    /// Zeroes the fee balance and returns what it held.
    pub fn take_fees(&mut self) -> Result<u64> {
        let fees = self.accumulated_fees;
        require!(fees > 0, VaultError::NothingToCollect);
        self.accumulated_fees = 0;
        Ok(fees)
    }

    pub fn set_fee_rate(&mut self, fee_rate_bps: u16) -> Result<()> {
        validate_fee_rate(fee_rate_bps)?;
        self.fee_rate_bps = fee_rate_bps;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use anchor_lang::error::Error;
    use test_case::test_case;

    use super::*;

    fn ledger(checkpoint_balance: u64, accumulated_fees: u64, fee_rate_bps: u16) -> AccrualLedger {
        AccrualLedger {
            checkpoint_balance,
            accumulated_fees,
            fee_rate_bps,
        }
    }

    #[test_case(1_000_000, 0, 1_000, 1_010_000 => (1_000, 1_000); "yield on a fee-free pool")]
    #[test_case(1_010_000, 1_000, 1_000, 1_111_000 => (10_190, 11_190); "fee balance earns its own yield")]
    #[test_case(0, 0, 1_000, 500 => (50, 50); "yield into a drained ledger")]
    #[test_case(1_000_000, 100_000, 1_000, 800_000 => (20_000, 80_000); "proportional haircut on loss")]
    fn accrual_scenarios(checkpoint: u64, fees: u64, rate: u16, live: u64) -> (u64, u64) {
        let mut ledger = ledger(checkpoint, fees, rate);
        let fee_delta = match ledger.resynchronize(live).unwrap() {
            Some(Accrual::Yield { fee_delta, .. }) | Some(Accrual::Loss { fee_delta, .. }) => {
                fee_delta
            }
            None => panic!("balance moved but no accrual was recorded"),
        };
        assert_eq!(ledger.checkpoint_balance, live);
        (fee_delta, ledger.accumulated_fees)
    }

    #[test]
    fn accrual_reports_direction_and_amount() {
        let mut ledger = ledger(1_000_000, 0, 1_000);
        assert_eq!(
            ledger.resynchronize(1_010_000).unwrap(),
            Some(Accrual::Yield {
                amount: 10_000,
                fee_delta: 1_000,
                new_balance: 1_010_000,
            })
        );
        assert_eq!(
            ledger.resynchronize(1_000_000).unwrap(),
            Some(Accrual::Loss {
                amount: 10_000,
                fee_delta: 9,
                new_balance: 1_000_000,
            })
        );
    }

    #[test]
    fn resynchronize_is_idempotent() {
        let mut ledger = ledger(1_000_000, 12_345, 2_500);
        assert!(ledger.resynchronize(1_050_000).unwrap().is_some());
        let settled = ledger;

        assert_eq!(ledger.resynchronize(1_050_000).unwrap(), None);
        assert_eq!(ledger, settled);
    }

    #[test]
    fn unchanged_balance_is_a_no_op() {
        let mut ledger = ledger(500, 20, 1_000);
        assert_eq!(ledger.resynchronize(500).unwrap(), None);
        assert_eq!(ledger, self::ledger(500, 20, 1_000));
    }

    #[test]
    fn loss_haircut_matches_closed_form() {
        let (balance, fees) = (9_876_543u64, 1_234_567u64);
        for loss in [1u64, 17, 999_999, 4_000_000, 9_876_542] {
            let mut ledger = ledger(balance, fees, 3_000);
            ledger.resynchronize(balance - loss).unwrap();
            let haircut = (fees as u128 * loss as u128 / balance as u128) as u64;
            assert_eq!(ledger.accumulated_fees, fees - haircut);
            assert!(ledger.accumulated_fees <= ledger.checkpoint_balance);
        }
    }

    #[test]
    fn total_loss_wipes_fees() {
        let mut ledger = ledger(1_000, 400, 1_000);
        ledger.resynchronize(0).unwrap();
        assert_eq!(ledger.accumulated_fees, 0);
        assert_eq!(ledger.checkpoint_balance, 0);
    }

    #[test]
    fn fees_never_exceed_checkpoint() {
        let mut ledger = ledger(1, 0, MAX_FEE_RATE_BPS);
        for live in [2u64, 3, 1_000, 999, 7, 1_000_000, 3, 3, 1, 50_000] {
            ledger.resynchronize(live).unwrap();
            assert!(ledger.accumulated_fees <= ledger.checkpoint_balance);
        }
    }

    #[test]
    fn full_rate_sends_all_yield_to_fees() {
        let mut ledger = ledger(1_000_000, 0, MAX_FEE_RATE_BPS);
        ledger.resynchronize(1_200_000).unwrap();
        assert_eq!(ledger.accumulated_fees, 200_000);
        assert_eq!(ledger.depositor_assets().unwrap(), 1_000_000);
    }

    #[test]
    fn live_views_do_not_persist() {
        let ledger = ledger(1_000_000, 0, 1_000);
        assert_eq!(ledger.live_fees(1_010_000).unwrap(), 1_000);
        assert_eq!(ledger.live_total_assets(1_010_000).unwrap(), 1_009_000);
        assert_eq!(ledger.accumulated_fees, 0);
        assert_eq!(ledger.checkpoint_balance, 1_000_000);
    }

    #[test]
    fn live_fees_match_a_real_resynchronization() {
        let mut ledger = ledger(1_010_000, 1_000, 1_000);
        let preview = ledger.live_fees(1_111_000).unwrap();
        ledger.resynchronize(1_111_000).unwrap();
        assert_eq!(preview, ledger.accumulated_fees);
    }

    #[test]
    fn rate_change_is_not_retroactive() {
        let mut ledger = ledger(1_000_000, 5_000, 1_000);
        let before = ledger.live_fees(1_000_000).unwrap();
        ledger.set_fee_rate(5_000).unwrap();
        assert_eq!(ledger.live_fees(1_000_000).unwrap(), before);

        // Only yield after the change uses the new rate
        ledger.resynchronize(1_100_000).unwrap();
        // 100_000 * 5_000 / 1_000_000 = 500, 100_000 * 995_000 / 1_000_000 = 99_500 -> 49_750
        assert_eq!(ledger.accumulated_fees, 5_000 + 500 + 49_750);
    }

    #[test]
    fn construction_rejects_bad_input() {
        assert_eq!(
            AccrualLedger::new(0, 1_000).unwrap_err(),
            Error::from(VaultError::InvalidInput)
        );
        assert_eq!(
            AccrualLedger::new(1, MAX_FEE_RATE_BPS + 1).unwrap_err(),
            Error::from(VaultError::InvalidInput)
        );
        assert_eq!(
            AccrualLedger::new(1_000, 1_000).unwrap(),
            ledger(1_000, 0, 1_000)
        );
    }

    #[test]
    fn take_fees_requires_a_balance() {
        let mut ledger = ledger(1_000, 0, 1_000);
        assert_eq!(
            ledger.take_fees().unwrap_err(),
            Error::from(VaultError::NothingToCollect)
        );

        ledger.accumulated_fees = 70;
        assert_eq!(ledger.take_fees().unwrap(), 70);
        assert_eq!(ledger.accumulated_fees, 0);
    }

    #[test]
    fn restamp_cannot_strand_fees() {
        let mut ledger = ledger(1_000, 300, 1_000);
        ledger.restamp(300).unwrap();
        assert_eq!(ledger.checkpoint_balance, 300);
        assert!(ledger.restamp(299).is_err());
    }
}
