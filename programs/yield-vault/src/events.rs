use anchor_lang::prelude::*;

use crate::accounting::Accrual;

#[event]
pub struct ProtocolInitialized {
    pub owner: Pubkey,
    pub vault_authority: Pubkey,
}

#[event]
pub struct OwnershipTransferred {
    pub previous_owner: Pubkey,
    pub new_owner: Pubkey,
}

#[event]
pub struct YieldAccrued {
    pub vault: Pubkey,
    pub yield_amount: u64,
    pub fee_delta: u64,
    pub new_balance: u64,
}

#[event]
pub struct LossRealized {
    pub vault: Pubkey,
    pub loss: u64,
    pub fee_delta: u64,
    pub new_balance: u64,
}

#[event]
pub struct Deposited {
    pub vault: Pubkey,
    pub depositor: Pubkey,
    pub assets: u64,
    pub shares: u64,
}

#[event]
pub struct Withdrawn {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub receiver: Pubkey,
    pub assets: u64,
    pub shares: u64,
}

#[event]
pub struct FeesCollected {
    pub vault: Pubkey,
    pub treasury: Pubkey,
    pub amount: u64,
}

#[event]
pub struct FeeRateUpdated {
    pub vault: Pubkey,
    pub old_rate_bps: u16,
    pub new_rate_bps: u16,
}

#[event]
pub struct DepositorUpdated {
    pub vault: Pubkey,
    pub depositor: Pubkey,
    pub authorized: bool,
}

#[event]
pub struct TreasuryUpdated {
    pub vault: Pubkey,
    pub old_treasury: Pubkey,
    pub new_treasury: Pubkey,
}

/// Logs and emits the outcome of a resynchronization. A no-op emits nothing.
pub fn emit_accrual(vault: Pubkey, accrual: Option<Accrual>) {
    match accrual {
        Some(Accrual::Yield {
            amount,
            fee_delta,
            new_balance,
        }) => {
            msg!("Yield accrued: {} ({} to fees)", amount, fee_delta);
            emit!(YieldAccrued {
                vault,
                yield_amount: amount,
                fee_delta,
                new_balance,
            });
        }
        Some(Accrual::Loss {
            amount,
            fee_delta,
            new_balance,
        }) => {
            msg!("Loss realized: {} ({} from fees)", amount, fee_delta);
            emit!(LossRealized {
                vault,
                loss: amount,
                fee_delta,
                new_balance,
            });
        }
        None => {}
    }
}
