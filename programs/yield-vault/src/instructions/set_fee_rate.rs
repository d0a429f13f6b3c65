use anchor_lang::prelude::*;
use anchor_spl::token_interface::TokenAccount;
use lending_market::state::{Position, Reserve};

use crate::accounting;
use crate::adapters::{LendingReader, VaultRoles};
use crate::constants::{PROTOCOL_STATE_SEED, VAULT_SEED};
use crate::error::VaultError;
use crate::events::{emit_accrual, FeeRateUpdated};
use crate::state::{ProtocolState, Vault};

#[derive(Accounts)]
pub struct SetFeeRate<'info> {
    #[account(
        mut,
        seeds = [VAULT_SEED, vault.underlying_mint.as_ref()],
        bump = vault.bump,
        has_one = reserve @ VaultError::InvalidReserve,
        has_one = position @ VaultError::InvalidReserve,
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(
        seeds = [PROTOCOL_STATE_SEED],
        bump = protocol_state.bump,
    )]
    pub protocol_state: Box<Account<'info, ProtocolState>>,

    pub reserve: Box<Account<'info, Reserve>>,

    #[account(address = reserve.liquidity_account @ VaultError::InvalidReserve)]
    pub liquidity_account: Box<InterfaceAccount<'info, TokenAccount>>,

    pub position: Box<Account<'info, Position>>,

    /// Checked against the protocol owner by the accounting layer
    pub caller: Signer<'info>,
}

pub fn handler(ctx: Context<SetFeeRate>, fee_rate_bps: u16) -> Result<()> {
    let reader = LendingReader {
        reserve: ctx.accounts.reserve.to_account_info(),
        liquidity_account: ctx.accounts.liquidity_account.to_account_info(),
        position: ctx.accounts.position.to_account_info(),
    };
    let caller = ctx.accounts.caller.key();
    let vault_key = ctx.accounts.vault.key();

    let accounts = &mut *ctx.accounts;
    let roles = VaultRoles {
        protocol_state: &accounts.protocol_state,
        depositor_record: None,
    };

    let change =
        accounting::set_fee_rate(&mut accounts.vault.ledger, &reader, &roles, &caller, fee_rate_bps)?;

    emit_accrual(vault_key, change.accrual);
    emit!(FeeRateUpdated {
        vault: vault_key,
        old_rate_bps: change.old_rate_bps,
        new_rate_bps: change.new_rate_bps,
    });

    msg!(
        "Fee rate updated: {} -> {} bps",
        change.old_rate_bps,
        change.new_rate_bps
    );

    Ok(())
}
