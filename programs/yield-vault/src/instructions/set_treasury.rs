use anchor_lang::prelude::*;
use anchor_spl::token_interface::TokenAccount;
use lending_market::state::{Position, Reserve};

use crate::accounting::PositionOracle;
use crate::adapters::LendingReader;
use crate::constants::{PROTOCOL_STATE_SEED, VAULT_SEED};
use crate::error::VaultError;
use crate::events::{emit_accrual, TreasuryUpdated};
use crate::state::{ProtocolState, Vault};

#[derive(Accounts)]
pub struct SetTreasury<'info> {
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
        has_one = owner @ VaultError::Unauthorized,
    )]
    pub protocol_state: Box<Account<'info, ProtocolState>>,

    pub reserve: Box<Account<'info, Reserve>>,

    #[account(address = reserve.liquidity_account @ VaultError::InvalidReserve)]
    pub liquidity_account: Box<InterfaceAccount<'info, TokenAccount>>,

    pub position: Box<Account<'info, Position>>,

    #[account(
        constraint = new_treasury.mint == vault.underlying_mint @ VaultError::InvalidTreasury,
    )]
    pub new_treasury: Box<InterfaceAccount<'info, TokenAccount>>,

    pub owner: Signer<'info>,
}

pub fn handler(ctx: Context<SetTreasury>) -> Result<()> {
    let reader = LendingReader {
        reserve: ctx.accounts.reserve.to_account_info(),
        liquidity_account: ctx.accounts.liquidity_account.to_account_info(),
        position: ctx.accounts.position.to_account_info(),
    };
    let new_treasury = ctx.accounts.new_treasury.key();
    let vault = &mut ctx.accounts.vault;

    let accrual = vault.ledger.resynchronize(reader.live_balance()?)?;
    emit_accrual(vault.key(), accrual);

    let old_treasury = vault.treasury;
    vault.treasury = new_treasury;

    emit!(TreasuryUpdated {
        vault: vault.key(),
        old_treasury,
        new_treasury,
    });

    msg!("Treasury updated: {} -> {}", old_treasury, new_treasury);

    Ok(())
}
