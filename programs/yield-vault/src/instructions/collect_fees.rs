use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use lending_market::program::LendingMarket;
use lending_market::state::{Position, Reserve};

use crate::accounting;
use crate::adapters::{LendingPosition, LendingReader, VaultRoles};
use crate::constants::{PROTOCOL_STATE_SEED, VAULT_AUTHORITY_SEED, VAULT_SEED};
use crate::error::VaultError;
use crate::events::{emit_accrual, FeesCollected};
use crate::state::{ProtocolState, Vault, VaultAuthority};

/// Sweeps every accumulated fee out of the position into the vault's treasury.
#[derive(Accounts)]
pub struct CollectFees<'info> {
    #[account(
        mut,
        seeds = [VAULT_SEED, underlying_mint.key().as_ref()],
        bump = vault.bump,
        has_one = underlying_mint,
        has_one = vault_token_account,
        has_one = treasury @ VaultError::InvalidTreasury,
        has_one = reserve @ VaultError::InvalidReserve,
        has_one = position @ VaultError::InvalidReserve,
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(
        seeds = [PROTOCOL_STATE_SEED],
        bump = protocol_state.bump,
    )]
    pub protocol_state: Box<Account<'info, ProtocolState>>,

    pub underlying_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(mut)]
    pub vault_token_account: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        seeds = [VAULT_AUTHORITY_SEED],
        bump = vault_authority.bump
    )]
    pub vault_authority: Box<Account<'info, VaultAuthority>>,

    #[account(mut)]
    pub reserve: Box<Account<'info, Reserve>>,

    #[account(
        mut,
        address = reserve.liquidity_account @ VaultError::InvalidReserve,
    )]
    pub liquidity_account: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut)]
    pub position: Box<Account<'info, Position>>,

    #[account(mut)]
    pub treasury: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Checked against the protocol owner by the accounting layer
    pub caller: Signer<'info>,

    pub lending_program: Program<'info, LendingMarket>,
    pub token_program: Interface<'info, TokenInterface>,
}

pub fn handler(ctx: Context<CollectFees>) -> Result<()> {
    let mut position = LendingPosition {
        reader: LendingReader {
            reserve: ctx.accounts.reserve.to_account_info(),
            liquidity_account: ctx.accounts.liquidity_account.to_account_info(),
            position: ctx.accounts.position.to_account_info(),
        },
        lending_program: ctx.accounts.lending_program.to_account_info(),
        underlying_mint: ctx.accounts.underlying_mint.to_account_info(),
        decimals: ctx.accounts.underlying_mint.decimals,
        staging: ctx.accounts.vault_token_account.to_account_info(),
        vault_authority: ctx.accounts.vault_authority.to_account_info(),
        vault_authority_bump: ctx.accounts.vault_authority.bump,
        counterparty: ctx.accounts.treasury.to_account_info(),
        counterparty_authority: ctx.accounts.caller.to_account_info(),
        token_program: ctx.accounts.token_program.to_account_info(),
    };
    let caller = ctx.accounts.caller.key();
    let vault_key = ctx.accounts.vault.key();
    let treasury = ctx.accounts.treasury.key();

    let accounts = &mut *ctx.accounts;
    let roles = VaultRoles {
        protocol_state: &accounts.protocol_state,
        depositor_record: None,
    };

    let sweep = accounting::collect_fees(&mut accounts.vault.ledger, &mut position, &roles, &caller)?;

    emit_accrual(vault_key, sweep.accrual);
    emit!(FeesCollected {
        vault: vault_key,
        treasury,
        amount: sweep.amount,
    });

    msg!("Fees collected: {}", sweep.amount);
    msg!("Treasury: {}", treasury);
    msg!("Position balance: {}", accounts.vault.ledger.checkpoint_balance);

    Ok(())
}
