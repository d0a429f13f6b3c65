//! Read-only queries. Each one prices against live totals (position balance
//! minus the fees a resynchronization would book) and returns its answer as
//! instruction return data without writing any account.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount};
use lending_market::state::{Position, Reserve};

use crate::accounting::{self, VaultTotals};
use crate::adapters::{LendingReader, VaultRoles};
use crate::constants::{DEPOSITOR_SEED, PROTOCOL_STATE_SEED, VAULT_SEED};
use crate::error::VaultError;
use crate::state::{DepositorRecord, ProtocolState, Vault};

#[derive(Accounts)]
pub struct VaultView<'info> {
    #[account(
        seeds = [VAULT_SEED, vault.underlying_mint.as_ref()],
        bump = vault.bump,
        has_one = share_mint,
        has_one = reserve @ VaultError::InvalidReserve,
        has_one = position @ VaultError::InvalidReserve,
    )]
    pub vault: Box<Account<'info, Vault>>,

    pub share_mint: Box<InterfaceAccount<'info, Mint>>,

    pub reserve: Box<Account<'info, Reserve>>,

    #[account(address = reserve.liquidity_account @ VaultError::InvalidReserve)]
    pub liquidity_account: Box<InterfaceAccount<'info, TokenAccount>>,

    pub position: Box<Account<'info, Position>>,
}

/// `VaultView` plus the depositor whose limits are queried.
#[derive(Accounts)]
pub struct DepositorView<'info> {
    #[account(
        seeds = [VAULT_SEED, vault.underlying_mint.as_ref()],
        bump = vault.bump,
        has_one = share_mint,
        has_one = reserve @ VaultError::InvalidReserve,
        has_one = position @ VaultError::InvalidReserve,
    )]
    pub vault: Box<Account<'info, Vault>>,

    pub share_mint: Box<InterfaceAccount<'info, Mint>>,

    pub reserve: Box<Account<'info, Reserve>>,

    #[account(address = reserve.liquidity_account @ VaultError::InvalidReserve)]
    pub liquidity_account: Box<InterfaceAccount<'info, TokenAccount>>,

    pub position: Box<Account<'info, Position>>,

    #[account(
        seeds = [PROTOCOL_STATE_SEED],
        bump = protocol_state.bump,
    )]
    pub protocol_state: Box<Account<'info, ProtocolState>>,

    #[account(
        seeds = [DEPOSITOR_SEED, vault.key().as_ref(), depositor.key().as_ref()],
        bump,
    )]
    pub depositor_record: Option<Account<'info, DepositorRecord>>,

    /// CHECK: only its key is used
    pub depositor: UncheckedAccount<'info>,
}

/// `VaultView` plus the share account whose exit limits are queried.
#[derive(Accounts)]
pub struct HolderView<'info> {
    #[account(
        seeds = [VAULT_SEED, vault.underlying_mint.as_ref()],
        bump = vault.bump,
        has_one = share_mint,
        has_one = reserve @ VaultError::InvalidReserve,
        has_one = position @ VaultError::InvalidReserve,
    )]
    pub vault: Box<Account<'info, Vault>>,

    pub share_mint: Box<InterfaceAccount<'info, Mint>>,

    pub reserve: Box<Account<'info, Reserve>>,

    #[account(address = reserve.liquidity_account @ VaultError::InvalidReserve)]
    pub liquidity_account: Box<InterfaceAccount<'info, TokenAccount>>,

    pub position: Box<Account<'info, Position>>,

    #[account(token::mint = share_mint)]
    pub holder_share_account: Box<InterfaceAccount<'info, TokenAccount>>,
}

fn reader<'info>(
    reserve: &Account<'info, Reserve>,
    liquidity_account: &InterfaceAccount<'info, TokenAccount>,
    position: &Account<'info, Position>,
) -> LendingReader<'info> {
    LendingReader {
        reserve: reserve.to_account_info(),
        liquidity_account: liquidity_account.to_account_info(),
        position: position.to_account_info(),
    }
}

impl<'info> VaultView<'info> {
    fn reader(&self) -> LendingReader<'info> {
        reader(&self.reserve, &self.liquidity_account, &self.position)
    }

    fn totals(&self) -> Result<VaultTotals> {
        VaultTotals::observe(&self.vault.ledger, &self.reader(), self.share_mint.supply)
    }
}

impl<'info> DepositorView<'info> {
    fn reader(&self) -> LendingReader<'info> {
        reader(&self.reserve, &self.liquidity_account, &self.position)
    }
}

impl<'info> HolderView<'info> {
    fn reader(&self) -> LendingReader<'info> {
        reader(&self.reserve, &self.liquidity_account, &self.position)
    }

    fn totals(&self) -> Result<VaultTotals> {
        VaultTotals::observe(&self.vault.ledger, &self.reader(), self.share_mint.supply)
    }
}

pub fn total_assets(ctx: Context<VaultView>) -> Result<u64> {
    Ok(ctx.accounts.totals()?.total_assets)
}

pub fn claimable_fees(ctx: Context<VaultView>) -> Result<u64> {
    accounting::claimable_fees(&ctx.accounts.vault.ledger, &ctx.accounts.reader())
}

pub fn fee_rate(ctx: Context<VaultView>) -> Result<u16> {
    Ok(ctx.accounts.vault.ledger.fee_rate_bps)
}

pub fn preview_deposit(ctx: Context<VaultView>, assets: u64) -> Result<u64> {
    ctx.accounts.totals()?.preview_deposit(assets)
}

pub fn preview_mint(ctx: Context<VaultView>, shares: u64) -> Result<u64> {
    ctx.accounts.totals()?.preview_mint(shares)
}

pub fn preview_withdraw(ctx: Context<VaultView>, assets: u64) -> Result<u64> {
    ctx.accounts.totals()?.preview_withdraw(assets)
}

pub fn preview_redeem(ctx: Context<VaultView>, shares: u64) -> Result<u64> {
    ctx.accounts.totals()?.preview_redeem(shares)
}

pub fn max_deposit(ctx: Context<DepositorView>) -> Result<u64> {
    let accounts = &ctx.accounts;
    let roles = VaultRoles {
        protocol_state: &accounts.protocol_state,
        depositor_record: accounts.depositor_record.as_deref(),
    };
    accounting::max_deposit(&accounts.reader(), &roles, &accounts.depositor.key())
}

pub fn max_mint(ctx: Context<DepositorView>) -> Result<u64> {
    let accounts = &ctx.accounts;
    let position = accounts.reader();
    let roles = VaultRoles {
        protocol_state: &accounts.protocol_state,
        depositor_record: accounts.depositor_record.as_deref(),
    };
    let totals = VaultTotals::observe(&accounts.vault.ledger, &position, accounts.share_mint.supply)?;
    accounting::max_mint(&totals, &position, &roles, &accounts.depositor.key())
}

pub fn max_withdraw(ctx: Context<HolderView>) -> Result<u64> {
    let accounts = &ctx.accounts;
    accounting::max_withdraw(
        &accounts.totals()?,
        &accounts.reader(),
        accounts.holder_share_account.amount,
    )
}

pub fn max_redeem(ctx: Context<HolderView>) -> Result<u64> {
    let accounts = &ctx.accounts;
    accounting::max_redeem(
        &accounts.totals()?,
        &accounts.reader(),
        accounts.holder_share_account.amount,
    )
}
