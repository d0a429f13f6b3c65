use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use lending_market::program::LendingMarket;
use lending_market::state::{Position, Reserve};

use crate::accounting;
use crate::adapters::{LendingPosition, LendingReader, ShareMintRegistry, VaultRoles};
use crate::constants::{DEPOSITOR_SEED, PROTOCOL_STATE_SEED, VAULT_AUTHORITY_SEED, VAULT_SEED};
use crate::error::VaultError;
use crate::events::{emit_accrual, Deposited};
use crate::state::{DepositorRecord, ProtocolState, Vault, VaultAuthority};

#[derive(Accounts)]
pub struct Deposit<'info> {
    #[account(
        mut,
        seeds = [VAULT_SEED, underlying_mint.key().as_ref()],
        bump = vault.bump,
        has_one = underlying_mint,
        has_one = vault_token_account,
        has_one = share_mint,
        has_one = reserve @ VaultError::InvalidReserve,
        has_one = position @ VaultError::InvalidReserve,
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(
        seeds = [PROTOCOL_STATE_SEED],
        bump = protocol_state.bump,
    )]
    pub protocol_state: Box<Account<'info, ProtocolState>>,

    /// Allow-list entry; absent for depositors who were never authorized
    #[account(
        seeds = [DEPOSITOR_SEED, vault.key().as_ref(), depositor.key().as_ref()],
        bump,
    )]
    pub depositor_record: Option<Account<'info, DepositorRecord>>,

    pub underlying_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(mut)]
    pub vault_token_account: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut)]
    pub share_mint: Box<InterfaceAccount<'info, Mint>>,

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

    #[account(
        mut,
        token::mint = underlying_mint,
        token::authority = depositor,
    )]
    pub depositor_underlying_account: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Receives the minted shares
    #[account(
        mut,
        token::mint = share_mint,
        token::authority = depositor,
    )]
    pub depositor_share_account: Box<InterfaceAccount<'info, TokenAccount>>,

    pub depositor: Signer<'info>,

    pub lending_program: Program<'info, LendingMarket>,
    pub token_program: Interface<'info, TokenInterface>,
}

impl<'info> Deposit<'info> {
    pub(crate) fn lending_position(&self) -> LendingPosition<'info> {
        LendingPosition {
            reader: LendingReader {
                reserve: self.reserve.to_account_info(),
                liquidity_account: self.liquidity_account.to_account_info(),
                position: self.position.to_account_info(),
            },
            lending_program: self.lending_program.to_account_info(),
            underlying_mint: self.underlying_mint.to_account_info(),
            decimals: self.underlying_mint.decimals,
            staging: self.vault_token_account.to_account_info(),
            vault_authority: self.vault_authority.to_account_info(),
            vault_authority_bump: self.vault_authority.bump,
            counterparty: self.depositor_underlying_account.to_account_info(),
            counterparty_authority: self.depositor.to_account_info(),
            token_program: self.token_program.to_account_info(),
        }
    }

    pub(crate) fn share_registry(&self) -> ShareMintRegistry<'info> {
        ShareMintRegistry {
            share_mint: self.share_mint.to_account_info(),
            holder: self.depositor_share_account.to_account_info(),
            holder_authority: self.depositor.to_account_info(),
            vault_authority: self.vault_authority.to_account_info(),
            vault_authority_bump: self.vault_authority.bump,
            token_program: self.token_program.to_account_info(),
        }
    }

    pub(crate) fn emit_settlement(&self, settlement: &accounting::Settlement) {
        let vault_key = self.vault.key();
        emit_accrual(vault_key, settlement.accrual);
        emit!(Deposited {
            vault: vault_key,
            depositor: self.depositor.key(),
            assets: settlement.assets,
            shares: settlement.shares,
        });

        msg!("Deposited: {} assets", settlement.assets);
        msg!("Minted: {} shares", settlement.shares);
        msg!("Position balance: {}", self.vault.ledger.checkpoint_balance);
        msg!("Accumulated fees: {}", self.vault.ledger.accumulated_fees);
    }
}

pub fn handler(ctx: Context<Deposit>, assets: u64) -> Result<()> {
    let mut position = ctx.accounts.lending_position();
    let mut shares = ctx.accounts.share_registry();
    let depositor = ctx.accounts.depositor.key();

    let accounts = &mut *ctx.accounts;
    let roles = VaultRoles {
        protocol_state: &accounts.protocol_state,
        depositor_record: accounts.depositor_record.as_deref(),
    };

    let settlement = accounting::deposit(
        &mut accounts.vault.ledger,
        &mut position,
        &mut shares,
        &roles,
        &depositor,
        assets,
    )?;

    ctx.accounts.emit_settlement(&settlement);

    Ok(())
}
