use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use lending_market::cpi::accounts::OpenPosition;
use lending_market::program::LendingMarket;
use lending_market::state::Reserve;
use lending_market::POSITION_SEED;

use crate::accounting;
use crate::adapters::{LendingPosition, LendingReader, ShareMintRegistry};
use crate::constants::{
    PROTOCOL_STATE_SEED, SEED_SHARES_SEED, SHARE_MINT_SEED, VAULT_AUTHORITY_SEED, VAULT_SEED,
    VAULT_TOKEN_ACCOUNT_SEED,
};
use crate::error::VaultError;
use crate::state::{ProtocolState, Vault, VaultAuthority};

#[derive(Accounts)]
pub struct InitializeVault<'info> {
    #[account(
        seeds = [PROTOCOL_STATE_SEED],
        bump = protocol_state.bump,
        has_one = owner @ VaultError::Unauthorized,
    )]
    pub protocol_state: Box<Account<'info, ProtocolState>>,

    #[account(
        init,
        payer = payer,
        space = Vault::LEN,
        seeds = [VAULT_SEED, underlying_mint.key().as_ref()],
        bump
    )]
    pub vault: Box<Account<'info, Vault>>,

    pub underlying_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Staging account deposits pass through on their way into the reserve
    #[account(
        init,
        payer = payer,
        token::mint = underlying_mint,
        token::authority = vault_authority,
        token::token_program = token_program,
        seeds = [VAULT_TOKEN_ACCOUNT_SEED, vault.key().as_ref()],
        bump
    )]
    pub vault_token_account: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        init,
        payer = payer,
        mint::decimals = underlying_mint.decimals,
        mint::authority = vault_authority,
        mint::token_program = token_program,
        seeds = [SHARE_MINT_SEED, vault.key().as_ref()],
        bump
    )]
    pub share_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Receives the seed shares. Only the vault authority could move them and
    /// no instruction does.
    #[account(
        init,
        payer = payer,
        token::mint = share_mint,
        token::authority = vault_authority,
        token::token_program = token_program,
        seeds = [SEED_SHARES_SEED, vault.key().as_ref()],
        bump
    )]
    pub seed_share_account: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        seeds = [VAULT_AUTHORITY_SEED],
        bump = vault_authority.bump
    )]
    pub vault_authority: Box<Account<'info, VaultAuthority>>,

    #[account(
        mut,
        constraint = reserve.liquidity_mint == underlying_mint.key() @ VaultError::InvalidReserve,
    )]
    pub reserve: Box<Account<'info, Reserve>>,

    #[account(
        mut,
        address = reserve.liquidity_account @ VaultError::InvalidReserve,
    )]
    pub liquidity_account: Box<InterfaceAccount<'info, TokenAccount>>,

    /// CHECK: created by `lending_market::open_position` in this instruction
    #[account(
        mut,
        seeds = [POSITION_SEED, reserve.key().as_ref(), vault_authority.key().as_ref()],
        bump,
        seeds::program = lending_program.key(),
    )]
    pub position: UncheckedAccount<'info>,

    #[account(token::mint = underlying_mint)]
    pub treasury: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Funds the seed deposit
    #[account(
        mut,
        token::mint = underlying_mint,
        token::authority = payer,
    )]
    pub payer_token_account: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Must be the protocol owner
    pub owner: Signer<'info>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub lending_program: Program<'info, LendingMarket>,
    pub system_program: Program<'info, System>,
    pub token_program: Interface<'info, TokenInterface>,
}

pub fn handler(ctx: Context<InitializeVault>, seed_assets: u64, fee_rate_bps: u16) -> Result<()> {
    require_keys_neq!(
        ctx.accounts.treasury.key(),
        Pubkey::default(),
        VaultError::InvalidInput
    );

    let vault_authority_bump = ctx.accounts.vault_authority.bump;
    let vault_authority_seeds = &[VAULT_AUTHORITY_SEED, &[vault_authority_bump]];
    let signer_seeds = &[&vault_authority_seeds[..]];

    let open_accounts = OpenPosition {
        reserve: ctx.accounts.reserve.to_account_info(),
        position: ctx.accounts.position.to_account_info(),
        owner: ctx.accounts.vault_authority.to_account_info(),
        payer: ctx.accounts.payer.to_account_info(),
        system_program: ctx.accounts.system_program.to_account_info(),
    };

    let cpi_ctx = CpiContext::new_with_signer(
        ctx.accounts.lending_program.to_account_info(),
        open_accounts,
        signer_seeds,
    );

    lending_market::cpi::open_position(cpi_ctx)?;

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
        vault_authority_bump,
        counterparty: ctx.accounts.payer_token_account.to_account_info(),
        counterparty_authority: ctx.accounts.payer.to_account_info(),
        token_program: ctx.accounts.token_program.to_account_info(),
    };

    let mut shares = ShareMintRegistry {
        share_mint: ctx.accounts.share_mint.to_account_info(),
        holder: ctx.accounts.seed_share_account.to_account_info(),
        holder_authority: ctx.accounts.vault_authority.to_account_info(),
        vault_authority: ctx.accounts.vault_authority.to_account_info(),
        vault_authority_bump,
        token_program: ctx.accounts.token_program.to_account_info(),
    };

    let (ledger, seed_shares) =
        accounting::seed(&mut position, &mut shares, seed_assets, fee_rate_bps)?;

    let vault = &mut ctx.accounts.vault;
    vault.share_mint = ctx.accounts.share_mint.key();
    vault.underlying_mint = ctx.accounts.underlying_mint.key();
    vault.vault_token_account = ctx.accounts.vault_token_account.key();
    vault.seed_share_account = ctx.accounts.seed_share_account.key();
    vault.reserve = ctx.accounts.reserve.key();
    vault.position = ctx.accounts.position.key();
    vault.treasury = ctx.accounts.treasury.key();
    vault.ledger = ledger;
    vault.bump = ctx.bumps.vault;

    msg!("Vault initialized: {}", vault.key());
    msg!("Share mint: {}", vault.share_mint);
    msg!("Lending position: {}", vault.position);
    msg!("Seed deposit: {} assets for {} shares", seed_assets, seed_shares);
    msg!("Fee rate: {} bps", fee_rate_bps);

    Ok(())
}
