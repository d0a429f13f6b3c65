use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::constants::RESERVE_SEED;
use crate::error::LendingError;
use crate::state::Reserve;

/// Removes liquidity from the pool without burning shares, so every position
/// loses value pro rata.
#[derive(Accounts)]
pub struct Slash<'info> {
    #[account(
        seeds = [RESERVE_SEED, liquidity_mint.key().as_ref()],
        bump = reserve.bump,
        has_one = authority,
        has_one = liquidity_mint,
        has_one = liquidity_account,
    )]
    pub reserve: Account<'info, Reserve>,

    pub liquidity_mint: InterfaceAccount<'info, Mint>,

    #[account(mut)]
    pub liquidity_account: InterfaceAccount<'info, TokenAccount>,

    #[account(mut, token::mint = liquidity_mint)]
    pub destination: InterfaceAccount<'info, TokenAccount>,

    pub authority: Signer<'info>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn handler(ctx: Context<Slash>, amount: u64) -> Result<()> {
    require!(amount > 0, LendingError::InvalidAmount);
    require!(
        amount <= ctx.accounts.liquidity_account.amount,
        LendingError::InsufficientLiquidity
    );

    let mint_key = ctx.accounts.liquidity_mint.key();
    let reserve_bump = ctx.accounts.reserve.bump;
    let reserve_seeds = &[RESERVE_SEED, mint_key.as_ref(), &[reserve_bump]];
    let signer_seeds = &[&reserve_seeds[..]];

    let transfer_accounts = TransferChecked {
        from: ctx.accounts.liquidity_account.to_account_info(),
        mint: ctx.accounts.liquidity_mint.to_account_info(),
        to: ctx.accounts.destination.to_account_info(),
        authority: ctx.accounts.reserve.to_account_info(),
    };

    let cpi_ctx = CpiContext::new_with_signer(
        ctx.accounts.token_program.to_account_info(),
        transfer_accounts,
        signer_seeds,
    );

    transfer_checked(cpi_ctx, amount, ctx.accounts.liquidity_mint.decimals)?;

    msg!("Slashed {} liquidity from reserve {}", amount, ctx.accounts.reserve.key());

    Ok(())
}
