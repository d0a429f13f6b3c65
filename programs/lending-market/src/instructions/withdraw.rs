use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::constants::{POSITION_SEED, RESERVE_SEED};
use crate::error::LendingError;
use crate::state::{Position, Reserve};

#[derive(Accounts)]
pub struct Withdraw<'info> {
    #[account(
        mut,
        seeds = [RESERVE_SEED, liquidity_mint.key().as_ref()],
        bump = reserve.bump,
        has_one = liquidity_mint,
        has_one = liquidity_account,
    )]
    pub reserve: Account<'info, Reserve>,

    pub liquidity_mint: InterfaceAccount<'info, Mint>,

    #[account(mut)]
    pub liquidity_account: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [POSITION_SEED, reserve.key().as_ref(), owner.key().as_ref()],
        bump = position.bump,
        has_one = reserve,
        has_one = owner,
    )]
    pub position: Account<'info, Position>,

    #[account(mut, token::mint = liquidity_mint)]
    pub destination: InterfaceAccount<'info, TokenAccount>,

    pub owner: Signer<'info>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn handler(ctx: Context<Withdraw>, amount: u64) -> Result<()> {
    require!(amount > 0, LendingError::InvalidAmount);

    let liquidity = ctx.accounts.liquidity_account.amount;
    let shares = ctx.accounts.reserve.shares_for_withdraw(amount, liquidity)?;
    require!(
        shares <= ctx.accounts.position.shares,
        LendingError::InsufficientShares
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

    let reserve = &mut ctx.accounts.reserve;
    reserve.total_shares = reserve
        .total_shares
        .checked_sub(shares)
        .ok_or(LendingError::MathOverflow)?;

    let position = &mut ctx.accounts.position;
    position.shares = position
        .shares
        .checked_sub(shares)
        .ok_or(LendingError::MathOverflow)?;

    msg!("Withdrew {} liquidity for {} shares", amount, shares);

    Ok(())
}
