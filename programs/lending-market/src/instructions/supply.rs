use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::constants::{POSITION_SEED, RESERVE_SEED};
use crate::error::LendingError;
use crate::state::{Position, Reserve};

#[derive(Accounts)]
pub struct Supply<'info> {
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

    #[account(
        mut,
        token::mint = liquidity_mint,
        token::authority = owner,
    )]
    pub source: InterfaceAccount<'info, TokenAccount>,

    pub owner: Signer<'info>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn handler(ctx: Context<Supply>, amount: u64) -> Result<()> {
    require!(amount > 0, LendingError::InvalidAmount);

    let liquidity = ctx.accounts.liquidity_account.amount;
    let reserve = &ctx.accounts.reserve;

    require!(
        amount <= reserve.remaining_capacity(liquidity),
        LendingError::SupplyCapExceeded
    );

    let shares = reserve.shares_for_supply(amount, liquidity)?;
    require!(shares > 0, LendingError::InvalidAmount);

    let transfer_accounts = TransferChecked {
        from: ctx.accounts.source.to_account_info(),
        mint: ctx.accounts.liquidity_mint.to_account_info(),
        to: ctx.accounts.liquidity_account.to_account_info(),
        authority: ctx.accounts.owner.to_account_info(),
    };

    let cpi_ctx = CpiContext::new(
        ctx.accounts.token_program.to_account_info(),
        transfer_accounts,
    );

    transfer_checked(cpi_ctx, amount, ctx.accounts.liquidity_mint.decimals)?;

    let reserve = &mut ctx.accounts.reserve;
    reserve.total_shares = reserve
        .total_shares
        .checked_add(shares)
        .ok_or(LendingError::MathOverflow)?;

    let position = &mut ctx.accounts.position;
    position.shares = position
        .shares
        .checked_add(shares)
        .ok_or(LendingError::MathOverflow)?;

    msg!("Supplied {} liquidity for {} shares", amount, shares);

    Ok(())
}
