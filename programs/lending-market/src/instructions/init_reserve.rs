use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::constants::{LIQUIDITY_SEED, RESERVE_SEED};
use crate::state::Reserve;

#[derive(Accounts)]
pub struct InitReserve<'info> {
    #[account(
        init,
        payer = authority,
        space = Reserve::LEN,
        seeds = [RESERVE_SEED, liquidity_mint.key().as_ref()],
        bump
    )]
    pub reserve: Account<'info, Reserve>,

    pub liquidity_mint: InterfaceAccount<'info, Mint>,

    /// Pool token account, owned by the reserve PDA
    #[account(
        init,
        payer = authority,
        token::mint = liquidity_mint,
        token::authority = reserve,
        token::token_program = token_program,
        seeds = [LIQUIDITY_SEED, reserve.key().as_ref()],
        bump
    )]
    pub liquidity_account: InterfaceAccount<'info, TokenAccount>,

    #[account(mut)]
    pub authority: Signer<'info>,

    pub system_program: Program<'info, System>,
    pub token_program: Interface<'info, TokenInterface>,
}

pub fn handler(ctx: Context<InitReserve>, supply_cap: u64) -> Result<()> {
    let reserve = &mut ctx.accounts.reserve;

    reserve.authority = ctx.accounts.authority.key();
    reserve.liquidity_mint = ctx.accounts.liquidity_mint.key();
    reserve.liquidity_account = ctx.accounts.liquidity_account.key();
    reserve.total_shares = 0;
    reserve.supply_cap = supply_cap;
    reserve.bump = ctx.bumps.reserve;

    msg!("Reserve initialized: {}", reserve.key());
    msg!("Liquidity mint: {}", reserve.liquidity_mint);
    msg!("Supply cap: {}", supply_cap);

    Ok(())
}
