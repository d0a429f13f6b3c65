use anchor_lang::prelude::*;

use crate::constants::POSITION_SEED;
use crate::state::{Position, Reserve};

#[derive(Accounts)]
pub struct OpenPosition<'info> {
    pub reserve: Account<'info, Reserve>,

    #[account(
        init,
        payer = payer,
        space = Position::LEN,
        seeds = [POSITION_SEED, reserve.key().as_ref(), owner.key().as_ref()],
        bump
    )]
    pub position: Account<'info, Position>,

    pub owner: Signer<'info>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<OpenPosition>) -> Result<()> {
    let position = &mut ctx.accounts.position;

    position.reserve = ctx.accounts.reserve.key();
    position.owner = ctx.accounts.owner.key();
    position.shares = 0;
    position.bump = ctx.bumps.position;

    msg!("Position opened: {} (owner {})", position.key(), position.owner);

    Ok(())
}
