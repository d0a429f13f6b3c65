use anchor_lang::prelude::*;

use crate::constants::PROTOCOL_STATE_SEED;
use crate::error::VaultError;
use crate::events::OwnershipTransferred;
use crate::state::ProtocolState;

#[derive(Accounts)]
pub struct TransferOwnership<'info> {
    #[account(
        mut,
        seeds = [PROTOCOL_STATE_SEED],
        bump = protocol_state.bump,
        constraint = protocol_state.is_owner(&current_owner.key()) @ VaultError::Unauthorized,
    )]
    pub protocol_state: Account<'info, ProtocolState>,

    pub current_owner: Signer<'info>,

    /// CHECK: Any key may become the owner; it only has to sign later calls
    pub new_owner: UncheckedAccount<'info>,
}

pub fn handler(ctx: Context<TransferOwnership>) -> Result<()> {
    let new_owner = ctx.accounts.new_owner.key();
    let previous_owner = ctx.accounts.protocol_state.hand_over(new_owner)?;

    emit!(OwnershipTransferred {
        previous_owner,
        new_owner,
    });

    msg!("Ownership transferred: {} -> {}", previous_owner, new_owner);

    Ok(())
}
