use anchor_lang::prelude::*;

use crate::constants::{PROTOCOL_STATE_SEED, VAULT_AUTHORITY_SEED};
use crate::events::ProtocolInitialized;
use crate::state::{ProtocolState, VaultAuthority};

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(
        init,
        payer = payer,
        space = ProtocolState::LEN,
        seeds = [PROTOCOL_STATE_SEED],
        bump
    )]
    pub protocol_state: Account<'info, ProtocolState>,

    /// Share mint authority, staging owner and lending position owner for all vaults
    #[account(
        init,
        payer = payer,
        space = VaultAuthority::LEN,
        seeds = [VAULT_AUTHORITY_SEED],
        bump
    )]
    pub vault_authority: Account<'info, VaultAuthority>,

    /// Becomes the fee administrator
    pub owner: Signer<'info>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Initialize>) -> Result<()> {
    let owner = ctx.accounts.owner.key();

    ctx.accounts.protocol_state.set_inner(ProtocolState {
        owner,
        bump: ctx.bumps.protocol_state,
    });
    ctx.accounts.vault_authority.set_inner(VaultAuthority {
        bump: ctx.bumps.vault_authority,
    });

    emit!(ProtocolInitialized {
        owner,
        vault_authority: ctx.accounts.vault_authority.key(),
    });

    msg!("Protocol owner: {}", owner);
    msg!("Vault authority: {}", ctx.accounts.vault_authority.key());

    Ok(())
}
