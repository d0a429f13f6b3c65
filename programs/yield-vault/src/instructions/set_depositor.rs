use anchor_lang::prelude::*;

use crate::constants::{DEPOSITOR_SEED, PROTOCOL_STATE_SEED, VAULT_SEED};
use crate::error::VaultError;
use crate::events::DepositorUpdated;
use crate::state::{DepositorRecord, ProtocolState, Vault};

#[derive(Accounts)]
#[instruction(depositor: Pubkey)]
pub struct SetDepositor<'info> {
    #[account(
        seeds = [VAULT_SEED, vault.underlying_mint.as_ref()],
        bump = vault.bump,
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(
        seeds = [PROTOCOL_STATE_SEED],
        bump = protocol_state.bump,
        has_one = owner @ VaultError::Unauthorized,
    )]
    pub protocol_state: Box<Account<'info, ProtocolState>>,

    #[account(
        init_if_needed,
        payer = owner,
        space = DepositorRecord::LEN,
        seeds = [DEPOSITOR_SEED, vault.key().as_ref(), depositor.as_ref()],
        bump
    )]
    pub depositor_record: Account<'info, DepositorRecord>,

    #[account(mut)]
    pub owner: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<SetDepositor>, depositor: Pubkey, authorized: bool) -> Result<()> {
    require_keys_neq!(depositor, Pubkey::default(), VaultError::InvalidInput);

    let vault_key = ctx.accounts.vault.key();
    let record = &mut ctx.accounts.depositor_record;

    record.vault = vault_key;
    record.depositor = depositor;
    record.authorized = authorized;
    record.bump = ctx.bumps.depositor_record;

    emit!(DepositorUpdated {
        vault: vault_key,
        depositor,
        authorized,
    });

    msg!("Depositor {} authorized: {}", depositor, authorized);

    Ok(())
}
