use anchor_lang::prelude::*;

use crate::accounting;
use crate::adapters::VaultRoles;
use crate::instructions::deposit::Deposit;

/// Mint uses the `Deposit` accounts; the caller names the shares to receive
/// and pays whatever they cost, rounded up.
pub fn handler(ctx: Context<Deposit>, shares_out: u64) -> Result<()> {
    let mut position = ctx.accounts.lending_position();
    let mut shares = ctx.accounts.share_registry();
    let depositor = ctx.accounts.depositor.key();

    let accounts = &mut *ctx.accounts;
    let roles = VaultRoles {
        protocol_state: &accounts.protocol_state,
        depositor_record: accounts.depositor_record.as_deref(),
    };

    let settlement = accounting::mint(
        &mut accounts.vault.ledger,
        &mut position,
        &mut shares,
        &roles,
        &depositor,
        shares_out,
    )?;

    ctx.accounts.emit_settlement(&settlement);

    Ok(())
}
