use anchor_lang::prelude::*;

use crate::accounting;
use crate::instructions::withdraw::Withdraw;

/// Redeem uses the `Withdraw` accounts; the caller names the shares to burn.
pub fn handler(ctx: Context<Withdraw>, shares_in: u64) -> Result<()> {
    let mut position = ctx.accounts.lending_position();
    let mut shares = ctx.accounts.share_registry();

    let settlement = accounting::redeem(
        &mut ctx.accounts.vault.ledger,
        &mut position,
        &mut shares,
        shares_in,
    )?;

    ctx.accounts.emit_settlement(&settlement);

    Ok(())
}
