use anchor_lang::prelude::*;

use crate::accounting::AccrualLedger;

/// One vault per underlying mint. Depositor principal lives in a single
/// `lending_market` position owned by the vault authority.
#[account]
pub struct Vault {
    /// Share mint (minted on deposit/mint, burned on withdraw/redeem)
    pub share_mint: Pubkey,
    /// The asset depositors bring in and take out
    pub underlying_mint: Pubkey,
    /// Staging token account that deposits pass through on their way to the reserve
    pub vault_token_account: Pubkey,
    /// Holds the seed shares minted at construction; never redeemable
    pub seed_share_account: Pubkey,
    /// Lending reserve the position belongs to
    pub reserve: Pubkey,
    /// The vault's lending position
    pub position: Pubkey,
    /// Token account that receives collected fees
    pub treasury: Pubkey,
    /// Fee accounting against the position balance
    pub ledger: AccrualLedger,
    /// Bump seed for PDA derivation
    pub bump: u8,
}

impl Vault {
    pub const LEN: usize = 8 + // discriminator
        32 + // share_mint
        32 + // underlying_mint
        32 + // vault_token_account
        32 + // seed_share_account
        32 + // reserve
        32 + // position
        32 + // treasury
        AccrualLedger::LEN + // ledger
        1; // bump
}
