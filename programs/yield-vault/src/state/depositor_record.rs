use anchor_lang::prelude::*;

/// Allow-list entry for one depositor of one vault.
#[account]
pub struct DepositorRecord {
    pub vault: Pubkey,
    pub depositor: Pubkey,
    /// Cleared instead of closing the account when access is revoked
    pub authorized: bool,
    /// Bump seed for PDA derivation
    pub bump: u8,
}

impl DepositorRecord {
    pub const LEN: usize = 8 + // discriminator
        32 + // vault
        32 + // depositor
        1 + // authorized
        1; // bump
}
