use anchor_lang::prelude::*;

use crate::error::VaultError;

/// Protocol-wide roles. A single PDA per deployment.
#[account]
pub struct ProtocolState {
    /// Fee administrator for every vault; also manages allow-lists and treasuries
    pub owner: Pubkey,
    pub bump: u8,
}

impl ProtocolState {
    pub const LEN: usize = 8 + // discriminator
        32 + // owner
        1; // bump

    pub fn is_owner(&self, key: &Pubkey) -> bool {
        self.owner == *key
    }

    /// Replaces the owner and returns the previous one.
    pub fn hand_over(&mut self, new_owner: Pubkey) -> Result<Pubkey> {
        require_keys_neq!(new_owner, Pubkey::default(), VaultError::InvalidInput);
        Ok(core::mem::replace(&mut self.owner, new_owner))
    }
}

/// Global signer PDA. It is the share mint authority, the owner of every
/// staging and seed-share account, and the owner of every lending position.
#[account]
pub struct VaultAuthority {
    pub bump: u8,
}

impl VaultAuthority {
    pub const LEN: usize = 8 + 1;
}
