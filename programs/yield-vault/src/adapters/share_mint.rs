use anchor_lang::prelude::*;
use anchor_spl::token_interface::{burn, mint_to, Burn, Mint, MintTo, TokenAccount};

use super::read;
use crate::accounting::ShareRegistry;
use crate::constants::VAULT_AUTHORITY_SEED;

/// Vault shares as an SPL mint. The vault authority PDA mints; `holder_authority`
/// must have signed the transaction for burns to succeed.
pub struct ShareMintRegistry<'info> {
    pub share_mint: AccountInfo<'info>,
    pub holder: AccountInfo<'info>,
    pub holder_authority: AccountInfo<'info>,
    pub vault_authority: AccountInfo<'info>,
    pub vault_authority_bump: u8,
    pub token_program: AccountInfo<'info>,
}

impl<'info> ShareRegistry for ShareMintRegistry<'info> {
    fn total_shares(&self) -> Result<u64> {
        Ok(read::<Mint>(&self.share_mint)?.supply)
    }

    fn balance(&self) -> Result<u64> {
        Ok(read::<TokenAccount>(&self.holder)?.amount)
    }

    fn mint(&mut self, shares: u64) -> Result<()> {
        let bump = [self.vault_authority_bump];
        let vault_authority_seeds = &[VAULT_AUTHORITY_SEED, &bump];
        let signer_seeds = &[&vault_authority_seeds[..]];

        let mint_accounts = MintTo {
            mint: self.share_mint.clone(),
            to: self.holder.clone(),
            authority: self.vault_authority.clone(),
        };

        let cpi_ctx = CpiContext::new_with_signer(
            self.token_program.clone(),
            mint_accounts,
            signer_seeds,
        );

        mint_to(cpi_ctx, shares)
    }

    fn burn(&mut self, shares: u64) -> Result<()> {
        let burn_accounts = Burn {
            mint: self.share_mint.clone(),
            from: self.holder.clone(),
            authority: self.holder_authority.clone(),
        };

        let cpi_ctx = CpiContext::new(self.token_program.clone(), burn_accounts);

        burn(cpi_ctx, shares)
    }
}
