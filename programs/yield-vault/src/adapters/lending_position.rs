use anchor_lang::prelude::*;
use anchor_spl::token_interface::{transfer_checked, TokenAccount, TransferChecked};
use lending_market::cpi::accounts::{Supply, Withdraw};
use lending_market::state::{Position, Reserve};

use super::read;
use crate::accounting::{PositionCustody, PositionOracle};
use crate::constants::VAULT_AUTHORITY_SEED;

/// Read-only view of the vault's position in a `lending_market` reserve.
pub struct LendingReader<'info> {
    pub reserve: AccountInfo<'info>,
    pub liquidity_account: AccountInfo<'info>,
    pub position: AccountInfo<'info>,
}

impl<'info> LendingReader<'info> {
    fn liquidity(&self) -> Result<u64> {
        Ok(read::<TokenAccount>(&self.liquidity_account)?.amount)
    }
}

impl<'info> PositionOracle for LendingReader<'info> {
    fn live_balance(&self) -> Result<u64> {
        let reserve = read::<Reserve>(&self.reserve)?;
        let position = read::<Position>(&self.position)?;
        reserve.balance_of(position.shares, self.liquidity()?)
    }

    fn max_supply(&self) -> Result<u64> {
        let reserve = read::<Reserve>(&self.reserve)?;
        Ok(reserve.remaining_capacity(self.liquidity()?))
    }

    fn available_liquidity(&self) -> Result<u64> {
        self.liquidity()
    }
}

/// The vault's position with the accounts needed to move value in and out.
///
/// `supply` moves tokens from `counterparty` into the staging account and
/// supplies them from there, since the market only accepts liquidity from the
/// position owner. `withdraw` pays `counterparty` directly.
pub struct LendingPosition<'info> {
    pub reader: LendingReader<'info>,
    pub lending_program: AccountInfo<'info>,
    pub underlying_mint: AccountInfo<'info>,
    pub decimals: u8,
    /// Pass-through token account owned by the vault authority
    pub staging: AccountInfo<'info>,
    /// Position owner and staging authority
    pub vault_authority: AccountInfo<'info>,
    pub vault_authority_bump: u8,
    /// Token account on the other side of the operation
    pub counterparty: AccountInfo<'info>,
    /// Signs for `counterparty` when value flows into the position
    pub counterparty_authority: AccountInfo<'info>,
    pub token_program: AccountInfo<'info>,
}

impl<'info> PositionOracle for LendingPosition<'info> {
    fn live_balance(&self) -> Result<u64> {
        self.reader.live_balance()
    }

    fn max_supply(&self) -> Result<u64> {
        self.reader.max_supply()
    }

    fn available_liquidity(&self) -> Result<u64> {
        self.reader.available_liquidity()
    }
}

impl<'info> PositionCustody for LendingPosition<'info> {
    fn supply(&mut self, amount: u64) -> Result<()> {
        let transfer_accounts = TransferChecked {
            from: self.counterparty.clone(),
            mint: self.underlying_mint.clone(),
            to: self.staging.clone(),
            authority: self.counterparty_authority.clone(),
        };

        let cpi_ctx = CpiContext::new(self.token_program.clone(), transfer_accounts);

        transfer_checked(cpi_ctx, amount, self.decimals)?;

        let bump = [self.vault_authority_bump];
        let vault_authority_seeds = &[VAULT_AUTHORITY_SEED, &bump];
        let signer_seeds = &[&vault_authority_seeds[..]];

        let supply_accounts = Supply {
            reserve: self.reader.reserve.clone(),
            liquidity_mint: self.underlying_mint.clone(),
            liquidity_account: self.reader.liquidity_account.clone(),
            position: self.reader.position.clone(),
            source: self.staging.clone(),
            owner: self.vault_authority.clone(),
            token_program: self.token_program.clone(),
        };

        let cpi_ctx = CpiContext::new_with_signer(
            self.lending_program.clone(),
            supply_accounts,
            signer_seeds,
        );

        lending_market::cpi::supply(cpi_ctx, amount)
    }

    fn withdraw(&mut self, amount: u64) -> Result<u64> {
        let bump = [self.vault_authority_bump];
        let vault_authority_seeds = &[VAULT_AUTHORITY_SEED, &bump];
        let signer_seeds = &[&vault_authority_seeds[..]];

        let withdraw_accounts = Withdraw {
            reserve: self.reader.reserve.clone(),
            liquidity_mint: self.underlying_mint.clone(),
            liquidity_account: self.reader.liquidity_account.clone(),
            position: self.reader.position.clone(),
            destination: self.counterparty.clone(),
            owner: self.vault_authority.clone(),
            token_program: self.token_program.clone(),
        };

        let cpi_ctx = CpiContext::new_with_signer(
            self.lending_program.clone(),
            withdraw_accounts,
            signer_seeds,
        );

        let before = read::<TokenAccount>(&self.counterparty)?.amount;
        lending_market::cpi::withdraw(cpi_ctx, amount)?;
        let after = read::<TokenAccount>(&self.counterparty)?.amount;

        Ok(after.saturating_sub(before))
    }
}
