pub mod accounting;
pub mod adapters;
pub mod constants;
pub mod error;
pub mod events;
pub mod instructions;
pub mod state;

use anchor_lang::prelude::*;

pub use constants::*;
pub use instructions::*;
pub use state::*;

declare_id!("JBWXKWPn7FT7CQ67htjnPBWh2TmHtQGrrTm3JRm8qKXN");

#[program]
pub mod yield_vault {
    use super::*;

    pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
        initialize::handler(ctx)
    }

    pub fn initialize_vault(
        ctx: Context<InitializeVault>,
        seed_assets: u64,
        fee_rate_bps: u16,
    ) -> Result<()> {
        initialize_vault::handler(ctx, seed_assets, fee_rate_bps)
    }

    pub fn deposit(ctx: Context<Deposit>, assets: u64) -> Result<()> {
        deposit::handler(ctx, assets)
    }

    pub fn mint(ctx: Context<Deposit>, shares: u64) -> Result<()> {
        instructions::mint::handler(ctx, shares)
    }

    pub fn withdraw(ctx: Context<Withdraw>, assets: u64) -> Result<()> {
        withdraw::handler(ctx, assets)
    }

    pub fn redeem(ctx: Context<Withdraw>, shares: u64) -> Result<()> {
        redeem::handler(ctx, shares)
    }

    pub fn set_fee_rate(ctx: Context<SetFeeRate>, fee_rate_bps: u16) -> Result<()> {
        set_fee_rate::handler(ctx, fee_rate_bps)
    }

    pub fn collect_fees(ctx: Context<CollectFees>) -> Result<()> {
        collect_fees::handler(ctx)
    }

    pub fn set_depositor(
        ctx: Context<SetDepositor>,
        depositor: Pubkey,
        authorized: bool,
    ) -> Result<()> {
        set_depositor::handler(ctx, depositor, authorized)
    }

    pub fn set_treasury(ctx: Context<SetTreasury>) -> Result<()> {
        set_treasury::handler(ctx)
    }

    pub fn transfer_ownership(ctx: Context<TransferOwnership>) -> Result<()> {
        transfer_ownership::handler(ctx)
    }

    pub fn total_assets(ctx: Context<VaultView>) -> Result<u64> {
        views::total_assets(ctx)
    }

    pub fn claimable_fees(ctx: Context<VaultView>) -> Result<u64> {
        views::claimable_fees(ctx)
    }

    pub fn fee_rate(ctx: Context<VaultView>) -> Result<u16> {
        views::fee_rate(ctx)
    }

    pub fn preview_deposit(ctx: Context<VaultView>, assets: u64) -> Result<u64> {
        views::preview_deposit(ctx, assets)
    }

    pub fn preview_mint(ctx: Context<VaultView>, shares: u64) -> Result<u64> {
        views::preview_mint(ctx, shares)
    }

    pub fn preview_withdraw(ctx: Context<VaultView>, assets: u64) -> Result<u64> {
        views::preview_withdraw(ctx, assets)
    }

    pub fn preview_redeem(ctx: Context<VaultView>, shares: u64) -> Result<u64> {
        views::preview_redeem(ctx, shares)
    }

    pub fn max_deposit(ctx: Context<DepositorView>) -> Result<u64> {
        views::max_deposit(ctx)
    }

    pub fn max_mint(ctx: Context<DepositorView>) -> Result<u64> {
        views::max_mint(ctx)
    }

    pub fn max_withdraw(ctx: Context<HolderView>) -> Result<u64> {
        views::max_withdraw(ctx)
    }

    pub fn max_redeem(ctx: Context<HolderView>) -> Result<u64> {
        views::max_redeem(ctx)
    }
}
