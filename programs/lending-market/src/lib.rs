pub mod constants;
pub mod error;
pub mod instructions;
pub mod state;

use anchor_lang::prelude::*;

pub use constants::*;
pub use instructions::*;
pub use state::*;

declare_id!("4Ugputq4iRzr2A9pLAV27HC4u9RSsH5iL4VdzgjAC38t");

#[program]
pub mod lending_market {
    use super::*;

    pub fn init_reserve(ctx: Context<InitReserve>, supply_cap: u64) -> Result<()> {
        init_reserve::handler(ctx, supply_cap)
    }

    pub fn open_position(ctx: Context<OpenPosition>) -> Result<()> {
        open_position::handler(ctx)
    }

    pub fn supply(ctx: Context<Supply>, amount: u64) -> Result<()> {
        supply::handler(ctx, amount)
    }

    pub fn withdraw(ctx: Context<Withdraw>, amount: u64) -> Result<()> {
        withdraw::handler(ctx, amount)
    }

    pub fn slash(ctx: Context<Slash>, amount: u64) -> Result<()> {
        slash::handler(ctx, amount)
    }
}
