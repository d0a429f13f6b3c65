use anchor_lang::prelude::*;

#[constant]
pub const RESERVE_SEED: &[u8] = b"reserve";

#[constant]
pub const LIQUIDITY_SEED: &[u8] = b"liquidity";

#[constant]
pub const POSITION_SEED: &[u8] = b"position";

/// Shares every reserve behaves as if it had issued before its first supply.
/// A donation into a thin reserve mostly accrues to these, so inflating the
/// share price costs the donor about `VIRTUAL_SHARES` times the price gained.
pub const VIRTUAL_SHARES: u64 = 1_000;

/// Liquidity paired with `VIRTUAL_SHARES`.
pub const VIRTUAL_LIQUIDITY: u64 = 1;
