//! Share/asset conversion with a virtual offset on both sides.
//!
//! | Operation | Convert          | Rounding |
//! |-----------|------------------|----------|
//! | deposit   | assets -> shares | floor    |
//! | mint      | shares -> assets | ceil     |
//! | withdraw  | assets -> shares | ceil     |
//! | redeem    | shares -> assets | floor    |
//!
//! Every row rounds against the caller, so the pool never pays out value it
//! does not hold.

use anchor_lang::prelude::*;

use crate::constants::{VIRTUAL_ASSETS, VIRTUAL_SHARES};
use crate::error::VaultError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    Floor,
    Ceil,
}

/// `assets * (total_shares + VIRTUAL_SHARES) / (total_assets + VIRTUAL_ASSETS)`
pub fn to_shares(
    assets: u64,
    total_assets: u64,
    total_shares: u64,
    rounding: Rounding,
) -> Result<u64> {
    mul_div(
        assets as u128,
        (total_shares as u128) + VIRTUAL_SHARES,
        (total_assets as u128) + VIRTUAL_ASSETS,
        rounding,
    )
}

/// `shares * (total_assets + VIRTUAL_ASSETS) / (total_shares + VIRTUAL_SHARES)`
pub fn to_assets(
    shares: u64,
    total_assets: u64,
    total_shares: u64,
    rounding: Rounding,
) -> Result<u64> {
    mul_div(
        shares as u128,
        (total_assets as u128) + VIRTUAL_ASSETS,
        (total_shares as u128) + VIRTUAL_SHARES,
        rounding,
    )
}

pub(crate) fn mul_div(a: u128, b: u128, denominator: u128, rounding: Rounding) -> Result<u64> {
    let product = a.checked_mul(b).ok_or(VaultError::MathOverflow)?;
    let quotient = product
        .checked_div(denominator)
        .ok_or(VaultError::MathOverflow)?;
    let quotient = match rounding {
        Rounding::Ceil if product % denominator != 0 => quotient + 1,
        _ => quotient,
    };
    u64::try_from(quotient).map_err(|_| error!(VaultError::MathOverflow))
}
