use anchor_lang::prelude::*;

#[constant]
pub const PROTOCOL_STATE_SEED: &[u8] = b"protocol_state";

#[constant]
pub const VAULT_AUTHORITY_SEED: &[u8] = b"vault_authority";

#[constant]
pub const VAULT_SEED: &[u8] = b"vault";

#[constant]
pub const VAULT_TOKEN_ACCOUNT_SEED: &[u8] = b"vault_token_account";

#[constant]
pub const SHARE_MINT_SEED: &[u8] = b"share_mint";

#[constant]
pub const SEED_SHARES_SEED: &[u8] = b"seed_shares";

#[constant]
pub const DEPOSITOR_SEED: &[u8] = b"depositor";

/// Fee rates are expressed in basis points of this value.
#[constant]
pub const MAX_FEE_RATE_BPS: u16 = 10_000;

/// Added to total shares in every conversion. Never minted.
pub const VIRTUAL_SHARES: u128 = 1;

/// Added to total assets in every conversion.
pub const VIRTUAL_ASSETS: u128 = 1;
