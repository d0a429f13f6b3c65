use anchor_lang::prelude::*;

#[error_code]
pub enum LendingError {
    #[msg("Amount must be greater than zero")]
    InvalidAmount,
    #[msg("Supply would exceed the reserve cap")]
    SupplyCapExceeded,
    #[msg("Position does not hold enough shares")]
    InsufficientShares,
    #[msg("Reserve does not hold enough liquidity")]
    InsufficientLiquidity,
    #[msg("Reserve has outstanding shares but no liquidity")]
    ReserveInsolvent,
    #[msg("Math operation overflow")]
    MathOverflow,
}
