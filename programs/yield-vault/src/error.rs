use anchor_lang::prelude::*;

#[error_code]
pub enum VaultError {
    #[msg("Invalid input: zero seed, default key or fee rate above maximum")]
    InvalidInput,
    #[msg("Non-zero input resolves to a zero mint, burn or transfer")]
    ZeroResult,
    #[msg("Amount exceeds the allowed maximum")]
    ExceedsBound,
    #[msg("No accumulated fees to collect")]
    NothingToCollect,
    #[msg("Caller lacks the required role")]
    Unauthorized,
    #[msg("Math operation overflow")]
    MathOverflow,
    #[msg("Lending accounts do not match the vault")]
    InvalidReserve,
    #[msg("Treasury account does not match the vault")]
    InvalidTreasury,
}
