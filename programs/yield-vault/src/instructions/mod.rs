pub mod collect_fees;
pub mod deposit;
pub mod initialize;
pub mod initialize_vault;
pub mod mint;
pub mod redeem;
pub mod set_depositor;
pub mod set_fee_rate;
pub mod set_treasury;
pub mod transfer_ownership;
pub mod views;
pub mod withdraw;

pub use collect_fees::*;
pub use deposit::*;
pub use initialize::*;
pub use initialize_vault::*;
pub use set_depositor::*;
pub use set_fee_rate::*;
pub use set_treasury::*;
pub use transfer_ownership::*;
pub use views::*;
pub use withdraw::*;
