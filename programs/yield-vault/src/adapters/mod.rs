//! On-chain implementations of the accounting traits.

pub mod lending_position;
pub mod roles;
pub mod share_mint;

pub use lending_position::*;
pub use roles::*;
pub use share_mint::*;

use anchor_lang::prelude::*;

/// Deserializes the current contents of `info`. Typed accounts in a handler's
/// context are snapshots taken before any CPI, so adapters read through this
/// instead.
pub(crate) fn read<T: AccountDeserialize>(info: &AccountInfo) -> Result<T> {
    let data = info.try_borrow_data()?;
    let mut bytes: &[u8] = &data;
    T::try_deserialize(&mut bytes)
}
