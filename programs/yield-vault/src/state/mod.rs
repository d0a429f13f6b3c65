pub mod depositor_record;
pub mod protocol;
pub mod vault;

pub use depositor_record::*;
pub use protocol::*;
pub use vault::*;
