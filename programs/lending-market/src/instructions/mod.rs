pub mod init_reserve;
pub mod open_position;
pub mod slash;
pub mod supply;
pub mod withdraw;

pub use init_reserve::*;
pub use open_position::*;
pub use slash::*;
pub use supply::*;
pub use withdraw::*;
