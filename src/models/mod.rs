pub mod like;
pub mod motto;
pub mod qr_code;
pub mod user;

pub use like::*;
pub use motto::*;
pub use qr_code::*;
pub use user::*;
