pub mod observation;
pub mod user;

pub use observation::*;
pub use user::*;
