pub mod entry;
pub mod patient;
pub mod user;

pub use entry::*;
pub use patient::*;
pub use user::*;
