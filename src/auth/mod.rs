pub mod guard;
pub mod policy;
pub mod rbac;
pub mod session;

pub use policy::{AccessDecision, AccessPolicy, Verdict};
pub use rbac::Role;
pub use session::{Session, SessionCodec, SESSION_COOKIE};
