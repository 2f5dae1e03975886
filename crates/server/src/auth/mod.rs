//! Authentication and authorization.

pub mod gate;
pub mod identity;
pub mod permissions;
pub mod session;

pub use gate::{Authorized, Caller, Denial, Gate};
