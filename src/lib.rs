pub mod cli;
pub mod secur;

pub use secur::{Secur, SecurBuilder};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
