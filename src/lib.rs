#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the entragate application
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod handlers;
pub mod identity;
pub mod session;
pub mod settings;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use handlers::{authorized, configure_services, favicon, hello, index, login, logout};
pub use identity::{EntraIdentityClient, IdentityClient, SharedIdentityClient};
pub use session::{AuthenticatedUser, Session, SessionStore};
pub use settings::AppSettings;
