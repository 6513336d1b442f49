//! Session Management Module
//!
//! - [`data`] - the key/value [`Session`] and its authentication state
//! - [`store`] - encrypted cookie persistence
//! - [`gate`] - the [`AuthenticatedUser`] extractor guarding protected routes

pub mod data;
pub mod gate;
pub mod store;

pub use data::{Session, SessionState, USER_KEY};
pub use gate::{AuthenticatedUser, GateRejection};
pub use store::{create_expired_cookie, SessionStore, SessionStoreError, SESSION_COOKIE_NAME};
